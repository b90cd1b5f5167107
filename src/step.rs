use std::sync::{Arc, Mutex};

use crate::style::{StyleOptions, Styles};
use crate::{ConfigError, Renderable};

/// Lifecycle of a [`Step`].
///
/// `Pending` and `Running` animate a spinner; the five remaining states
/// are terminal and freeze the step to a fixed sign. Transitions run
/// `Pending -> Running -> terminal`, or straight from `Pending` to a
/// terminal state. Terminal states are final: once settled, only the log
/// annotation can still change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Pending,
    Running,
    Info,
    Warn,
    Error,
    Success,
    Skipped,
}

impl State {
    /// Returns `true` once no further state transition is defined.
    pub fn is_terminal(self) -> bool {
        !matches!(self, State::Pending | State::Running)
    }
}

// Each node carries the styles it was built with, so subtrees attached
// across trees keep rendering the way their builder configured them.
struct Node {
    title: String,
    log_line: String,
    state: State,
    depth: usize,
    styles: Arc<Styles>,
    children: Vec<Arc<Mutex<Node>>>,
}

impl Node {
    fn new(title: String, depth: usize, styles: Arc<Styles>) -> Self {
        Self {
            title,
            log_line: String::new(),
            state: State::Pending,
            depth,
            styles,
            children: Vec::new(),
        }
    }

    fn sign(&self, frame: u64) -> &str {
        match self.state {
            State::Pending => spin(&self.styles.pending, frame),
            State::Running => spin(&self.styles.running, frame),
            State::Info => self.styles.info.as_str(),
            State::Warn => self.styles.warn.as_str(),
            State::Error => self.styles.error.as_str(),
            State::Success => self.styles.success.as_str(),
            State::Skipped => self.styles.skipped.as_str(),
        }
    }

    fn line(&self, frame: u64) -> String {
        let mut line = String::new();
        for _ in 0..self.depth {
            line.push_str(&self.styles.indent);
        }
        line.push_str(self.sign(frame));
        line.push_str(&self.title);
        line.push_str(&self.log_line);
        line
    }
}

// Frame lists are validated non-empty at style compile time.
fn spin(frames: &[String], frame: u64) -> &str {
    &frames[(frame % frames.len() as u64) as usize]
}

// All multi-node traversals lock parent before child, and nodes hold no
// parent pointers, so lock order is acyclic as long as the tree is.
fn collect_lines(node: &Mutex<Node>, frame: u64, lines: &mut Vec<String>) {
    let node = node.lock().unwrap();
    lines.push(node.line(frame));
    for child in &node.children {
        collect_lines(child, frame, lines);
    }
}

fn subtree_alive(node: &Mutex<Node>) -> bool {
    let node = node.lock().unwrap();
    if !node.state.is_terminal() {
        return true;
    }
    node.children.iter().any(|child| subtree_alive(child))
}

fn set_depths(node: &Mutex<Node>, depth: usize) {
    let mut node = node.lock().unwrap();
    node.depth = depth;
    for child in &node.children {
        set_depths(child, depth + 1);
    }
}

/// One unit of work: a titled line with a lifecycle, an optional trailing
/// log annotation, and an ordered list of child steps.
///
/// `Step` is a cheap cloneable handle; clones address the same node, so a
/// step can be mutated from the embedding program while a [`Renderer`]
/// samples the tree. The attached children must form a tree; attaching a
/// step underneath one of its own descendants is undefined.
///
/// ```rust,ignore
/// let tree = StepContainer::new();
/// let build = tree.spawn("build");
/// build.start();
/// let unit = build.spawn("compiling core");
/// unit.start_with("12 files");
/// unit.success();
/// build.success_with("4.2s");
/// ```
///
/// [`Renderer`]: crate::Renderer
#[derive(Clone)]
pub struct Step {
    node: Arc<Mutex<Node>>,
}

impl Step {
    /// Creates a root step (depth 0) with the default styles.
    pub fn new(title: &str) -> Self {
        Self::from_styles(title, Arc::new(Styles::default()))
    }

    /// Creates a root step with `options` merged over the default styles.
    pub fn with_styles(title: &str, options: StyleOptions) -> Result<Self, ConfigError> {
        Ok(Self::from_styles(title, Arc::new(Styles::compile(options)?)))
    }

    fn from_styles(title: &str, styles: Arc<Styles>) -> Self {
        let title = styles.compile_title(title);
        Self {
            node: Arc::new(Mutex::new(Node::new(title, 0, styles))),
        }
    }

    /// Creates a child one level deeper, sharing this step's styles, and
    /// returns it for further chaining.
    pub fn spawn(&self, title: &str) -> Step {
        let mut node = self.node.lock().unwrap();
        let child = Step {
            node: Arc::new(Mutex::new(Node::new(
                node.styles.compile_title(title),
                node.depth + 1,
                node.styles.clone(),
            ))),
        };
        node.children.push(child.node.clone());
        child
    }

    /// Attaches an externally constructed step as a child, reassigning its
    /// depth and, transitively, the depths of all its descendants.
    ///
    /// The child keeps its own styles: a subtree built with custom glyphs
    /// renders with those glyphs no matter which tree it ends up in.
    /// Panics if `child` is this step itself; the result of attaching a
    /// step under one of its own descendants is undefined.
    pub fn add(&self, child: &Step) {
        assert!(
            !Arc::ptr_eq(&self.node, &child.node),
            "a step cannot be its own child"
        );
        let depth = {
            let mut node = self.node.lock().unwrap();
            node.children.push(child.node.clone());
            node.depth
        };
        set_depths(&child.node, depth + 1);
    }

    /// Transitions to `Running`. The log annotation is left untouched.
    pub fn start(&self) {
        self.transition(State::Running, None);
    }

    /// Transitions to `Running` and sets the log annotation.
    pub fn start_with(&self, message: &str) {
        self.transition(State::Running, Some(message));
    }

    /// Settles into `Info` and clears the log annotation.
    pub fn info(&self) {
        self.transition(State::Info, None);
    }

    /// Settles into `Info` with a log annotation (empty clears).
    pub fn info_with(&self, message: &str) {
        self.transition(State::Info, Some(message));
    }

    /// Settles into `Warn` and clears the log annotation.
    pub fn warn(&self) {
        self.transition(State::Warn, None);
    }

    /// Settles into `Warn` with a log annotation (empty clears).
    pub fn warn_with(&self, message: &str) {
        self.transition(State::Warn, Some(message));
    }

    /// Settles into `Error` and clears the log annotation.
    pub fn error(&self) {
        self.transition(State::Error, None);
    }

    /// Settles into `Error` with a log annotation (empty clears).
    pub fn error_with(&self, message: &str) {
        self.transition(State::Error, Some(message));
    }

    /// Settles into `Success` and clears the log annotation.
    pub fn success(&self) {
        self.transition(State::Success, None);
    }

    /// Settles into `Success` with a log annotation (empty clears).
    pub fn success_with(&self, message: &str) {
        self.transition(State::Success, Some(message));
    }

    /// Settles into `Skipped` and clears the log annotation.
    pub fn skip(&self) {
        self.transition(State::Skipped, None);
    }

    /// Settles into `Skipped` with a log annotation (empty clears).
    pub fn skip_with(&self, message: &str) {
        self.transition(State::Skipped, Some(message));
    }

    // Terminal states are final: a transition on a settled step leaves the
    // state untouched but still applies the annotation rule, so late
    // completion messages remain visible.
    fn transition(&self, state: State, message: Option<&str>) {
        let mut node = self.node.lock().unwrap();
        if !node.state.is_terminal() {
            node.state = state;
        }
        match message {
            Some(message) => {
                let line = node.styles.compile_log(message);
                node.log_line = line;
            }
            None if state.is_terminal() => node.log_line.clear(),
            None => {}
        }
    }

    /// Joins `parts` with single spaces and sets the trailing annotation,
    /// rendered through the configured log sign. No parts clears it.
    pub fn log<I, S>(&self, parts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let message = parts
            .into_iter()
            .map(|part| part.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let mut node = self.node.lock().unwrap();
        let line = node.styles.compile_log(&message);
        node.log_line = line;
    }

    /// Removes the trailing annotation.
    pub fn clear_log(&self) {
        self.node.lock().unwrap().log_line.clear();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.node.lock().unwrap().state
    }

    /// Distance from this step's root; children are parent depth + 1.
    pub fn depth(&self) -> usize {
        self.node.lock().unwrap().depth
    }
}

impl Renderable for Step {
    fn render_frame(&self, frame: u64) -> String {
        let mut lines = Vec::new();
        collect_lines(&self.node, frame, &mut lines);
        lines.join("\n")
    }

    fn should_be_rendered(&self) -> bool {
        subtree_alive(&self.node)
    }
}

/// A tree root that behaves like a step without a line of its own.
///
/// Steps spawned here start at depth 0; rendering yields only the
/// children's lines. Like [`Step`] this is a cloneable handle, so one
/// clone can be handed to a [`Renderer`] while the program keeps spawning
/// and completing steps through another.
///
/// [`Renderer`]: crate::Renderer
#[derive(Clone)]
pub struct StepContainer {
    children: Arc<Mutex<Vec<Arc<Mutex<Node>>>>>,
    styles: Arc<Styles>,
}

impl Default for StepContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl StepContainer {
    /// Creates a container with the default styles.
    pub fn new() -> Self {
        Self {
            children: Arc::new(Mutex::new(Vec::new())),
            styles: Arc::new(Styles::default()),
        }
    }

    /// Creates a container with `options` merged over the default styles.
    pub fn with_styles(options: StyleOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            children: Arc::new(Mutex::new(Vec::new())),
            styles: Arc::new(Styles::compile(options)?),
        })
    }

    /// Creates a top-level step (depth 0) sharing this container's styles.
    pub fn spawn(&self, title: &str) -> Step {
        let child = Step {
            node: Arc::new(Mutex::new(Node::new(
                self.styles.compile_title(title),
                0,
                self.styles.clone(),
            ))),
        };
        self.children.lock().unwrap().push(child.node.clone());
        child
    }

    /// Attaches an externally constructed step at depth 0, reassigning
    /// descendant depths. The child keeps its own styles, so a container
    /// can hold subtrees with differing looks.
    pub fn add(&self, child: &Step) {
        self.children.lock().unwrap().push(child.node.clone());
        set_depths(&child.node, 0);
    }
}

impl Renderable for StepContainer {
    fn render_frame(&self, frame: u64) -> String {
        let mut lines = Vec::new();
        for child in self.children.lock().unwrap().iter() {
            collect_lines(child, frame, &mut lines);
        }
        lines.join("\n")
    }

    fn should_be_rendered(&self) -> bool {
        self.children
            .lock()
            .unwrap()
            .iter()
            .any(|child| subtree_alive(child))
    }
}
