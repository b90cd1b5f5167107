use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use crate::writer::{OverwriteSink, Sink};
use crate::{ConfigError, Renderable};

/// Renderer configuration, merged over defaults via struct update syntax.
///
/// ```rust,ignore
/// let renderer = Renderer::new(tree.clone(), Options {
///     fps: 24.0,
///     ..Options::default()
/// })?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Frames per second; the tick period is `1 / fps`. Default 12.
    pub fps: f64,
    /// Start the timer at construction time. Default `true`.
    pub auto_start: bool,
    /// Stop the timer once no step in the tree is pending or running.
    /// Default `true`.
    pub auto_stop: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fps: 12.0,
            auto_start: true,
            auto_stop: true,
        }
    }
}

type Listener = Box<dyn FnMut(&str) + Send>;

struct Inner {
    root: Box<dyn Renderable + Send + Sync>,
    sink: Mutex<Box<dyn Sink>>,
    frame: AtomicU64,
    listeners: Mutex<Vec<Listener>>,
}

impl Inner {
    // The sink lock spans the whole render, so a render() racing the
    // timer thread still draws each frame number exactly once and the
    // counter advances once per successful write.
    fn render(&self) -> io::Result<String> {
        let mut sink = self.sink.lock().unwrap();
        let frame = self.frame.load(Ordering::Relaxed);
        let output = self.root.render_frame(frame);
        sink.write_frame(&output)?;
        self.frame.store(frame + 1, Ordering::Relaxed);

        // The list is detached while callbacks run, so a listener can
        // call on_rendered without deadlocking. Listeners registered
        // mid-callback land behind the current ones and first fire on
        // the next frame.
        let mut listeners = std::mem::take(&mut *self.listeners.lock().unwrap());
        for listener in listeners.iter_mut() {
            listener(&output);
        }
        let mut slot = self.listeners.lock().unwrap();
        listeners.append(&mut slot);
        *slot = listeners;
        Ok(output)
    }
}

struct Timer {
    stop_tx: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

/// Samples a step tree at a fixed cadence and writes each frame to a sink.
///
/// The timer is a dedicated thread ticking every `1 / fps` seconds. Step
/// mutations happen through the tree's own handles; the renderer only
/// reads via [`Renderable`]. With `auto_stop` the loop parks itself once
/// every step has settled, so callers don't have to track completion.
/// Independent renderers never share state.
pub struct Renderer {
    inner: Arc<Inner>,
    interval: Duration,
    auto_stop: bool,
    timer: Option<Timer>,
}

impl Renderer {
    /// Renderer over the default overwriting stdout sink.
    pub fn new(
        root: impl Renderable + Send + Sync + 'static,
        options: Options,
    ) -> Result<Self, ConfigError> {
        Self::with_sink(root, OverwriteSink::stdout(), options)
    }

    /// Renderer writing to an injected sink.
    pub fn with_sink(
        root: impl Renderable + Send + Sync + 'static,
        sink: impl Sink + 'static,
        options: Options,
    ) -> Result<Self, ConfigError> {
        if !options.fps.is_finite() || options.fps <= 0.0 {
            return Err(ConfigError::Fps(options.fps));
        }
        let mut renderer = Self {
            inner: Arc::new(Inner {
                root: Box::new(root),
                sink: Mutex::new(Box::new(sink)),
                frame: AtomicU64::new(0),
                listeners: Mutex::new(Vec::new()),
            }),
            interval: Duration::from_secs_f64(1.0 / options.fps),
            auto_stop: options.auto_stop,
            timer: None,
        };
        if options.auto_start {
            renderer.start();
        }
        Ok(renderer)
    }

    /// Registers a listener fired once per tick with the exact string
    /// written to the sink.
    pub fn on_rendered(&self, listener: impl FnMut(&str) + Send + 'static) {
        self.inner.listeners.lock().unwrap().push(Box::new(listener));
    }

    /// Starts the timer, restarting if one is already active so that two
    /// timers never run concurrently. Resets the frame counter to 0 so the
    /// animation phase is deterministic per run.
    pub fn start(&mut self) {
        self.stop();
        self.inner.frame.store(0, Ordering::Relaxed);

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let inner = self.inner.clone();
        let interval = self.interval;
        let auto_stop = self.auto_stop;

        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        // A dropped frame beats a panicking render thread;
                        // callers needing sink errors use render() directly.
                        let _ = inner.render();
                        if auto_stop && !inner.root.should_be_rendered() {
                            break;
                        }
                    }
                    // Stop requested, or the renderer was dropped.
                    _ => break,
                }
            }
        });

        self.timer = Some(Timer { stop_tx, handle });
    }

    /// Cancels the active timer. Idempotent: stopping an idle renderer is
    /// a no-op.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            let _ = timer.stop_tx.send(());
            let _ = timer.handle.join();
        }
    }

    /// Reports whether the timer is active. Auto-stop flips this to
    /// `false` without a `stop()` call.
    pub fn running(&self) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|timer| !timer.handle.is_finished())
    }

    /// Renders one frame immediately: serializes the tree at the current
    /// frame, writes it to the sink, notifies `rendered` listeners,
    /// increments the frame counter and returns the produced string.
    ///
    /// Sink failures propagate; nothing is retried or buffered.
    pub fn render(&self) -> io::Result<String> {
        self.inner.render()
    }

    /// The frame the next render will draw. Reset on every [`start`].
    ///
    /// [`start`]: Renderer::start
    pub fn current_frame(&self) -> u64 {
        self.inner.frame.load(Ordering::Relaxed)
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.stop();
    }
}
