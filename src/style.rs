use std::sync::Arc;

use owo_colors::{OwoColorize, Style};

use crate::ConfigError;

/// A color transform applied to rendered text.
///
/// Opaque to the library: any `&str -> String` function works, from
/// `owo-colors` styling to test doubles that wrap text in markers.
pub type Color = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The no-op color. Text passes through unchanged.
pub fn identity() -> Color {
    Arc::new(|text| text.to_string())
}

fn painted(style: Style) -> Color {
    Arc::new(move |text| text.style(style).to_string())
}

/// A status glyph plus the color it is rendered in.
#[derive(Clone)]
pub struct SignStyle {
    pub color: Color,
    pub sign: String,
}

impl SignStyle {
    pub fn new(color: Color, sign: impl Into<String>) -> Self {
        Self {
            color,
            sign: sign.into(),
        }
    }
}

/// An ordered, cyclic glyph sequence plus the color it is rendered in.
#[derive(Clone)]
pub struct SpinnerStyle {
    pub color: Color,
    pub frames: Vec<String>,
}

impl SpinnerStyle {
    pub fn new<I, S>(color: Color, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            color,
            frames: frames.into_iter().map(Into::into).collect(),
        }
    }
}

/// Braille dot spinner, the built-in default for pending and running.
pub(crate) const DOTS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Partial style configuration, merged over built-in defaults.
///
/// Any subset of fields may be set; unset fields fall back to identity or
/// standard colors and Unicode glyphs.
///
/// ```rust,ignore
/// let styles = StyleOptions {
///     indent: Some("....".into()),
///     success: Some(SignStyle::new(identity(), "done")),
///     ..StyleOptions::default()
/// };
/// let tree = StepContainer::with_styles(styles)?;
/// ```
#[derive(Clone, Default)]
pub struct StyleOptions {
    /// Inserted once per depth level in front of a step's line.
    pub indent: Option<String>,
    /// Applied to a step's title text.
    pub title: Option<SignStyle>,
    /// Applied to trailing log annotations.
    pub log: Option<SignStyle>,
    pub pending: Option<SpinnerStyle>,
    pub running: Option<SpinnerStyle>,
    pub info: Option<SignStyle>,
    pub warn: Option<SignStyle>,
    pub error: Option<SignStyle>,
    pub success: Option<SignStyle>,
    pub skipped: Option<SignStyle>,
}

/// Compiled styles, shared read-only by a step and everything spawned
/// from it. Each node keeps a handle to its own compiled set, so trees
/// assembled from separately built subtrees stay visually consistent
/// per subtree.
///
/// Terminal signs and spinner frames are colored once here, so per-frame
/// rendering only selects from precomputed strings. Title and log keep
/// their color functions since they color caller-supplied text.
pub(crate) struct Styles {
    pub(crate) indent: String,
    pub(crate) title: SignStyle,
    pub(crate) log: SignStyle,
    pub(crate) pending: Vec<String>,
    pub(crate) running: Vec<String>,
    pub(crate) info: String,
    pub(crate) warn: String,
    pub(crate) error: String,
    pub(crate) success: String,
    pub(crate) skipped: String,
}

impl Default for Styles {
    fn default() -> Self {
        let gray = painted(Style::new().bright_black());
        Self {
            indent: "  ".to_string(),
            title: SignStyle::new(identity(), " "),
            log: SignStyle::new(gray.clone(), " -> "),
            pending: color_frames(&gray, DOTS),
            running: color_frames(&painted(Style::new().cyan()), DOTS),
            info: painted(Style::new().blue())("ℹ"),
            warn: painted(Style::new().yellow())("⚠"),
            error: painted(Style::new().red())("✖"),
            success: painted(Style::new().green())("✓"),
            skipped: gray("↓"),
        }
    }
}

impl Styles {
    /// Merges `options` over the defaults and precomputes colored output.
    ///
    /// Fails fast on empty spinner frame lists so frame selection can
    /// never divide by zero mid-render.
    pub(crate) fn compile(options: StyleOptions) -> Result<Self, ConfigError> {
        let base = Styles::default();
        Ok(Self {
            indent: options.indent.unwrap_or(base.indent),
            title: options.title.unwrap_or(base.title),
            log: options.log.unwrap_or(base.log),
            pending: match options.pending {
                Some(spinner) => compile_spinner("pending", spinner)?,
                None => base.pending,
            },
            running: match options.running {
                Some(spinner) => compile_spinner("running", spinner)?,
                None => base.running,
            },
            info: options.info.map_or(base.info, compile_sign),
            warn: options.warn.map_or(base.warn, compile_sign),
            error: options.error.map_or(base.error, compile_sign),
            success: options.success.map_or(base.success, compile_sign),
            skipped: options.skipped.map_or(base.skipped, compile_sign),
        })
    }

    /// Title as rendered: the title sign prefixed, then colored.
    pub(crate) fn compile_title(&self, title: &str) -> String {
        (self.title.color)(&format!("{}{}", self.title.sign, title))
    }

    /// Log annotation as rendered. Empty input clears the annotation.
    pub(crate) fn compile_log(&self, message: &str) -> String {
        if message.is_empty() {
            return String::new();
        }
        (self.log.color)(&format!("{}{}", self.log.sign, message))
    }
}

fn compile_sign(sign: SignStyle) -> String {
    (sign.color)(&sign.sign)
}

fn compile_spinner(state: &'static str, spinner: SpinnerStyle) -> Result<Vec<String>, ConfigError> {
    if spinner.frames.is_empty() {
        return Err(ConfigError::EmptySpinner(state));
    }
    Ok(spinner
        .frames
        .iter()
        .map(|frame| (spinner.color)(frame))
        .collect())
}

fn color_frames<I, S>(color: &Color, frames: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    frames.into_iter().map(|f| color(f.as_ref())).collect()
}
