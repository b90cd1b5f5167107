#![doc = include_str!("../README.md")]

pub(crate) mod renderer;
pub(crate) mod step;
pub(crate) mod style;
pub(crate) mod writer;

#[cfg(feature = "tracing")]
pub(crate) mod tracing;


/// Re-exports of all public types and traits.
pub mod prelude {
    pub use crate::renderer::{Options, Renderer};
    pub use crate::step::{State, Step, StepContainer};
    pub use crate::style::{Color, SignStyle, SpinnerStyle, StyleOptions, identity};
    #[cfg(feature = "tracing")]
    pub use crate::tracing::{StepLayer, step_layer};
    pub use crate::writer::{FnSink, OverwriteSink, Sink};
    pub use crate::{ConfigError, Renderable};
}

pub use crate::prelude::*;

/// The read contract shared by [`Step`] and [`StepContainer`].
///
/// The [`Renderer`] only ever talks to its root through this trait: it
/// samples the current text form for a frame number and asks whether any
/// work is still in flight. A tree root is simply a renderable without a
/// line of its own.
pub trait Renderable {
    /// Serializes the full tree for the given animation frame.
    ///
    /// Pure in the frame number and the current tree state: rendering the
    /// same frame twice without intervening mutation yields the same
    /// string. Lines are joined with `\n` in insertion order, depth-first.
    fn render_frame(&self, frame: u64) -> String;

    /// Returns `true` while this node or any descendant is still pending
    /// or running. Drives the renderer's auto-stop.
    fn should_be_rendered(&self) -> bool;
}

/// Configuration rejected at construction time.
///
/// Presentation bugs should surface immediately, so degenerate
/// configuration fails fast instead of dividing by zero mid-render.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A spinner was configured with an empty frame list.
    #[error("spinner for the `{0}` state has no frames")]
    EmptySpinner(&'static str),
    /// `fps` must be a positive, finite number.
    #[error("fps must be positive and finite, got {0}")]
    Fps(f64),
}
