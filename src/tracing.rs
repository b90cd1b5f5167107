use std::collections::HashMap;
use std::sync::Mutex;

use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

use crate::step::{Step, StepContainer};

/// Creates a [`StepLayer`] spawning steps into `container`.
pub fn step_layer(container: &StepContainer) -> StepLayer {
    StepLayer::new(container.clone())
}

/// A `tracing` [`Layer`] that mirrors spans as steps.
///
/// A new span spawns a running step under the enclosing span's step (or
/// at the container's top level), titled with the span name and annotated
/// with its `message` field when present. Events inside a span update the
/// step's log annotation; closing the span settles it as `Success`.
///
/// ```rust,ignore
/// let tree = StepContainer::new();
/// let renderer = Renderer::new(tree.clone(), Options::default())?;
/// tracing_subscriber::registry().with(step_layer(&tree)).init();
///
/// let span = tracing::info_span!("deploy");
/// span.in_scope(|| tracing::info!("waiting for health check"));
/// ```
pub struct StepLayer {
    container: StepContainer,
    spans: Mutex<HashMap<Id, Step>>,
}

impl StepLayer {
    pub fn new(container: StepContainer) -> Self {
        Self {
            container,
            spans: Mutex::new(HashMap::new()),
        }
    }

    fn step_for(&self, id: &Id) -> Option<Step> {
        self.spans.lock().unwrap().get(id).cloned()
    }
}

impl<S> Layer<S> for StepLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let parent = ctx
            .span(id)
            .and_then(|span| span.parent())
            .and_then(|parent| self.step_for(&parent.id()));

        let name = attrs.metadata().name();
        let step = match parent {
            Some(parent) => parent.spawn(name),
            None => self.container.spawn(name),
        };

        let mut message = String::new();
        attrs.record(&mut MessageVisitor(&mut message));
        if message.is_empty() {
            step.start();
        } else {
            step.start_with(&message);
        }

        self.spans.lock().unwrap().insert(id.clone(), step);
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let Some(step) = ctx
            .lookup_current()
            .and_then(|span| self.step_for(&span.id()))
        else {
            return;
        };
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        if !message.is_empty() {
            step.log([message]);
        }
    }

    fn on_close(&self, id: Id, _ctx: Context<'_, S>) {
        if let Some(step) = self.spans.lock().unwrap().remove(&id) {
            step.success();
        }
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            *self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{:?}", value);
        }
    }
}
