use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use super::LogRouter;

/// Forwards `tracing` events into a [`LogRouter`].
///
/// With this layer registered, events raised by library code on a job's
/// thread (the model client's request diagnostics, for instance) end up in
/// that job's log next to the harness's own lines.
pub struct RouterLayer {
    router: Arc<LogRouter>,
}

impl RouterLayer {
    pub fn new(router: Arc<LogRouter>) -> Self {
        Self { router }
    }
}

impl<S: Subscriber> Layer<S> for RouterLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.router
            .emit(*event.metadata().level(), visitor.finish());
    }
}

/// Renders an event as `message key=value ...`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
