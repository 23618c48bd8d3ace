//! Routes `tracing` events into a [`Logger`].
//!
//! With the layer installed, dependencies that log through `tracing` share
//! the logger's JSON output and severity gate. Spans are not recorded.

use std::fmt;

use tracing::field::{Field as TracingField, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::encoder::Caller;
use crate::error::LogError;
use crate::field::Field;
use crate::level::Level;
use crate::logger::{Log, Logger};

pub struct LoggerLayer {
    logger: Logger,
}

impl LoggerLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: Vec<Field>,
}

impl EventVisitor {
    fn push(&mut self, field: &TracingField, value: serde_json::Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            });
        } else {
            self.fields.push(Field::new(field.name(), value));
        }
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &TracingField, value: &str) {
        self.push(field, value.into());
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.push(field, value.into());
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.push(field, value.into());
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.push(field, value.into());
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.push(field, value.into());
    }

    fn record_error(&mut self, field: &TracingField, value: &(dyn std::error::Error + 'static)) {
        self.push(field, value.to_string().into());
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug) {
        self.push(field, format!("{:?}", value).into());
    }
}

impl<S: Subscriber> Layer<S> for LoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Level::from(*metadata.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let caller = metadata
            .file()
            .zip(metadata.line())
            .map(|(file, line)| Caller::new(file, line));

        self.logger.named(metadata.target()).log_at(
            level,
            visitor.message.as_deref().unwrap_or_default(),
            &visitor.fields,
            caller,
        );
    }
}

/// Installs a global `tracing` subscriber that forwards into `logger`.
///
/// `RUST_LOG` narrows which targets reach the logger; the logger's own gate
/// still applies afterwards.
pub fn init_tracing(logger: &Logger) -> Result<(), LogError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));

    tracing_subscriber::registry()
        .with(filter)
        .with(LoggerLayer::new(logger.clone()))
        .try_init()
        .map_err(|err| LogError::Subscriber(err.to_string()))
}
