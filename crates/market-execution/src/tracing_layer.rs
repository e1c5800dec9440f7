//! Custom tracing layer for streaming invocation events to a front end
//!
//! The lifecycle controller logs every phase change with structured fields
//! (`tool`, `phase`, `attempt`). This layer captures those events and
//! forwards them over a tokio channel so a UI can follow an invocation
//! without parsing log lines.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Targets forwarded by default.
pub const DEFAULT_TARGET_PREFIX: &str = "market_application";

/// Event data sent to the front end
#[derive(Debug, Clone, serde::Serialize)]
pub struct InvocationEvent {
    /// Event target (e.g., "market_application::controller")
    pub target: String,
    /// Log level (INFO, DEBUG, WARN, ERROR)
    pub level: String,
    /// Human-readable message
    pub message: String,
    /// Structured fields from the event
    pub fields: HashMap<String, Value>,
    /// Fields of the enclosing spans, outermost first
    pub span: HashMap<String, Value>,
    /// Timestamp
    pub timestamp: String,
}

impl InvocationEvent {
    /// Tool key from the event or its span.
    pub fn tool(&self) -> Option<&str> {
        self.field("tool")
    }

    /// Lifecycle phase reported by the event, if any.
    pub fn phase(&self) -> Option<&str> {
        self.field("phase")
    }

    pub fn attempt(&self) -> Option<u64> {
        self.fields.get("attempt").and_then(Value::as_u64)
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .or_else(|| self.span.get(name))
            .and_then(Value::as_str)
    }
}

/// Span fields recorded at span creation.
#[derive(Default, Clone)]
struct SpanFields(HashMap<String, Value>);

/// A tracing layer that sends invocation events to a channel
pub struct InvocationEventLayer {
    sender: mpsc::UnboundedSender<InvocationEvent>,
    target_prefix: String,
}

impl InvocationEventLayer {
    /// Create a new layer with the given channel sender
    pub fn new(sender: mpsc::UnboundedSender<InvocationEvent>) -> Self {
        Self {
            sender,
            target_prefix: DEFAULT_TARGET_PREFIX.to_string(),
        }
    }

    /// Forward events whose target starts with `prefix` instead.
    pub fn with_target_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.target_prefix = prefix.into();
        self
    }
}

impl<S> Layer<S> for InvocationEventLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = HashMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        span.extensions_mut().insert(SpanFields(fields));
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(&self.target_prefix) {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        let mut span_fields = HashMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(stored) = span.extensions().get::<SpanFields>() {
                    span_fields.extend(stored.0.clone());
                }
            }
        }

        let invocation_event = InvocationEvent {
            target: metadata.target().to_string(),
            level: metadata.level().to_string(),
            message: fields
                .remove("message")
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            fields,
            span: span_fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver may be gone once the front end shut down
        let _ = self.sender.send(invocation_event);
    }
}

/// Field visitor that extracts tracing fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        // Display-formatted fields (`%value`) arrive here too
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}
