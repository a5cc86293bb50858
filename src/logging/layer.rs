//! JSON lines output for `tracing` events.
//!
//! Each event becomes one JSON object:
//!
//! ```text
//! {"time":"2026-01-02T03:04:05.123456Z","level":"INFO","msg":"request completed",
//!  "service":"billing","req_id":"abc-123","method":"GET","path":"/health",
//!  "ip":"10.0.0.7","status":200,"latency":1204331,"user_agent":"curl/8.5.0"}
//! ```
//!
//! Span fields are flattened into the record from the outermost span inward,
//! followed by the event's own fields, so a span created "with fields" acts as
//! a derived logger. Spans are never filtered by level; only events are.
//!
//! Fields listed in [`JSON_FIELDS`] carry JSON text and are embedded as JSON
//! values; every other `Debug` field is rendered as a string.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata, Subscriber, span};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use super::level::Severity;

const MESSAGE_FIELD: &str = "message";

/// Fields recorded as serialized JSON and embedded as values.
pub const JSON_FIELDS: &[&str] = &["handler_errors"];

/// Fields recorded on a span, kept in the span's extensions.
#[derive(Debug, Default)]
struct SpanFields(Map<String, Value>);

/// Layer writing events as JSON lines.
#[derive(Clone)]
pub struct JsonLayer {
    service: Arc<str>,
    max_level: LevelFilter,
    with_source: bool,
    writer: Arc<BoxMakeWriter>,
}

impl JsonLayer {
    /// Creates a layer for `service` dropping events below `min_level`.
    ///
    /// Source locations are included when `min_level` is debug.
    pub fn new<W>(service: impl Into<String>, min_level: Severity, make_writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        Self {
            service: Arc::from(service.into()),
            max_level: min_level.into(),
            with_source: min_level.captures_source(),
            writer: Arc::new(BoxMakeWriter::new(make_writer)),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn source(metadata: &Metadata<'_>) -> Value {
        let mut source = Map::new();
        if let Some(file) = metadata.file() {
            source.insert("file".into(), file.into());
        }
        if let Some(line) = metadata.line() {
            source.insert("line".into(), line.into());
        }
        source.insert("target".into(), metadata.target().into());
        Value::Object(source)
    }
}

impl fmt::Debug for JsonLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLayer")
            .field("service", &self.service)
            .field("max_level", &self.max_level)
            .field("with_source", &self.with_source)
            .finish_non_exhaustive()
    }
}

impl<S> Layer<S> for JsonLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        metadata.is_span() || *metadata.level() <= self.max_level
    }

    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut fields = SpanFields::default();
        attrs.record(&mut FieldVisitor(&mut fields.0));
        span.extensions_mut().insert(fields);
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<SpanFields>() {
            values.record(&mut FieldVisitor(&mut fields.0));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > self.max_level {
            return;
        }

        let mut record = Map::new();
        record.insert(
            "time".into(),
            Utc::now()
                .to_rfc3339_opts(SecondsFormat::Micros, true)
                .into(),
        );
        record.insert("level".into(), metadata.level().to_string().into());
        record.insert("msg".into(), Value::String(String::new()));
        if self.with_source {
            record.insert("source".into(), Self::source(metadata));
        }
        record.insert("service".into(), Value::from(&*self.service));

        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(fields) = span.extensions().get::<SpanFields>() {
                    for (key, value) in &fields.0 {
                        record.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        let mut fields = Map::new();
        event.record(&mut FieldVisitor(&mut fields));
        if let Some(message) = fields.remove(MESSAGE_FIELD) {
            record.insert("msg".into(), message);
        }
        record.extend(fields);

        let Ok(mut line) = serde_json::to_vec(&Value::Object(record)) else {
            return;
        };
        line.push(b'\n');

        let mut writer = self.writer.make_writer_for(metadata);
        let _ = writer.write_all(&line);
    }
}

/// Records `tracing` field values as JSON values.
struct FieldVisitor<'a>(&'a mut Map<String, Value>);

impl FieldVisitor<'_> {
    fn insert(&mut self, field: &Field, value: Value) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        let value = if JSON_FIELDS.contains(&field.name()) {
            serde_json::from_str(value).unwrap_or_else(|_| Value::from(value))
        } else {
            Value::from(value)
        };
        self.insert(field, value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, value.to_string().into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{value:?}").into());
    }
}
