use crate::handler::Handler;
use crate::level::Severity;
use crate::record::{Attr, LogRecord, Value};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Filter, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns `tracing` events into
/// [`LogRecord`]s and hands them to a [`Handler`].
///
/// Each span enclosing an event becomes a group named after the span, and
/// the span's fields become context attributes of that group. Records the
/// handler fails to render are counted in `failed_events` and reported on
/// stderr; the application never sees the error.
///
/// The layer does not filter callsites itself; events below the handler's
/// threshold are dropped in `on_event`. Pair it with [`SeverityFilter`] to
/// skip them before any fields are visited.
pub struct PrettyLayer<H> {
    handler: H,
    /// Total events seen by the layer (after level gating).
    pub total_events: Arc<AtomicU64>,
    /// Events the handler could not render or write.
    pub failed_events: Arc<AtomicU64>,
}

impl<H: Handler> PrettyLayer<H> {
    pub fn new(handler: H) -> Self {
        PrettyLayer {
            handler,
            total_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Derive a handler for the spans enclosing `event`, outermost first.
    /// Returns `None` when the event is not inside any span.
    fn scoped_handler<S>(&self, event: &Event<'_>, ctx: &Context<'_, S>) -> Option<H>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let scope = ctx.event_scope(event)?;
        let mut scoped: Option<H> = None;
        for span in scope.from_root() {
            let parent = scoped.as_ref().unwrap_or(&self.handler);
            let grouped = parent.with_group(span.name());
            let extensions = span.extensions();
            scoped = Some(match extensions.get::<SpanFields>() {
                Some(fields) => grouped.with_attrs(&fields.0),
                None => grouped,
            });
        }
        scoped
    }
}

/// Fields recorded on a span, stored in the span's extensions.
struct SpanFields(Vec<Attr>);

/// Replace the attribute with the same key, or append a new one.
fn upsert(fields: &mut Vec<Attr>, attr: Attr) {
    match fields.iter_mut().find(|f| f.key == attr.key) {
        Some(existing) => existing.value = attr.value,
        None => fields.push(attr),
    }
}

/// Per-layer severity filter for [`PrettyLayer`].
///
/// Attach it with [`Layer::with_filter`] so the threshold only applies to
/// this layer and never silences other layers in the same stack. Spans
/// always pass so their fields reach enabled events.
#[derive(Clone, Copy, Debug)]
pub struct SeverityFilter {
    min: Severity,
}

impl SeverityFilter {
    pub fn new(min: Severity) -> Self {
        SeverityFilter { min }
    }
}

impl<S> Filter<S> for SeverityFilter {
    fn enabled(&self, metadata: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        metadata.is_span() || Severity::from(*metadata.level()) >= self.min
    }
}

impl<S, H> Layer<S> for PrettyLayer<H>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    H: Handler + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = Vec::new();
        let mut message = None;
        attrs.record(&mut FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        });
        if let Some(message) = message {
            fields.push(Attr::new("message", message));
        }
        span.extensions_mut().insert(SpanFields(fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut recorded = Vec::new();
        let mut message = None;
        values.record(&mut FieldVisitor {
            fields: &mut recorded,
            message: &mut message,
        });
        if let Some(message) = message {
            recorded.push(Attr::new("message", message));
        }

        let mut extensions = span.extensions_mut();
        if let Some(SpanFields(fields)) = extensions.get_mut::<SpanFields>() {
            for attr in recorded {
                upsert(fields, attr);
            }
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let severity = Severity::from(*event.metadata().level());
        if !self.handler.enabled(severity) {
            return;
        }
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let mut fields = Vec::new();
        let mut message = None;
        event.record(&mut FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        });

        let mut record = LogRecord::new(severity, message.unwrap_or_default());
        record.add_attrs(fields);

        let result = match self.scoped_handler(event, &ctx) {
            Some(handler) => handler.handle(&record),
            None => self.handler.handle(&record),
        };
        if let Err(e) = result {
            self.failed_events.fetch_add(1, Ordering::Relaxed);
            eprintln!("failed to handle log record: {}", e);
        }
    }
}

/// Collects `tracing` fields as [`Attr`]s, pulling out the `message` field.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Vec<Attr>,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    fn push(&mut self, field: &Field, value: Value) {
        self.fields.push(Attr {
            key: field.name().to_string(),
            value,
        });
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.push(field, Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::Int(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::Uint(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::Float(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `info!("text {}", x)` delivers the message as `fmt::Arguments`.
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandleError;
    use std::sync::Mutex;
    use tracing::field::Empty;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    /// Captures the context keys each handled record was rendered with.
    #[derive(Clone, Default)]
    struct KeyCapture {
        context: Vec<String>,
        seen: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl Handler for KeyCapture {
        fn enabled(&self, _severity: Severity) -> bool {
            true
        }

        fn handle(&self, _record: &LogRecord) -> Result<(), HandleError> {
            self.seen.lock().unwrap().push(self.context.clone());
            Ok(())
        }

        fn with_attrs(&self, attrs: &[Attr]) -> Self {
            let mut next = self.clone();
            next.context.extend(attrs.iter().map(|a| a.key.clone()));
            next
        }

        fn with_group(&self, _name: &str) -> Self {
            self.clone()
        }
    }

    #[test]
    fn re_recorded_span_fields_replace_earlier_values() {
        let capture = KeyCapture::default();
        let seen = Arc::clone(&capture.seen);
        let subscriber = Registry::default().with(PrettyLayer::new(capture));

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("poll", attempt = Empty, host = "a");
            let _guard = span.enter();
            for i in 0..5 {
                span.record("attempt", i);
            }
            tracing::info!("done");
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], vec!["host".to_string(), "attempt".to_string()]);
    }

    #[test]
    fn upsert_replaces_by_key() {
        let mut fields = vec![Attr::new("a", 1), Attr::new("b", 2)];
        upsert(&mut fields, Attr::new("a", 3));
        upsert(&mut fields, Attr::new("c", 4));
        let keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(fields[0].value.to_json().unwrap(), serde_json::json!(3));
    }
}
