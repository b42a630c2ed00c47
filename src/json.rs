use crate::handler::{HandleError, Handler};
use crate::level::Severity;
use crate::options::HandlerOptions;
use crate::record::{merge_fields, Attr, LogRecord};
use crate::sink::SharedSink;
use std::sync::Arc;

/// Baseline handler that writes one compact JSON object per record.
///
/// Besides being usable on its own, it is the reference implementation of
/// severity gating and group bookkeeping: every attribute bound through
/// [`Handler::with_attrs`] is stored under its group-qualified key
/// (`group.key`, `outer.inner.key`).
///
/// Output shape:
/// ```text
/// {"level":"INFO","msg":"started","req.id":7,"time":"2024-05-01T13:05:07+00:00"}
/// ```
#[derive(Clone, Debug)]
pub struct JsonHandler {
    sink: SharedSink,
    options: Arc<HandlerOptions>,
    groups: Arc<[String]>,
    attrs: Arc<[Attr]>,
}

impl JsonHandler {
    pub fn new(sink: SharedSink, options: HandlerOptions) -> Self {
        JsonHandler {
            sink,
            options: Arc::new(options),
            groups: Arc::from(Vec::new()),
            attrs: Arc::from(Vec::new()),
        }
    }

    pub fn options(&self) -> &HandlerOptions {
        &self.options
    }

    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    /// Current group path, outermost first.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Bound attributes with their group-qualified keys.
    pub fn context_attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn context_keys(&self) -> Vec<&str> {
        self.attrs.iter().map(|a| a.key.as_str()).collect()
    }

    /// Prefix `key` with the current group path.
    pub fn qualify(&self, key: &str) -> String {
        if self.groups.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.groups.join("."), key)
        }
    }

    fn render(&self, record: &LogRecord) -> Result<Vec<u8>, HandleError> {
        let record_attrs: Vec<Attr> = record
            .attrs()
            .map(|a| Attr {
                key: self.qualify(&a.key),
                value: a.value.clone(),
            })
            .collect();

        let mut fields = serde_json::Map::new();
        fields.insert(
            "time".to_string(),
            serde_json::Value::String(record.timestamp.to_rfc3339()),
        );
        fields.insert(
            "level".to_string(),
            serde_json::Value::String(record.severity.to_string()),
        );
        fields.insert(
            "msg".to_string(),
            serde_json::Value::String(record.message.clone()),
        );
        // Bound attributes win over record attributes, as in `PrettyHandler`.
        fields.extend(merge_fields(record_attrs.iter().chain(self.attrs.iter()))?);

        let mut line = serde_json::to_vec(&serde_json::Value::Object(fields))?;
        line.push(b'\n');
        Ok(line)
    }
}

impl Handler for JsonHandler {
    fn enabled(&self, severity: Severity) -> bool {
        severity >= self.options.min_severity
    }

    fn handle(&self, record: &LogRecord) -> Result<(), HandleError> {
        let line = self.render(record)?;
        self.sink.write_line(&line)?;
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        let combined: Vec<Attr> = self
            .attrs
            .iter()
            .cloned()
            .chain(attrs.iter().map(|a| Attr {
                key: self.qualify(&a.key),
                value: a.value.clone(),
            }))
            .collect();
        JsonHandler {
            attrs: Arc::from(combined),
            ..self.clone()
        }
    }

    fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        let mut groups = self.groups.to_vec();
        groups.push(name.to_string());
        JsonHandler {
            groups: Arc::from(groups),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_sink::MemorySink;

    fn handler(memory: &MemorySink) -> JsonHandler {
        JsonHandler::new(SharedSink::new(memory.clone()), HandlerOptions::default())
    }

    #[test]
    fn gates_on_min_severity() {
        let h = handler(&MemorySink::new());
        assert!(!h.enabled(Severity::DEBUG));
        assert!(h.enabled(Severity::INFO));
        assert!(h.enabled(Severity::new(2)));
        assert!(h.enabled(Severity::ERROR));
    }

    #[test]
    fn groups_qualify_bound_keys() {
        let h = handler(&MemorySink::new())
            .with_attrs(&[Attr::new("top", 1)])
            .with_group("req")
            .with_group("")
            .with_attrs(&[Attr::new("id", 7)])
            .with_group("db")
            .with_attrs(&[Attr::new("table", "users")]);
        assert_eq!(h.groups(), ["req".to_string(), "db".to_string()]);
        assert_eq!(h.context_keys(), vec!["top", "req.id", "req.db.table"]);
    }

    #[test]
    fn writes_one_json_line() {
        let memory = MemorySink::new();
        let h = handler(&memory).with_group("g").with_attrs(&[Attr::new("k", "v")]);
        h.handle(&LogRecord::new(Severity::WARN, "hello").with_attr("n", 3))
            .unwrap();

        let lines = memory.lines();
        assert_eq!(lines.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["level"], "WARN");
        assert_eq!(parsed["msg"], "hello");
        assert_eq!(parsed["g.k"], "v");
        assert_eq!(parsed["g.n"], 3);
    }

    #[test]
    fn bound_attrs_win_over_record_attrs() {
        let memory = MemorySink::new();
        let h = handler(&memory).with_attrs(&[Attr::new("a", 2)]);
        h.handle(&LogRecord::new(Severity::INFO, "m").with_attr("a", 1))
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&memory.lines()[0]).unwrap();
        assert_eq!(parsed["a"], 2);
    }

    #[test]
    fn serialization_failure_writes_nothing() {
        let memory = MemorySink::new();
        let h = handler(&memory);
        let err = h
            .handle(&LogRecord::new(Severity::INFO, "x").with_attr("bad", f64::NAN))
            .unwrap_err();
        assert!(matches!(err, HandleError::Serialization(_)));
        assert!(memory.is_empty());
    }
}
