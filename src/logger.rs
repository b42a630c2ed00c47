use crate::handler::{HandleError, Handler};
use crate::level::Severity;
use crate::record::{Attr, LogRecord};

/// Application-facing front end over a [`Handler`].
///
/// Builds records stamped with the current time and skips them early when
/// the handler is disabled for their severity.
#[derive(Clone, Debug)]
pub struct Logger<H> {
    handler: H,
}

impl<H: Handler> Logger<H> {
    pub fn new(handler: H) -> Self {
        Logger { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        self.handler.enabled(severity)
    }

    /// Logger whose records all carry `attrs` as context.
    pub fn with(&self, attrs: &[Attr]) -> Self {
        Logger::new(self.handler.with_attrs(attrs))
    }

    pub fn with_group(&self, name: &str) -> Self {
        Logger::new(self.handler.with_group(name))
    }

    pub fn log(
        &self,
        severity: Severity,
        message: impl Into<String>,
        attrs: &[Attr],
    ) -> Result<(), HandleError> {
        if !self.handler.enabled(severity) {
            return Ok(());
        }
        let mut record = LogRecord::new(severity, message);
        record.add_attrs(attrs.iter().cloned());
        self.handler.handle(&record)
    }

    pub fn debug(&self, message: impl Into<String>, attrs: &[Attr]) -> Result<(), HandleError> {
        self.log(Severity::DEBUG, message, attrs)
    }

    pub fn info(&self, message: impl Into<String>, attrs: &[Attr]) -> Result<(), HandleError> {
        self.log(Severity::INFO, message, attrs)
    }

    pub fn warn(&self, message: impl Into<String>, attrs: &[Attr]) -> Result<(), HandleError> {
        self.log(Severity::WARN, message, attrs)
    }

    pub fn error(&self, message: impl Into<String>, attrs: &[Attr]) -> Result<(), HandleError> {
        self.log(Severity::ERROR, message, attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_sink::MemorySink;
    use crate::options::HandlerOptions;
    use crate::pretty::PrettyHandler;
    use crate::sink::SharedSink;

    fn logger(memory: &MemorySink) -> Logger<PrettyHandler> {
        let options = HandlerOptions::default().with_color(false);
        Logger::new(PrettyHandler::new(SharedSink::new(memory.clone()), options))
    }

    #[test]
    fn disabled_levels_are_skipped() {
        let memory = MemorySink::new();
        let log = logger(&memory);
        log.debug("hidden", &[]).unwrap();
        assert!(memory.is_empty());

        log.info("shown", &[Attr::new("n", 1)]).unwrap();
        assert_eq!(memory.lines()[0].split_once(' ').unwrap().1, "INFO shown {");
    }

    #[test]
    fn derived_loggers_carry_context() {
        let memory = MemorySink::new();
        let log = logger(&memory)
            .with_group("http")
            .with(&[Attr::new("method", "GET")]);
        log.warn("slow", &[]).unwrap();

        assert!(memory.contents().contains("\"method\": \"GET\""));
        assert_eq!(log.handler().baseline().context_keys(), vec!["http.method"]);
    }
}
