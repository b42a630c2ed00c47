use crate::handler::{HandleError, Handler};
use crate::json::JsonHandler;
use crate::level::Severity;
use crate::options::{HandlerOptions, DEFAULT_TIME_LAYOUT};
use crate::record::{merge_fields, Attr, LogRecord};
use crate::sink::SharedSink;
use console::{Color, Style};
use std::fmt::Write as _;
use std::sync::Arc;

/// Human-readable, colorized handler.
///
/// Every record becomes one write to the shared sink:
///
/// ```text
/// [13:05:07] INFO request served {
///   "path": "/health",
///   "status": 200
/// }
/// ```
///
/// The severity is colored by level, the message is cyan and the merged
/// field block is white. The field block is left out entirely when there
/// are no fields.
///
/// Severity gating and group bookkeeping are delegated to an inner
/// [`JsonHandler`]; its own output is never used.
#[derive(Clone, Debug)]
pub struct PrettyHandler {
    baseline: JsonHandler,
    attrs: Arc<[Attr]>,
}

impl PrettyHandler {
    pub fn new(sink: SharedSink, options: HandlerOptions) -> Self {
        PrettyHandler {
            baseline: JsonHandler::new(sink, options),
            attrs: Arc::from(Vec::new()),
        }
    }

    /// Handler writing to the process stdout.
    pub fn stdout(options: HandlerOptions) -> Self {
        Self::new(SharedSink::stdout(), options)
    }

    pub fn options(&self) -> &HandlerOptions {
        self.baseline.options()
    }

    pub fn sink(&self) -> &SharedSink {
        self.baseline.sink()
    }

    /// Attributes bound through [`Handler::with_attrs`], unqualified.
    pub fn context_attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// The handler used for gating and group bookkeeping.
    pub fn baseline(&self) -> &JsonHandler {
        &self.baseline
    }

    fn style(&self, color: Color) -> Style {
        Style::new().fg(color).force_styling(self.options().color)
    }

    fn severity_color(severity: Severity) -> Option<Color> {
        match severity {
            Severity::DEBUG => Some(Color::Magenta),
            Severity::INFO => Some(Color::Blue),
            Severity::WARN => Some(Color::Yellow),
            Severity::ERROR => Some(Color::Red),
            _ => None,
        }
    }

    fn timestamp(&self, record: &LogRecord) -> String {
        let mut out = String::new();
        if write!(out, "{}", record.timestamp.format(self.options().time_layout())).is_err() {
            out.clear();
            let _ = write!(out, "{}", record.timestamp.format(DEFAULT_TIME_LAYOUT));
        }
        out
    }

    /// Render the full line, including the trailing newline.
    pub fn render(&self, record: &LogRecord) -> Result<String, HandleError> {
        // Context attributes come last so they win over record attributes.
        let fields = merge_fields(record.attrs().chain(self.attrs.iter()))?;
        let block = if fields.is_empty() {
            None
        } else {
            Some(serde_json::to_string_pretty(&fields)?)
        };

        let severity = match Self::severity_color(record.severity) {
            Some(color) => self.style(color).apply_to(record.severity).to_string(),
            None => record.severity.to_string(),
        };

        let mut line = format!(
            "{} {} {}",
            self.timestamp(record),
            severity,
            self.style(Color::Cyan).apply_to(&record.message)
        );
        if let Some(block) = block {
            let _ = write!(line, " {}", self.style(Color::White).apply_to(block));
        }
        line.push('\n');
        Ok(line)
    }
}

impl Handler for PrettyHandler {
    fn enabled(&self, severity: Severity) -> bool {
        self.baseline.enabled(severity)
    }

    fn handle(&self, record: &LogRecord) -> Result<(), HandleError> {
        let line = self.render(record)?;
        self.sink().write_line(line.as_bytes())?;
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        let combined: Vec<Attr> = self.attrs.iter().chain(attrs).cloned().collect();
        PrettyHandler {
            baseline: self.baseline.with_attrs(attrs),
            attrs: Arc::from(combined),
        }
    }

    fn with_group(&self, name: &str) -> Self {
        PrettyHandler {
            baseline: self.baseline.with_group(name),
            attrs: Arc::clone(&self.attrs),
        }
    }
}
