use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Ordered log severity.
///
/// The four named levels are spaced four apart so that applications can
/// slot custom levels between them (`INFO+2`, `DEBUG-4`, ...). Any integer
/// is a valid severity; only the named ones get special rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Severity(i32);

impl Severity {
    pub const DEBUG: Severity = Severity(-4);
    pub const INFO: Severity = Severity(0);
    pub const WARN: Severity = Severity(4);
    pub const ERROR: Severity = Severity(8);

    pub const fn new(value: i32) -> Self {
        Severity(value)
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    /// Whether this is one of the four named levels.
    pub fn is_named(self) -> bool {
        matches!(self, Self::DEBUG | Self::INFO | Self::WARN | Self::ERROR)
    }

    fn base(self) -> (&'static str, Severity) {
        if self < Self::INFO {
            ("DEBUG", Self::DEBUG)
        } else if self < Self::WARN {
            ("INFO", Self::INFO)
        } else if self < Self::ERROR {
            ("WARN", Self::WARN)
        } else {
            ("ERROR", Self::ERROR)
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::INFO
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, base) = self.base();
        let offset = self.0 - base.0;
        if offset == 0 {
            f.write_str(name)
        } else {
            write!(f, "{}{:+}", name, offset)
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error returned when a severity string cannot be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid severity: {0:?}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    /// Accepts `DEBUG`, `info`, `WARN+1`, `error-2` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeverityError(s.to_string());
        let trimmed = s.trim();
        let split = trimmed.find(|c: char| c == '+' || c == '-').unwrap_or(trimmed.len());
        let (name, offset) = trimmed.split_at(split);

        let base = match name.to_ascii_uppercase().as_str() {
            "DEBUG" => Self::DEBUG,
            "INFO" => Self::INFO,
            "WARN" | "WARNING" => Self::WARN,
            "ERROR" => Self::ERROR,
            _ => return Err(err()),
        };

        if offset.is_empty() {
            return Ok(base);
        }
        let offset: i32 = offset.parse().map_err(|_| err())?;
        base.0.checked_add(offset).map(Severity).ok_or_else(err)
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Severity(-8),
            tracing::Level::DEBUG => Self::DEBUG,
            tracing::Level::INFO => Self::INFO,
            tracing::Level::WARN => Self::WARN,
            tracing::Level::ERROR => Self::ERROR,
        }
    }
}

impl From<&tracing::Level> for Severity {
    fn from(level: &tracing::Level) -> Self {
        Self::from(*level)
    }
}
