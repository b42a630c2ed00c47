use crate::level::Severity;
use crate::record::{Attr, LogRecord};

/// Record-handling contract shared by every handler in this crate.
///
/// Derivation (`with_attrs`, `with_group`) always returns a new handler and
/// leaves the receiver untouched, so a handler can be handed to many threads
/// while children are derived from it.
pub trait Handler: Send + Sync {
    /// Whether records at `severity` should be handled at all.
    ///
    /// Callers are expected to gate themselves; `handle` stays safe to call
    /// for disabled severities.
    fn enabled(&self, severity: Severity) -> bool;

    /// Format `record` and write it to the handler's sink.
    ///
    /// **Returns**
    /// - `Ok(())` once exactly one line was written.
    /// - `Err(HandleError::Serialization)` if the record's fields could not
    ///   be serialized. Nothing is written in that case.
    /// - `Err(HandleError::Io)` if the sink rejected the write.
    fn handle(&self, record: &LogRecord) -> Result<(), HandleError>;

    /// New handler whose context includes `attrs` after the existing ones.
    fn with_attrs(&self, attrs: &[Attr]) -> Self
    where
        Self: Sized;

    /// New handler that nests subsequent attribute keys under `name`.
    fn with_group(&self, name: &str) -> Self
    where
        Self: Sized;
}

/// Error type returned by [`Handler::handle`].
#[derive(thiserror::Error, Debug)]
pub enum HandleError {
    #[error("failed to serialize record fields: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write record: {0}")]
    Io(#[from] std::io::Error),
}
