use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Output stream shared by a handler and everything derived from it.
///
/// Cloning is cheap and yields a handle to the same writer. Each call to
/// [`SharedSink::write_line`] holds the lock for the whole write, so lines
/// coming from concurrent handlers never interleave.
///
/// The sink does not own the lifetime of the underlying stream in any
/// special way: it is dropped when the last clone goes away.
#[derive(Clone)]
pub struct SharedSink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SharedSink {
    /// Wrap an arbitrary writer.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        SharedSink {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Write a fully rendered line with a single `write_all` and flush.
    ///
    /// A poisoned lock is recovered: a panic in another writer does not
    /// stop this one from logging.
    pub fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let mut writer = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(line)?;
        writer.flush()
    }

    /// Whether two sinks point at the same underlying writer.
    pub fn same_as(&self, other: &SharedSink) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SharedSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSink")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
