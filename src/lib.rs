pub mod env;
pub mod handler;
pub mod init;
pub mod json;
pub mod layer;
pub mod level;
pub mod logger;
pub mod memory_sink;
pub mod options;
pub mod pretty;
pub mod record;
pub mod sink;

pub use handler::{HandleError, Handler};
pub use json::JsonHandler;
pub use layer::PrettyLayer;
pub use level::Severity;
pub use logger::Logger;
pub use options::HandlerOptions;
pub use pretty::PrettyHandler;
pub use record::{Attr, LogRecord, Value};
pub use sink::SharedSink;
