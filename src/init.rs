use crate::layer::{PrettyLayer, SeverityFilter};
use crate::options::{ConfigError, HandlerOptions};
use crate::pretty::PrettyHandler;
use crate::sink::SharedSink;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

/// Error returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to install global subscriber: {0}")]
    SetGlobal(#[from] SetGlobalDefaultError),
}

/// Install a [`Registry`] combined with a [`PrettyLayer`] writing to `sink`
/// as the global default subscriber.
///
/// The severity threshold is attached as a per-layer [`SeverityFilter`].
///
/// **Parameters**
/// - `sink`: where rendered lines go; usually [`SharedSink::stdout`].
/// - `options`: [`HandlerOptions`] for the pretty handler.
///
/// **Returns**
/// - `Err(InitError::SetGlobal)` if a global subscriber is already set.
pub fn init_pretty_logging_to(sink: SharedSink, options: HandlerOptions) -> Result<(), InitError> {
    let filter = SeverityFilter::new(options.min_severity);
    let layer = PrettyLayer::new(PrettyHandler::new(sink, options)).with_filter(filter);
    let subscriber = Registry::default().with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Install the pretty handler on stdout as the global subscriber.
pub fn init_pretty_logging(options: HandlerOptions) -> Result<(), InitError> {
    init_pretty_logging_to(SharedSink::stdout(), options)
}

/// Like [`init_pretty_logging`], with options read from the environment.
///
/// See [`HandlerOptions::from_env`] for the variables consulted. This is the
/// recommended entrypoint for typical binaries.
pub fn init_from_env() -> Result<(), InitError> {
    init_pretty_logging(HandlerOptions::from_env()?)
}
