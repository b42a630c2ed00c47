//! Environment variable names used by this crate for convenient
//! configuration of handlers from applications.
//!
//! These are purely helpers; [`HandlerOptions`](crate::options::HandlerOptions)
//! itself stays decoupled from environment access.

/// Minimum severity, e.g. `debug`, `warn`, `INFO+2`.
pub const PRETTY_LOG_LEVEL_ENV: &str = "PRETTY_LOG_LEVEL";

/// strftime layout for the timestamp column, e.g. `[%H:%M:%S%.3f]`.
pub const PRETTY_LOG_TIME_LAYOUT_ENV: &str = "PRETTY_LOG_TIME_LAYOUT";

/// Any non-empty value disables ANSI colors (see <https://no-color.org>).
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// Read an environment variable, treating unset and empty the same.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
