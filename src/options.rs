use crate::env::{
    env_non_empty, NO_COLOR_ENV, PRETTY_LOG_LEVEL_ENV, PRETTY_LOG_TIME_LAYOUT_ENV,
};
use crate::level::Severity;
use chrono::format::{Item, StrftimeItems};

/// Default timestamp layout: bracketed 24-hour clock, e.g. `[13:05:07]`.
pub const DEFAULT_TIME_LAYOUT: &str = "[%H:%M:%S]";

/// Construction-time configuration shared by the handlers in this crate.
///
/// **Fields**
/// - `min_severity`: records below this severity are reported as disabled.
/// - `time_layout`: chrono strftime layout for the timestamp column.
/// - `color`: whether ANSI colors are emitted at all.
///
/// Options are fixed once a handler is built; derived handlers inherit them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerOptions {
    pub min_severity: Severity,
    time_layout: String,
    pub color: bool,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            min_severity: Severity::INFO,
            time_layout: DEFAULT_TIME_LAYOUT.to_string(),
            color: true,
        }
    }
}

impl HandlerOptions {
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Replace the timestamp layout.
    ///
    /// The layout is validated here so that rendering a timestamp later can
    /// never fail.
    pub fn with_time_layout(mut self, layout: impl Into<String>) -> Result<Self, ConfigError> {
        let layout = layout.into();
        if StrftimeItems::new(&layout).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidTimeLayout(layout));
        }
        self.time_layout = layout;
        Ok(self)
    }

    pub fn time_layout(&self) -> &str {
        &self.time_layout
    }

    /// Build options from `PRETTY_LOG_LEVEL`, `PRETTY_LOG_TIME_LAYOUT` and
    /// `NO_COLOR`, falling back to the defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut options = Self::default();

        if let Some(level) = env_non_empty(PRETTY_LOG_LEVEL_ENV) {
            options.min_severity = level
                .parse()
                .map_err(|_| ConfigError::InvalidSeverity(level))?;
        }
        if let Some(layout) = env_non_empty(PRETTY_LOG_TIME_LAYOUT_ENV) {
            options = options.with_time_layout(layout)?;
        }
        if env_non_empty(NO_COLOR_ENV).is_some() {
            options.color = false;
        }

        Ok(options)
    }
}

/// Error type returned when building [`HandlerOptions`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid minimum severity: {0:?}")]
    InvalidSeverity(String),

    #[error("invalid time layout: {0:?}")]
    InvalidTimeLayout(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn defaults() {
        let opts = HandlerOptions::default();
        assert_eq!(opts.min_severity, Severity::INFO);
        assert_eq!(opts.time_layout(), "[%H:%M:%S]");
        assert!(opts.color);
    }

    #[test]
    fn accepts_valid_layout() {
        let opts = HandlerOptions::default()
            .with_time_layout("%Y-%m-%d %H:%M:%S%.3f")
            .unwrap();
        assert_eq!(opts.time_layout(), "%Y-%m-%d %H:%M:%S%.3f");
    }

    // Tests touching process environment variables hold this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [PRETTY_LOG_LEVEL_ENV, PRETTY_LOG_TIME_LAYOUT_ENV, NO_COLOR_ENV] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn from_env_reads_all_variables() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        assert_eq!(HandlerOptions::from_env().unwrap(), HandlerOptions::default());

        std::env::set_var(PRETTY_LOG_LEVEL_ENV, "warn+1");
        std::env::set_var(PRETTY_LOG_TIME_LAYOUT_ENV, "%H:%M");
        std::env::set_var(NO_COLOR_ENV, "1");
        let opts = HandlerOptions::from_env();
        clear_env();

        let opts = opts.unwrap();
        assert_eq!(opts.min_severity, Severity::new(5));
        assert_eq!(opts.time_layout(), "%H:%M");
        assert!(!opts.color);
    }

    #[test]
    fn from_env_rejects_bad_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var(PRETTY_LOG_LEVEL_ENV, "chatty");
        let level = HandlerOptions::from_env();
        clear_env();
        std::env::set_var(PRETTY_LOG_TIME_LAYOUT_ENV, "%Q");
        let layout = HandlerOptions::from_env();
        clear_env();

        assert_eq!(level.unwrap_err(), ConfigError::InvalidSeverity("chatty".to_string()));
        assert_eq!(layout.unwrap_err(), ConfigError::InvalidTimeLayout("%Q".to_string()));
    }

    #[test]
    fn rejects_invalid_layout() {
        let err = HandlerOptions::default().with_time_layout("%Q").unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeLayout("%Q".to_string()));
    }
}
