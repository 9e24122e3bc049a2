//! Logging infrastructure for the FormGuard shared library
//!
//! This module keeps a process-wide [`LoggingConfig`] and installs a
//! `tracing` subscriber for hosts that do not bring their own. Hosts that do
//! (the backend binary) still record their settings here so library code can
//! ask whether debug output is wanted.

use std::sync::{Arc, Mutex, OnceLock};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global logging configuration
static LOGGING_CONFIG: OnceLock<Arc<Mutex<LoggingConfig>>> = OnceLock::new();

/// Result type for logging setup
pub type LoggingResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Logging configuration structure
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Whether debug logging is enabled
    pub debug_enabled: bool,
    /// Log level filter
    pub level: Level,
    /// Whether to include timestamps
    pub include_timestamps: bool,
    /// Whether to include thread information
    pub include_thread_info: bool,
    /// Whether to include the event target
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug_enabled: false,
            level: Level::INFO,
            include_timestamps: true,
            include_thread_info: false,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Configuration with debug output switched on or off
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self.level = if enabled { Level::DEBUG } else { Level::INFO };
        self
    }
}

fn global() -> &'static Arc<Mutex<LoggingConfig>> {
    LOGGING_CONFIG.get_or_init(|| Arc::new(Mutex::new(LoggingConfig::default())))
}

/// Store a configuration and install a subscriber if none is installed yet
pub fn configure_logging(config: LoggingConfig) -> LoggingResult {
    {
        let mut stored = global()
            .lock()
            .map_err(|_| "Failed to acquire logging config lock")?;
        *stored = config.clone();
    }

    setup_subscriber(&config);
    tracing::debug!("Logging configured: debug_enabled={}", config.debug_enabled);
    Ok(())
}

/// Enable or disable debug logging
pub fn set_debug_enabled(enabled: bool) -> LoggingResult {
    let config = {
        let mut stored = global()
            .lock()
            .map_err(|_| "Failed to acquire logging config lock")?;
        *stored = stored.clone().with_debug(enabled);
        stored.clone()
    };

    setup_subscriber(&config);
    Ok(())
}

/// Check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    LOGGING_CONFIG
        .get()
        .and_then(|config| config.lock().ok())
        .map(|config| config.debug_enabled)
        .unwrap_or(false)
}

/// Get current logging configuration
pub fn get_config() -> LoggingConfig {
    LOGGING_CONFIG
        .get()
        .and_then(|config| config.lock().ok())
        .map(|config| config.clone())
        .unwrap_or_default()
}

/// Install a fmt subscriber; a no-op when the host already installed one
fn setup_subscriber(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.include_target)
        .with_thread_ids(config.include_thread_info)
        .with_thread_names(config.include_thread_info);

    let installed = if config.include_timestamps {
        builder.try_init().is_ok()
    } else {
        builder.without_time().try_init().is_ok()
    };

    if !installed {
        tracing::trace!("Tracing subscriber already installed");
    }
}

/// Debug logging that respects the runtime debug switch
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.debug_enabled);
        assert_eq!(config.level, Level::INFO);
        assert!(config.include_timestamps);
        assert!(!config.include_thread_info);
    }

    #[test]
    fn test_with_debug_sets_level() {
        let config = LoggingConfig::default().with_debug(true);
        assert!(config.debug_enabled);
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.with_debug(false).level, Level::INFO);
    }

    #[test]
    fn test_debug_switch_round_trip() {
        // Global state: toggle and restore within one test.
        set_debug_enabled(true).unwrap();
        assert!(is_debug_enabled());
        assert_eq!(get_config().level, Level::DEBUG);

        set_debug_enabled(false).unwrap();
        assert!(!is_debug_enabled());
    }
}
