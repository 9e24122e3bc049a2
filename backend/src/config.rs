//! Configuration management for the FormGuard command line
//!
//! Settings are read from a YAML file. Every section has defaults, so a file
//! only needs the keys it changes.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{BackendResult, ConfigError};
use formguard_shared::FormSettings;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Contact form behaviour
    pub form: FormSettings,

    /// Message store settings
    pub storage: StorageConfig,

    /// Outgoing mail settings
    pub mail: MailConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Message store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON lines file receiving one record per stored message
    pub messages_file: PathBuf,
}

/// Outgoing mail configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MailConfig {
    /// Directory where notification mail is spooled for a delivery agent
    pub outbox_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Whether to include timestamps in log lines
    pub timestamps: bool,
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("formguard"))
        .unwrap_or_else(|| PathBuf::from("/var/lib/formguard"))
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            messages_file: data_dir().join("messages.jsonl"),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            outbox_dir: data_dir().join("outbox"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timestamps: true,
        }
    }
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|mut path| {
                path.push("formguard");
                path.push("formguard.yml");
                path
            })
            .unwrap_or_else(|| PathBuf::from("/etc/formguard/formguard.yml"))
    }

    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> BackendResult<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from: {:?}", path);

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = serde_yaml::from_str(&content).map_err(ConfigError::from)?;

        info!("Configuration loaded successfully from: {:?}", path);
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> BackendResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        // Recipient addresses are personal data; owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        info!("Configuration saved to: {:?}", path);
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> BackendResult<()> {
        self.form.validate().map_err(|e| ConfigError::Invalid {
            field: "form".to_string(),
            reason: e.to_string(),
        })?;

        if self.storage.messages_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "storage.messages_file".to_string(),
            }
            .into());
        }

        if self.mail.outbox_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "mail.outbox_dir".to_string(),
            }
            .into());
        }

        if self.form.recipients.is_empty() && self.form.admin_email.is_empty() {
            warn!("No recipients or admin_email configured; notifications cannot be sent");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Invalid {
                field: "logging.level".to_string(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        debug!("Configuration validation passed");
        Ok(())
    }

    /// The configured log level, or `None` if unrecognised
    pub fn log_level(&self) -> Option<tracing::Level> {
        self.logging.level.parse().ok()
    }
}
