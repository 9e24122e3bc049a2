//! Error types for the FormGuard backend
//!
//! This module defines the error types used by the command line front end and
//! its file-backed collaborators, with user-facing messages that do not leak
//! paths or internal details.

use std::fmt;
use thiserror::Error;

use formguard_shared::SharedError;

/// Main error type for the FormGuard backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Message store and outbox errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// File system operation errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Errors raised by the shared engine
    #[error("{0}")]
    Shared(#[from] SharedError),

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Anyhow errors (for context and chaining)
    #[error("Operation failed: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: String },

    #[error("Invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("Configuration parsing failed: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },
}

/// Message store and outbox errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to open message store: {path}")]
    StoreOpen { path: String },

    #[error("Failed to append message record: {reason}")]
    RecordWrite { reason: String },

    #[error("Message record {line} is invalid: {reason}")]
    InvalidRecord { line: usize, reason: String },

    #[error("Failed to spool mail to outbox: {reason}")]
    OutboxWrite { reason: String },

    #[error("Ticket file not found: {path}")]
    TicketNotFound { path: String },
}

/// Serialization/deserialization errors
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization failed: {reason}")]
    JsonSerialization { reason: String },

    #[error("JSON deserialization failed: {reason}")]
    JsonDeserialization { reason: String },
}

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Trait for converting errors to user-friendly messages
pub trait UserFriendlyError {
    /// Convert the error to a message safe to show to users
    /// (without exposing internal implementation details)
    fn user_message(&self) -> String;

    /// Get the error category for logging
    fn category(&self) -> ErrorCategory;
}

/// Error categories for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Storage,
    Validation,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Storage => write!(f, "storage"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

impl UserFriendlyError for BackendError {
    fn user_message(&self) -> String {
        match self {
            BackendError::Config(_) => {
                "Configuration error. Please check your settings.".to_string()
            }
            BackendError::Storage(StorageError::TicketNotFound { .. }) => {
                "The confirmation ticket could not be found.".to_string()
            }
            BackendError::Storage(StorageError::InvalidRecord { line, .. }) => {
                format!("The message store is damaged at record {}.", line)
            }
            BackendError::Storage(_) => "Storage operation failed. Please try again.".to_string(),
            BackendError::Shared(SharedError::UnknownType { name }) => {
                format!("Unknown semantic type: {}", name)
            }
            BackendError::Shared(SharedError::Conversion(e)) => {
                format!("Date conversion failed: {}", e)
            }
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            BackendError::Config(_) => ErrorCategory::Configuration,
            BackendError::Storage(_) | BackendError::FileSystem(_) => ErrorCategory::Storage,
            BackendError::Shared(SharedError::UnknownType { .. })
            | BackendError::Shared(SharedError::Conversion(_)) => ErrorCategory::Validation,
            BackendError::Shared(SharedError::Config { .. }) => ErrorCategory::Configuration,
            _ => ErrorCategory::Internal,
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Serialization(SerializationError::JsonDeserialization {
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = BackendError::Storage(StorageError::StoreOpen {
            path: "/tmp/messages.jsonl".to_string(),
        });
        assert!(error.to_string().contains("Failed to open message store"));
    }

    #[test]
    fn test_user_friendly_message() {
        let error = BackendError::Storage(StorageError::StoreOpen {
            path: "/secret/path/messages.jsonl".to_string(),
        });
        let message = error.user_message();
        assert!(!message.contains("/secret"));
        assert_eq!(error.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_shared_error_category() {
        let error: BackendError = SharedError::UnknownType {
            name: "zipcode".to_string(),
        }
        .into();
        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.user_message(), "Unknown semantic type: zipcode");
    }

    #[test]
    fn test_error_chaining() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let backend_error = BackendError::FileSystem(io_error);

        assert!(backend_error.to_string().contains("File system error"));
    }
}
