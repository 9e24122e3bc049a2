//! Collaborator error types for FormGuard.
//!
//! Storage and mail failures never abort a submission; the workflow turns
//! them into a user-facing resolution. These types carry the detail for logs.

use std::fmt;

/// Message storage errors
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backing store could not be reached or opened
    Unavailable { message: String },

    /// The record could not be encoded
    SerializationError { message: String },

    /// General I/O error
    IoError { message: String },
}

/// Outgoing mail errors
#[derive(Debug, Clone, PartialEq)]
pub enum MailError {
    /// The recipient address was refused
    Rejected { recipient: String },

    /// The transport failed before the message was handed off
    TransportFailed { message: String },

    /// General I/O error
    IoError { message: String },
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for mail operations
pub type MailResult<T> = Result<T, MailError>;

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable { message } => write!(f, "Store unavailable: {message}"),
            StoreError::SerializationError { message } => {
                write!(f, "Serialization error: {message}")
            }
            StoreError::IoError { message } => write!(f, "I/O error: {message}"),
        }
    }
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailError::Rejected { recipient } => write!(f, "Recipient rejected: {recipient}"),
            MailError::TransportFailed { message } => write!(f, "Transport failed: {message}"),
            MailError::IoError { message } => write!(f, "I/O error: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}
impl std::error::Error for MailError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for MailError {
    fn from(err: std::io::Error) -> Self {
        MailError::IoError {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let store_err = StoreError::Unavailable {
            message: "disk full".to_string(),
        };
        assert_eq!(store_err.to_string(), "Store unavailable: disk full");

        let mail_err = MailError::Rejected {
            recipient: "ada@example.com".to_string(),
        };
        assert_eq!(mail_err.to_string(), "Recipient rejected: ada@example.com");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let store_err: StoreError = io_err.into();

        match store_err {
            StoreError::IoError { message } => assert_eq!(message, "denied"),
            _ => panic!("Unexpected error conversion"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let store_err: StoreError = json_err.into();

        match store_err {
            StoreError::SerializationError { .. } => (),
            _ => panic!("Unexpected error conversion"),
        }
    }
}
