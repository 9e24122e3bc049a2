//! FormGuard Shared Library
//!
//! This crate contains the typed data-handling engine and the contact-form
//! screening workflow used across FormGuard. It provides a consistent
//! interface for validating, repairing and presenting user-submitted values.
//!
//! # Features
//!
//! - **Pattern Registry**: Immutable grammar and repair rules per semantic type
//! - **Validation**: Boolean checks with optional reasoned diagnostics
//! - **Sanitization**: Validate-first repair with type-specific safe defaults
//! - **Display**: Phone regrouping and entity decoding for editable fields
//! - **Utilities**: Password generation, date conversion, markup stripping
//! - **Spam Screening**: Keyword scoring and the two-phase confirmation flow
//!
//! # Usage
//!
//! ```rust
//! use formguard_shared::{sanitize, validate, SemanticType};
//!
//! assert!(!validate("12.345", SemanticType::Money, 1, 0, ""));
//! assert_eq!(sanitize("12.345", SemanticType::Money, 0, ""), "12.34");
//! ```

pub mod config;
pub mod confirmation;
pub mod core;
pub mod display;
pub mod logging;
pub mod models;
pub mod patterns;
pub mod sanitize;
pub mod spam;
pub mod utils;
pub mod validation;

// Re-export commonly used types for convenience
pub use models::{
    ContactMessage, DateLayout, FieldError, IpFamily, PhoneLayout, SemanticType,
    SubmissionFields, TimeLayout,
};

pub use config::{FormSettings, ScreeningSettings};

pub use confirmation::{
    field_errors, ContactWorkflow, FormState, Resolution, ResolutionStatus, SpamSignal,
    SubmissionTicket,
};

pub use core::{
    Clock, FixedClock, MailError, Mailer, MemoryMessageStore, MessageStore, Notifier,
    OutgoingMail, RecordingMailer, StoreError, SystemClock,
};

pub use display::{display_phone, display_text, DisplayMode};
pub use patterns::{registry, PatternRegistry, SafeDefault};
pub use sanitize::{sanitize, SanitizeOutcome, Sanitizer};
pub use spam::{
    keyword_source, KeywordFile, KeywordListError, KeywordSource, SpamAssessment, SpamEvaluator,
    StaticKeywords,
};
pub use utils::dates::{to_epoch, to_sql_date, to_sql_datetime, ConvertError, SourceLayout};
pub use utils::password::{PasswordGenerator, PasswordStrength};
pub use validation::{explain, validate, ValidationRequest, ValidationResult};

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types used throughout the library
pub mod error {
    use thiserror::Error;

    /// Common error type for shared library operations
    #[derive(Error, Debug)]
    pub enum SharedError {
        #[error("Unknown semantic type: {name}")]
        UnknownType { name: String },

        #[error("Date conversion failed: {0}")]
        Conversion(#[from] crate::utils::dates::ConvertError),

        #[error("Keyword list error: {0}")]
        KeywordList(#[from] crate::spam::KeywordListError),

        #[error("Storage error: {0}")]
        Store(#[from] crate::core::StoreError),

        #[error("Mail error: {0}")]
        Mail(#[from] crate::core::MailError),

        #[error("Serialization error: {message}")]
        Serialization { message: String },

        #[error("Configuration error: {message}")]
        Config { message: String },

        #[error("Internal error: {message}")]
        Internal { message: String },
    }

    impl From<anyhow::Error> for SharedError {
        fn from(error: anyhow::Error) -> Self {
            SharedError::Internal {
                message: error.to_string(),
            }
        }
    }

    impl From<serde_json::Error> for SharedError {
        fn from(error: serde_json::Error) -> Self {
            SharedError::Serialization {
                message: error.to_string(),
            }
        }
    }

    /// Result type alias for shared library operations
    pub type SharedResult<T> = Result<T, SharedError>;
}

pub use error::{SharedError, SharedResult};

/// Library configuration and constants
pub mod constants {
    /// Minimum length the validator applies when none is given
    pub const DEFAULT_MIN_LENGTH: usize = 1;

    /// Length of a standard generated password
    pub const STANDARD_PASSWORD_LENGTH: usize = 8;

    /// Length of a strong generated password
    pub const STRONG_PASSWORD_LENGTH: usize = 12;

    /// Maximum number of notification recipients that are tried
    pub const MAX_RECIPIENTS: usize = 5;

    /// Seconds a confirmation ticket stays redeemable
    pub const CONFIRMATION_WINDOW_SECS: i64 = 3600;

    /// Confirmations faster than this are treated as automated
    pub const MIN_HUMAN_SECS: i64 = 2;

    /// Keyword hits above this on the confirmation pass mark a message as spam
    pub const MAX_CONFIRM_KEYWORD_SCORE: usize = 3;
}
