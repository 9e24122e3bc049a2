//! FormGuard Backend Library
//!
//! This module exposes the command handlers and the file-backed store and
//! mailer as a library so they can be used by tests and other hosts.

pub mod api;
pub mod config;
pub mod error;
pub mod mail;
pub mod storage;

// Re-export commonly used types
pub use api::{
    check_value, convert_date, read_ticket, sanitize_value, write_ticket, ApiHandlers, DateTarget,
    FileWorkflow,
};
pub use config::Config;
pub use error::{BackendError, BackendResult, UserFriendlyError};
pub use mail::{OutboxMailer, SpooledMail};
pub use storage::{JsonlMessageStore, StoredMessage};
