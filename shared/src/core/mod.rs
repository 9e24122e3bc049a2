//! Core collaborators for FormGuard
//!
//! This module contains the seams the contact workflow is built on:
//! - Message storage and mail delivery traits, with in-memory implementations
//! - Notification composition and recipient fan-out
//! - The clock used for ticket timing and date fallbacks
//! - Error types for the collaborators

pub mod clock;
pub mod collaborators;
pub mod errors;
pub mod notifier;

// Re-export commonly used items
pub use clock::{Clock, FixedClock, SystemClock};
pub use collaborators::{Mailer, MemoryMessageStore, MessageStore, OutgoingMail, RecordingMailer};
pub use errors::{MailError, MailResult, StoreError, StoreResult};
pub use notifier::Notifier;
