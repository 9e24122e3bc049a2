//! Data models for FormGuard
//!
//! This module contains the value types that flow through the validator,
//! the sanitizer and the contact workflow.

pub mod layout;
pub mod semantic_type;
pub mod submission;

pub use layout::{DateLayout, IpFamily, PhoneLayout, TimeLayout};
pub use semantic_type::SemanticType;
pub use submission::{ContactMessage, FieldError, SubmissionFields};
