//! Contact form submission models

use serde::{Deserialize, Serialize};

/// Raw field values as posted by the contact form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionFields {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl SubmissionFields {
    /// Create a submission without a phone number
    pub fn new<S: Into<String>>(name: S, email: S, subject: S, message: S) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Attach a phone number
    pub fn with_phone<S: Into<String>>(mut self, phone: S) -> Self {
        self.phone = phone.into();
        self
    }
}

/// Sanitized message, ready for storage and mail
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    /// Names of required fields that are empty
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.email.is_empty() {
            missing.push("email");
        }
        if self.subject.is_empty() {
            missing.push("subject");
        }
        if self.message.is_empty() {
            missing.push("message");
        }
        missing
    }
}

impl From<ContactMessage> for SubmissionFields {
    fn from(message: ContactMessage) -> Self {
        Self {
            name: message.name,
            email: message.email,
            phone: message.phone,
            subject: message.subject,
            message: message.message,
        }
    }
}

/// A field that failed first-pass checks, with the text shown to the visitor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
