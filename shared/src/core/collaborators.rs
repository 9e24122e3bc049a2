//! Storage and mail collaborator interfaces for FormGuard
//!
//! This module provides the traits the contact workflow delegates to, plus
//! in-memory implementations used by tests and by callers that only need to
//! inspect what would have been stored or sent.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::core::errors::{MailError, MailResult, StoreError, StoreResult};
use crate::models::ContactMessage;

/// Trait for persisting contact messages
///
/// Implementations create one record per call; the workflow never updates
/// or deletes what it saved.
pub trait MessageStore: Send + Sync {
    /// Store a sanitized message
    ///
    /// # Arguments
    /// * `message` - Sanitized field values
    /// * `is_spam` - Whether screening flagged the message
    ///
    /// # Returns
    /// * `Ok(())` - If the record was written
    /// * `Err(StoreError)` - If the record could not be written
    fn save(&self, message: &ContactMessage, is_spam: bool) -> StoreResult<()>;
}

/// Trait for delivering notification mail
pub trait Mailer: Send + Sync {
    /// Send one message to one recipient
    ///
    /// # Arguments
    /// * `to` - Recipient address, already validated as an email
    /// * `mail` - Subject, HTML body and headers
    ///
    /// # Returns
    /// * `Ok(())` - If the message was handed off
    /// * `Err(MailError)` - If delivery failed for this recipient
    fn send(&self, to: &str, mail: &OutgoingMail) -> MailResult<()>;
}

/// A composed notification, independent of its recipient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub html_body: String,
    pub headers: Vec<String>,
}

impl OutgoingMail {
    /// The `From:` header value, if one was set
    pub fn from_header(&self) -> Option<&str> {
        self.headers
            .iter()
            .find_map(|header| header.strip_prefix("From: "))
    }
}

/// In-memory message store
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    records: Mutex<Vec<(ContactMessage, bool)>>,
    /// Whether saves should fail
    pub should_fail: bool,
}

impl MemoryMessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects every save
    pub fn with_failure() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }

    /// Snapshot of everything saved so far
    pub fn records(&self) -> Vec<(ContactMessage, bool)> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MessageStore for MemoryMessageStore {
    fn save(&self, message: &ContactMessage, is_spam: bool) -> StoreResult<()> {
        if self.should_fail {
            return Err(StoreError::Unavailable {
                message: "memory store configured to fail".to_string(),
            });
        }

        let mut records = self.records.lock().map_err(|_| StoreError::Unavailable {
            message: "memory store lock poisoned".to_string(),
        })?;
        records.push((message.clone(), is_spam));
        Ok(())
    }
}

/// Mailer that records every send instead of delivering it
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, OutgoingMail)>>,
    /// Whether every send should fail
    pub should_fail: bool,
    /// Recipients that are refused even when `should_fail` is off
    pub refused: Vec<String>,
}

impl RecordingMailer {
    /// Create a mailer that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mailer that refuses every recipient
    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Create a mailer that refuses only the given recipients
    pub fn failing_for<I, S>(recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            refused: recipients.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Recipient and mail for every accepted send, in order
    pub fn sent(&self) -> Vec<(String, OutgoingMail)> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Recipients of every accepted send, in order
    pub fn recipients(&self) -> Vec<String> {
        self.sent().into_iter().map(|(to, _)| to).collect()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, to: &str, mail: &OutgoingMail) -> MailResult<()> {
        if self.should_fail || self.refused.iter().any(|refused| refused == to) {
            return Err(MailError::Rejected {
                recipient: to.to_string(),
            });
        }

        let mut sent = self.sent.lock().map_err(|_| MailError::TransportFailed {
            message: "recording mailer lock poisoned".to_string(),
        })?;
        sent.push((to.to_string(), mail.clone()));
        Ok(())
    }
}
