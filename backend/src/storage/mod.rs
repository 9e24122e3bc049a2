//! Storage module for the FormGuard backend
//!
//! Messages are appended to a JSON lines file, one record per line. Records
//! are never rewritten; spam-flagged messages are kept alongside clean ones
//! with `is_spam` set so an operator can review them.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{BackendError, BackendResult, StorageError};
use formguard_shared::core::{StoreError, StoreResult};
use formguard_shared::{ContactMessage, MessageStore};

/// One line of the message store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredMessage {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    #[serde(flatten)]
    pub message: ContactMessage,
    pub is_spam: bool,
}

impl StoredMessage {
    /// Wrap a message with a fresh id and the current time
    pub fn new(message: ContactMessage, is_spam: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            message,
            is_spam,
        }
    }
}

/// Append-only message store backed by a JSON lines file
#[derive(Debug)]
pub struct JsonlMessageStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlMessageStore {
    /// Create a store writing to `path`; the file is created on first save
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record
    pub fn append(&self, record: &StoredMessage) -> BackendResult<()> {
        let line = serde_json::to_string(record).map_err(|e| StorageError::RecordWrite {
            reason: e.to_string(),
        })?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BackendError::Internal {
                message: "message store lock poisoned".to_string(),
            })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory: {:?}", parent))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|_| StorageError::StoreOpen {
                path: self.path.to_string_lossy().to_string(),
            })?;

        writeln!(file, "{}", line).map_err(|e| StorageError::RecordWrite {
            reason: e.to_string(),
        })?;

        debug!("Stored message {} (spam: {})", record.id, record.is_spam);
        Ok(())
    }

    /// Read every record; a missing file is an empty store
    pub fn read_all(&self) -> BackendResult<Vec<StoredMessage>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path).map_err(|_| StorageError::StoreOpen {
            path: self.path.to_string_lossy().to_string(),
        })?;

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| StorageError::InvalidRecord {
                line: index + 1,
                reason: e.to_string(),
            })?;
            records.push(record);
        }

        info!("Read {} stored messages from {:?}", records.len(), self.path);
        Ok(records)
    }
}

impl MessageStore for JsonlMessageStore {
    fn save(&self, message: &ContactMessage, is_spam: bool) -> StoreResult<()> {
        self.append(&StoredMessage::new(message.clone(), is_spam))
            .map_err(|e| match e {
                BackendError::Storage(StorageError::StoreOpen { path }) => {
                    StoreError::Unavailable { message: path }
                }
                BackendError::FileSystem(io) => io.into(),
                other => StoreError::IoError {
                    message: other.to_string(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn message(name: &str) -> ContactMessage {
        ContactMessage {
            name: name.to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            subject: "General Inquiry".to_string(),
            message: "Hello there".to_string(),
        }
    }

    #[test]
    fn test_save_creates_file_and_directories() {
        let dir = tempdir().unwrap();
        let store = JsonlMessageStore::new(dir.path().join("data").join("messages.jsonl"));

        store.save(&message("Ada"), false).unwrap();
        store.save(&message("Bot"), true).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message.name, "Ada");
        assert!(!records[0].is_spam);
        assert!(records[1].is_spam);
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn test_record_layout_is_flat() {
        let dir = tempdir().unwrap();
        let store = JsonlMessageStore::new(dir.path().join("messages.jsonl"));
        store.save(&message("Ada"), false).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(value["name"], "Ada");
        assert_eq!(value["is_spam"], false);
        assert!(value["received_at"].is_string());
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonlMessageStore::new(dir.path().join("absent.jsonl"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_damaged_record_reports_line() {
        let dir = tempdir().unwrap();
        let store = JsonlMessageStore::new(dir.path().join("messages.jsonl"));
        store.save(&message("Ada"), false).unwrap();

        let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
        writeln!(file, "{{not json").unwrap();

        assert_matches!(
            store.read_all(),
            Err(BackendError::Storage(StorageError::InvalidRecord { line: 2, .. }))
        );
    }

    #[test]
    fn test_unwritable_location_is_unavailable() {
        let dir = tempdir().unwrap();
        // A directory where the file should be
        let store = JsonlMessageStore::new(dir.path());
        assert_matches!(
            store.save(&message("Ada"), false),
            Err(StoreError::Unavailable { .. })
        );
    }
}
