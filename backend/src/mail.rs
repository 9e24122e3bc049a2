//! Outbox mail spooling
//!
//! The command line front end does not talk SMTP. Each notification is
//! written as a JSON file into an outbox directory, where a delivery agent
//! picks it up.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::{BackendError, BackendResult, StorageError};
use formguard_shared::core::{MailError, MailResult};
use formguard_shared::{Mailer, OutgoingMail};

/// A spooled notification as written to the outbox
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpooledMail {
    pub id: Uuid,
    pub to: String,
    pub queued_at: DateTime<Utc>,
    #[serde(flatten)]
    pub mail: OutgoingMail,
}

/// Mailer that spools messages into a directory
#[derive(Debug, Clone)]
pub struct OutboxMailer {
    dir: PathBuf,
}

impl OutboxMailer {
    /// Create a mailer spooling into `dir`; the directory is created on demand
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The outbox directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one message for one recipient, returning the spool file path
    pub fn spool(&self, to: &str, mail: &OutgoingMail) -> BackendResult<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create outbox directory: {:?}", self.dir))?;

        let spooled = SpooledMail {
            id: Uuid::new_v4(),
            to: to.to_string(),
            queued_at: Utc::now(),
            mail: mail.clone(),
        };

        let file_name = format!(
            "{}-{}.json",
            spooled.queued_at.format("%Y%m%d%H%M%S"),
            spooled.id
        );
        let path = self.dir.join(file_name);

        let content =
            serde_json::to_string_pretty(&spooled).map_err(|e| StorageError::OutboxWrite {
                reason: e.to_string(),
            })?;
        fs::write(&path, content).map_err(|e| StorageError::OutboxWrite {
            reason: e.to_string(),
        })?;

        debug!("Spooled mail for {} to {:?}", to, path);
        Ok(path)
    }

    /// Every spooled message, oldest first
    pub fn pending(&self) -> BackendResult<Vec<SpooledMail>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut spooled: Vec<SpooledMail> = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path)?;
            spooled.push(serde_json::from_str(&content)?);
        }
        Ok(spooled)
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, to: &str, mail: &OutgoingMail) -> MailResult<()> {
        self.spool(to, mail).map(|_| ()).map_err(|e| match e {
            BackendError::FileSystem(io) => io.into(),
            other => MailError::TransportFailed {
                message: other.to_string(),
            },
        })
    }
}
