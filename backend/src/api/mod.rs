//! Request handlers for the FormGuard command line
//!
//! This module contains the logic behind each command. It binds the shared
//! engine and contact workflow to the file-backed store, the outbox mailer
//! and the configured keyword list, keeping argument parsing out of the way.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{BackendError, BackendResult, SerializationError, StorageError};
use crate::mail::OutboxMailer;
use crate::storage::JsonlMessageStore;
use formguard_shared::{
    explain, keyword_source, sanitize, to_epoch, to_sql_date, to_sql_datetime, Clock,
    ContactWorkflow, FormState, KeywordSource, SemanticType, SourceLayout, SpamAssessment,
    SpamEvaluator, SubmissionFields, SubmissionTicket, SystemClock, ValidationRequest,
    ValidationResult,
};

/// Contact workflow wired to the file-backed collaborators
pub type FileWorkflow<C = SystemClock> =
    ContactWorkflow<JsonlMessageStore, OutboxMailer, Box<dyn KeywordSource>, C>;

/// Output format of a date conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTarget {
    SqlDateTime,
    SqlDate,
    Epoch,
}

/// Handlers for processing commands
pub struct ApiHandlers<C: Clock = SystemClock> {
    config: Config,
    workflow: FileWorkflow<C>,
}

impl ApiHandlers<SystemClock> {
    /// Create handlers from a loaded configuration
    pub fn new(config: Config) -> Self {
        let keywords = keyword_source(config.form.keyword_file.as_deref());
        let workflow = ContactWorkflow::new(
            config.form.clone(),
            JsonlMessageStore::new(&config.storage.messages_file),
            OutboxMailer::new(&config.mail.outbox_dir),
            keywords,
        );
        Self { config, workflow }
    }
}

impl<C: Clock> ApiHandlers<C> {
    /// Replace the clock used for tickets and the confirmation window
    pub fn with_clock<T: Clock>(self, clock: T) -> ApiHandlers<T> {
        ApiHandlers {
            config: self.config,
            workflow: self.workflow.with_clock(clock),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workflow(&self) -> &FileWorkflow<C> {
        &self.workflow
    }

    /// Score text against the configured keyword list
    pub fn spam_score(&self, text: &str) -> SpamAssessment {
        let keywords = keyword_source(self.config.form.keyword_file.as_deref());
        SpamEvaluator::new(keywords).assess(text)
    }

    /// Run the first pass of the contact form
    pub fn submit(&self, fields: &SubmissionFields) -> FormState {
        info!("Handling contact submission");
        self.workflow.submit(fields)
    }

    /// Run the second pass with a ticket read from disk
    pub fn confirm_from_file<P: AsRef<Path>>(&self, path: P) -> BackendResult<FormState> {
        let ticket = read_ticket(path)?;
        info!("Handling confirmation for ticket issued at {}", ticket.issued_at);
        Ok(self.workflow.confirm(&ticket))
    }
}

/// Validate a value and explain any failure
pub fn check_value(request: &ValidationRequest) -> ValidationResult {
    if request.semantic_type.is_sensitive() {
        debug!("Validating {} value", request.semantic_type);
    } else {
        debug!("Validating {:?} as {}", request.value, request.semantic_type);
    }
    explain(request)
}

/// Sanitize a value against a type given by name.
///
/// Unrecognized type names use the `text` rule.
pub fn sanitize_value(value: &str, type_name: &str, trim: usize, info: &str) -> String {
    let semantic_type = SemanticType::from_name_lenient(type_name);
    if !info.is_empty() && !semantic_type.has_layouts() {
        debug!("Ignoring info {:?} for {}", info, semantic_type);
    }
    sanitize(value, semantic_type, trim, info)
}

/// Convert a loosely formatted date
pub fn convert_date(
    value: &str,
    target: DateTarget,
    layout: SourceLayout,
) -> BackendResult<String> {
    let converted = match target {
        DateTarget::SqlDateTime => to_sql_datetime(value, layout),
        DateTarget::SqlDate => to_sql_date(value, layout),
        DateTarget::Epoch => to_epoch(value, layout).map(|epoch| epoch.to_string()),
    };
    Ok(converted.map_err(formguard_shared::SharedError::from)?)
}

/// Write a ticket as JSON so it can be handed back on confirmation
pub fn write_ticket<P: AsRef<Path>>(path: P, ticket: &SubmissionTicket) -> BackendResult<()> {
    let path = path.as_ref();
    let content =
        serde_json::to_string_pretty(ticket).map_err(|e| SerializationError::JsonSerialization {
            reason: e.to_string(),
        })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    debug!("Ticket written to {:?}", path);
    Ok(())
}

/// Read a ticket written by [`write_ticket`]
pub fn read_ticket<P: AsRef<Path>>(path: P) -> BackendResult<SubmissionTicket> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(StorageError::TicketNotFound {
            path: path.to_string_lossy().to_string(),
        }
        .into());
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(BackendError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use formguard_shared::{FixedClock, ResolutionStatus, SharedError};
    use tempfile::{tempdir, TempDir};

    fn config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.form.admin_email = "admin@example.com".to_string();
        config.form.recipients = vec!["sales@example.com".to_string()];
        config.storage.messages_file = dir.path().join("messages.jsonl");
        config.mail.outbox_dir = dir.path().join("outbox");
        config
    }

    #[test]
    fn test_sanitize_value_by_name() {
        assert_eq!(sanitize_value("12.345", "money", 0, ""), "12.34");
        assert_eq!(sanitize_value("12.345", "Integer", 0, ""), "12345");
    }

    #[test]
    fn test_sanitize_unknown_type_uses_text_rule() {
        for value in ["hello <b>x</b>", "  two\nlines  ", "plain"] {
            assert_eq!(
                sanitize_value(value, "zipcode", 0, ""),
                sanitize_value(value, "text", 0, "")
            );
        }
        assert_eq!(sanitize_value("hello <b>x</b>", "zipcode", 0, ""), "hello x");
    }

    #[test]
    fn test_check_value_explains() {
        let request = ValidationRequest::new("12.345", SemanticType::Money);
        let result = check_value(&request);
        assert!(!result.is_valid);
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn test_convert_date_targets() {
        assert_eq!(
            convert_date("03/14/2021", DateTarget::SqlDate, SourceLayout::MonthDayYear).unwrap(),
            "2021-03-14"
        );
        assert_eq!(
            convert_date("01/01/1970", DateTarget::Epoch, SourceLayout::MonthDayYear).unwrap(),
            "0"
        );
        assert_matches!(
            convert_date("", DateTarget::SqlDateTime, SourceLayout::MonthDayYear),
            Err(BackendError::Shared(SharedError::Conversion(_)))
        );
    }

    #[test]
    fn test_submit_and_confirm_through_files() {
        let dir = tempdir().unwrap();
        let clock = FixedClock::at_timestamp(1_700_000_000);
        let handlers = ApiHandlers::new(config(&dir)).with_clock(clock.clone());

        let fields = SubmissionFields::new(
            "Ada Lovelace",
            "ada@example.com",
            "Sales Issue",
            "Cheap casino tickets",
        );
        let ticket = match handlers.submit(&fields) {
            FormState::NeedsConfirmation(ticket) => ticket,
            other => panic!("expected confirmation, got {:?}", other),
        };

        let ticket_path = dir.path().join("tickets").join("ticket.json");
        write_ticket(&ticket_path, &ticket).unwrap();

        clock.advance(30);
        let state = handlers.confirm_from_file(&ticket_path).unwrap();
        assert_eq!(
            state.resolution().map(|r| r.status),
            Some(ResolutionStatus::Delivered)
        );

        let stored = handlers.workflow().store().read_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(handlers.workflow().mailer().pending().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_ticket() {
        let dir = tempdir().unwrap();
        assert_matches!(
            read_ticket(dir.path().join("absent.json")),
            Err(BackendError::Storage(StorageError::TicketNotFound { .. }))
        );
    }

    #[test]
    fn test_spam_score_uses_built_in_list() {
        let dir = tempdir().unwrap();
        let handlers = ApiHandlers::new(config(&dir));
        let assessment = handlers.spam_score("Click here for cheap SEO services");
        assert!(assessment.list_available);
        assert!(assessment.score >= 3);
    }
}
