//! Contact Flow Integration Test
//!
//! Drives the two-phase workflow end to end through the public API with a
//! custom store, a keyword file on disk and a pinned clock, round-tripping
//! the ticket through JSON the way a host would through hidden form fields.

use std::io::Write;
use std::sync::Mutex;

use formguard_shared::core::{StoreError, StoreResult};
use formguard_shared::{
    keyword_source, ContactMessage, ContactWorkflow, FixedClock, FormSettings, FormState,
    MessageStore, RecordingMailer, ResolutionStatus, SpamSignal, SubmissionFields,
    SubmissionTicket,
};
use tempfile::NamedTempFile;

const ISSUED: i64 = 1_700_000_000;

/// Store that keeps records as JSON lines in memory
#[derive(Debug, Default)]
struct JsonLineStore {
    lines: Mutex<Vec<String>>,
}

impl JsonLineStore {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl MessageStore for JsonLineStore {
    fn save(&self, message: &ContactMessage, is_spam: bool) -> StoreResult<()> {
        let record = serde_json::json!({ "message": message, "is_spam": is_spam });
        let line = serde_json::to_string(&record)?;
        self.lines
            .lock()
            .map_err(|_| StoreError::Unavailable {
                message: "poisoned".to_string(),
            })?
            .push(line);
        Ok(())
    }
}

fn keyword_file(words: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# test keywords").unwrap();
    for word in words {
        writeln!(file, "{}", word).unwrap();
    }
    file
}

fn settings(keywords: &NamedTempFile) -> FormSettings {
    FormSettings {
        site_name: "Example Site".to_string(),
        admin_email: "admin@example.com".to_string(),
        recipients: vec!["sales@example.com".to_string(), "support@example.com".to_string()],
        keyword_file: Some(keywords.path().to_path_buf()),
        ..FormSettings::default()
    }
}

fn submission(message: &str) -> SubmissionFields {
    SubmissionFields::new("Grace Hopper", "grace@example.com", "Technical Issue", message)
        .with_phone("(555) 010-2030")
}

#[test]
fn test_clean_submission_is_stored_and_mailed() {
    let keywords = keyword_file(&["viagra", "cheap"]);
    let settings = settings(&keywords);
    let source = keyword_source(settings.keyword_file.as_deref());
    let workflow = ContactWorkflow::new(
        settings,
        JsonLineStore::default(),
        RecordingMailer::new(),
        source,
    )
    .with_clock(FixedClock::at_timestamp(ISSUED));

    let state = workflow.submit(&submission("The printer is jammed\nagain."));
    let resolution = state.resolution().expect("resolved");
    assert_eq!(resolution.status, ResolutionStatus::Delivered);

    let lines = workflow.store().lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(r#""is_spam":false"#));

    let sent = workflow.mailer().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1.subject, "Technical Issue - Example Site");
    assert!(sent[0].1.html_body.contains("<p>Phone: (555) 010-2030</p>"));
}

#[test]
fn test_flagged_submission_round_trips_ticket() {
    let keywords = keyword_file(&["viagra", "cheap"]);
    let settings = settings(&keywords);
    let source = keyword_source(settings.keyword_file.as_deref());
    let clock = FixedClock::at_timestamp(ISSUED);
    let workflow = ContactWorkflow::new(
        settings,
        JsonLineStore::default(),
        RecordingMailer::new(),
        source,
    )
    .with_clock(clock.clone());

    let state = workflow.submit(&submission("buy cheap viagra now"));
    let ticket = state.ticket().expect("ticket issued").clone();
    assert!(workflow.store().lines().is_empty());

    let hidden_fields = serde_json::to_string(&ticket).unwrap();
    let returned: SubmissionTicket = serde_json::from_str(&hidden_fields).unwrap();
    assert_eq!(returned, ticket);

    clock.advance(12);
    let resolution = workflow.confirm(&returned).resolution().cloned().unwrap();
    assert_eq!(resolution.status, ResolutionStatus::Delivered);
    assert!(!resolution.is_spam);
    assert_eq!(workflow.mailer().sent().len(), 2);
    assert!(workflow.store().lines()[0].contains(r#""is_spam":false"#));
}

#[test]
fn test_confirmation_timing_matrix() {
    let keywords = keyword_file(&["viagra", "cheap"]);

    let cases = [
        (1, ResolutionStatus::StoredOnly, vec![SpamSignal::BotSpeed]),
        (5, ResolutionStatus::Delivered, vec![]),
        (4000, ResolutionStatus::TimedOut, vec![]),
    ];

    for (delay, expected, signals) in cases {
        let clock = FixedClock::at_timestamp(ISSUED);
        let settings = settings(&keywords);
        let source = keyword_source(settings.keyword_file.as_deref());
        let workflow = ContactWorkflow::new(
            settings,
            JsonLineStore::default(),
            RecordingMailer::new(),
            source,
        )
        .with_clock(clock.clone());

        let ticket = match workflow.submit(&submission("buy cheap viagra now")) {
            FormState::NeedsConfirmation(ticket) => ticket,
            other => panic!("expected a ticket, got {:?}", other),
        };

        clock.advance(delay);
        let resolution = workflow.confirm(&ticket).resolution().cloned().unwrap();
        assert_eq!(resolution.status, expected, "confirmed after {}s", delay);
        assert_eq!(resolution.spam_signals, signals, "confirmed after {}s", delay);
    }
}

#[test]
fn test_missing_keyword_file_skips_confirmation() {
    let keywords = keyword_file(&["viagra"]);
    let mut settings = settings(&keywords);
    settings.keyword_file = Some(keywords.path().with_extension("missing"));
    let source = keyword_source(settings.keyword_file.as_deref());

    let workflow = ContactWorkflow::new(
        settings,
        JsonLineStore::default(),
        RecordingMailer::new(),
        source,
    );

    let state = workflow.submit(&submission("viagra"));
    assert_eq!(
        state.resolution().map(|r| r.status),
        Some(ResolutionStatus::Delivered)
    );
}
