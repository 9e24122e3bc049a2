//! File-Backed Flow Integration Test
//!
//! Loads a configuration file from disk and runs submissions through the
//! handlers, checking what lands in the message store and the mail outbox.

use std::fs;

use formguard_backend::{read_ticket, write_ticket, ApiHandlers, Config};
use formguard_shared::{FixedClock, FormState, ResolutionStatus, SpamSignal, SubmissionFields};
use tempfile::{tempdir, TempDir};

const ISSUED: i64 = 1_700_000_000;

fn write_config(dir: &TempDir) -> Config {
    let keywords = dir.path().join("keywords.txt");
    fs::write(&keywords, "# spam words\nviagra\ncheap\n\ncasino\n").unwrap();

    let yaml = format!(
        r#"
form:
  site_name: Example Site
  admin_email: admin@example.com
  recipients:
    - sales@example.com
    - support@example.com
  redirect_url: https://example.com/thanks
  keyword_file: {keywords}
storage:
  messages_file: {store}
mail:
  outbox_dir: {outbox}
logging:
  level: debug
"#,
        keywords = keywords.display(),
        store = dir.path().join("data").join("messages.jsonl").display(),
        outbox = dir.path().join("outbox").display(),
    );

    let path = dir.path().join("formguard.yml");
    fs::write(&path, yaml).unwrap();
    Config::load(&path).unwrap()
}

#[test]
fn test_clean_submission_lands_in_store_and_outbox() {
    let dir = tempdir().unwrap();
    let handlers = ApiHandlers::new(write_config(&dir));

    let fields = SubmissionFields::new(
        "Grace Hopper",
        "grace@example.com",
        "Technical Issue",
        "The compiler is fine",
    );
    let state = handlers.submit(&fields);
    let resolution = state.resolution().expect("resolved");
    assert_eq!(resolution.status, ResolutionStatus::Delivered);
    assert_eq!(
        resolution.redirect.as_deref(),
        Some("https://example.com/thanks")
    );

    let stored = handlers.workflow().store().read_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].message.subject, "Technical Issue");
    assert!(!stored[0].is_spam);

    let outbox = handlers.workflow().mailer().pending().unwrap();
    assert_eq!(outbox.len(), 2);
    assert!(outbox
        .iter()
        .all(|mail| mail.mail.subject == "Technical Issue - Example Site"));
}

#[test]
fn test_fast_confirmation_is_stored_as_spam() {
    let dir = tempdir().unwrap();
    let clock = FixedClock::at_timestamp(ISSUED);
    let handlers = ApiHandlers::new(write_config(&dir)).with_clock(clock.clone());

    let fields = SubmissionFields::new(
        "Spam Bot",
        "bot@example.com",
        "Sales Issue",
        "cheap casino bonus",
    );
    let ticket = match handlers.submit(&fields) {
        FormState::NeedsConfirmation(ticket) => ticket,
        other => panic!("expected a ticket, got {:?}", other),
    };
    assert!(handlers.workflow().store().read_all().unwrap().is_empty());

    let ticket_path = dir.path().join("ticket.json");
    write_ticket(&ticket_path, &ticket).unwrap();
    assert_eq!(read_ticket(&ticket_path).unwrap(), ticket);

    clock.advance(1);
    let state = handlers.confirm_from_file(&ticket_path).unwrap();
    let resolution = state.resolution().expect("resolved");
    assert_eq!(resolution.status, ResolutionStatus::StoredOnly);
    assert_eq!(resolution.spam_signals, vec![SpamSignal::BotSpeed]);

    let stored = handlers.workflow().store().read_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_spam);
    assert!(handlers.workflow().mailer().pending().unwrap().is_empty());
}

#[test]
fn test_expired_ticket_stores_nothing() {
    let dir = tempdir().unwrap();
    let clock = FixedClock::at_timestamp(ISSUED);
    let handlers = ApiHandlers::new(write_config(&dir)).with_clock(clock.clone());

    let fields = SubmissionFields::new(
        "Grace Hopper",
        "grace@example.com",
        "General Inquiry",
        "Is the viagra joke in the manual intended?",
    );
    let ticket = handlers.submit(&fields).ticket().cloned().expect("ticket");
    let ticket_path = dir.path().join("ticket.json");
    write_ticket(&ticket_path, &ticket).unwrap();

    clock.advance(7200);
    let state = handlers.confirm_from_file(&ticket_path).unwrap();
    assert_eq!(
        state.resolution().map(|r| r.status),
        Some(ResolutionStatus::TimedOut)
    );
    assert!(handlers.workflow().store().read_all().unwrap().is_empty());
}

#[test]
fn test_field_errors_touch_nothing() {
    let dir = tempdir().unwrap();
    let handlers = ApiHandlers::new(write_config(&dir));

    let fields = SubmissionFields::new("", "not an email", "Sales Issue", "Hello");
    match handlers.submit(&fields) {
        FormState::Fresh { errors } => {
            let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
            assert_eq!(fields, vec!["name", "email"]);
        }
        other => panic!("expected field errors, got {:?}", other),
    }

    assert!(!dir.path().join("data").join("messages.jsonl").exists());
    assert!(handlers.workflow().mailer().pending().unwrap().is_empty());
}
