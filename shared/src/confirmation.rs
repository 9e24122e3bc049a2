//! Two-phase contact submission workflow
//!
//! A submission is checked field by field, sanitized and scored for spam.
//! Clean messages are stored and delivered straight away. Messages with any
//! keyword hit get a [`SubmissionTicket`] instead, which the visitor sends
//! back to confirm they are human. The ticket carries its own issue time in
//! the nonce, so no server-side state is kept between the two passes.
//!
//! On confirmation the ticket must come back inside the window configured in
//! [`ScreeningSettings`](crate::config::ScreeningSettings). Within the window
//! the message is still flagged as spam when it came back too fast, contains
//! a link, or scores above the keyword threshold. Flagged messages are stored
//! but never mailed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::FormSettings;
use crate::core::{Clock, Mailer, MessageStore, Notifier, SystemClock};
use crate::display::{display_text, DisplayMode};
use crate::models::{ContactMessage, FieldError, SemanticType, SubmissionFields};
use crate::sanitize::sanitize;
use crate::spam::{KeywordSource, SpamEvaluator, StaticKeywords};
use crate::utils::password::{PasswordGenerator, PasswordStrength};
use crate::validation::validate;

/// Banner shown above field errors
pub const CORRECTION_BANNER: &str = "Please correct the issues below.";

const MSG_SEND_PROBLEM: &str =
    "We encountered a problem while sending your message. Please try again later.";
const MSG_CONFIRMED: &str = "Your message was sent successfully.";
const MSG_TIMED_OUT: &str =
    "The form timed out and your message could not be sent. Please try again.";
const MSG_STORED_ONLY: &str =
    "We could not send your message but a copy of it has been stored in the system.";
const MSG_TRY_PROBLEM: &str =
    "We encountered a problem while trying to send your message. Please try again later.";

// Length of the generated prefix plus its `-` separator.
const NONCE_PREFIX_CHARS: usize = 9;

/// Confirmation state handed back to the visitor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionTicket {
    /// Sanitized field values from the first pass
    pub fields: ContactMessage,
    /// Epoch seconds when the ticket was issued
    pub issued_at: i64,
    /// `<generated password>-<issued_at>`
    pub nonce: String,
}

impl SubmissionTicket {
    /// Issue a ticket for a message at the given time
    pub fn issue(fields: ContactMessage, issued_at: i64) -> Self {
        let prefix = PasswordGenerator::generate_valid(PasswordStrength::Standard);
        Self {
            fields,
            issued_at,
            nonce: format!("{}-{}", prefix, issued_at),
        }
    }

    /// Issue time recovered from the nonce, or 0 when it is unreadable.
    ///
    /// Only the nonce is trusted for timing; `issued_at` is informational.
    pub fn nonce_timestamp(&self) -> i64 {
        let suffix: String = self.nonce.chars().skip(NONCE_PREFIX_CHARS).collect();
        sanitize(&suffix, SemanticType::Integer, 0, "")
            .parse()
            .unwrap_or(0)
    }
}

/// Final outcome category of a submission
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// Stored and mailed
    Delivered,
    /// Stored but not mailed, either flagged as spam or mail failed
    StoredOnly,
    /// Storage or delivery failed
    Failed,
    /// Confirmation arrived outside the window
    TimedOut,
    /// A required field was empty after sanitization
    MissingFields,
}

/// Why a confirmed message was treated as spam
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpamSignal {
    /// Confirmed faster than a person could have
    BotSpeed,
    /// Message mentions `http` or `www.`
    ContainsLink,
    /// Keyword score above the threshold
    KeywordScore(usize),
}

/// Final outcome of a submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub status: ResolutionStatus,
    pub is_spam: bool,
    pub spam_signals: Vec<SpamSignal>,
    /// Text shown to the visitor
    pub message: String,
    /// Where to send the visitor instead of showing `message`
    pub redirect: Option<String>,
}

impl Resolution {
    fn new(status: ResolutionStatus, message: &str) -> Self {
        Self {
            status,
            is_spam: false,
            spam_signals: Vec::new(),
            message: message.to_string(),
            redirect: None,
        }
    }
}

/// Where a submission stands after a pass through the workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormState {
    /// Form shown again with field errors
    Fresh { errors: Vec<FieldError> },
    /// Visitor must confirm the submission
    NeedsConfirmation(SubmissionTicket),
    /// Nothing left to do
    Resolved(Resolution),
}

impl FormState {
    pub fn ticket(&self) -> Option<&SubmissionTicket> {
        match self {
            FormState::NeedsConfirmation(ticket) => Some(ticket),
            _ => None,
        }
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            FormState::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, FormState::Resolved(_))
    }
}

/// Contact form workflow bound to its collaborators
pub struct ContactWorkflow<S, M, K = StaticKeywords, C = SystemClock>
where
    S: MessageStore,
    M: Mailer,
    K: KeywordSource,
    C: Clock,
{
    settings: FormSettings,
    store: S,
    mailer: M,
    evaluator: SpamEvaluator<K>,
    clock: C,
}

impl<S: MessageStore, M: Mailer, K: KeywordSource> ContactWorkflow<S, M, K, SystemClock> {
    /// Create a workflow reading the system clock
    pub fn new(settings: FormSettings, store: S, mailer: M, keywords: K) -> Self {
        Self {
            settings,
            store,
            mailer,
            evaluator: SpamEvaluator::new(keywords),
            clock: SystemClock,
        }
    }
}

impl<S, M, K, C> ContactWorkflow<S, M, K, C>
where
    S: MessageStore,
    M: Mailer,
    K: KeywordSource,
    C: Clock,
{
    /// Replace the clock
    pub fn with_clock<T: Clock>(self, clock: T) -> ContactWorkflow<S, M, K, T> {
        ContactWorkflow {
            settings: self.settings,
            store: self.store,
            mailer: self.mailer,
            evaluator: self.evaluator,
            clock,
        }
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    /// First pass: check, sanitize and either deliver or ask for confirmation
    pub fn submit(&self, fields: &SubmissionFields) -> FormState {
        let errors = field_errors(fields);
        if !errors.is_empty() {
            info!("Submission returned with {} field error(s)", errors.len());
            return FormState::Fresh { errors };
        }

        let subject = sanitize(&fields.subject, SemanticType::MultiText, 0, "");
        let message = ContactMessage {
            name: sanitize(&fields.name, SemanticType::LettersWithSpace, 0, ""),
            email: sanitize(&fields.email, SemanticType::Email, 0, ""),
            phone: sanitize(&fields.phone, SemanticType::InternationalPhone, 0, ""),
            subject: self.settings.resolve_subject(&subject),
            message: sanitize(&fields.message, SemanticType::MultiText, 0, ""),
        };

        let assessment = self
            .evaluator
            .assess(&display_text(&message.message, DisplayMode::MultiLine));
        if assessment.score > 0 {
            let ticket = SubmissionTicket::issue(message, self.clock.timestamp());
            info!(
                "Submission needs confirmation (keyword score {})",
                assessment.score
            );
            return FormState::NeedsConfirmation(ticket);
        }

        let saved = self.save(&message, false);
        let sent = self.notifier().deliver(&self.mailer, &message);

        let resolution = if saved && sent {
            let mut resolution =
                Resolution::new(ResolutionStatus::Delivered, self.settings.success_text());
            resolution.redirect = self.redirect();
            resolution
        } else {
            Resolution::new(ResolutionStatus::Failed, MSG_SEND_PROBLEM)
        };

        info!("Submission resolved as {:?}", resolution.status);
        FormState::Resolved(resolution)
    }

    /// Second pass: redeem a ticket the visitor sent back
    pub fn confirm(&self, ticket: &SubmissionTicket) -> FormState {
        let ticket_time = ticket.nonce_timestamp();
        let fields = &ticket.fields;

        let message = ContactMessage {
            name: sanitize(&fields.name, SemanticType::LettersWithSpace, 0, ""),
            email: sanitize(&fields.email, SemanticType::Email, 0, ""),
            phone: sanitize(&fields.phone, SemanticType::InternationalPhone, 0, ""),
            subject: sanitize(&fields.subject, SemanticType::Text, 0, ""),
            message: sanitize(&fields.message, SemanticType::MultiText, 0, ""),
        };

        let missing = message.missing_required();
        if !missing.is_empty() {
            info!("Confirmation missing required fields: {}", missing.join(", "));
            return FormState::Resolved(Resolution::new(
                ResolutionStatus::MissingFields,
                MSG_SEND_PROBLEM,
            ));
        }

        let screening = self.settings.screening;
        let elapsed = self.clock.timestamp().saturating_sub(ticket_time);
        if elapsed <= 0 || elapsed > screening.max_confirm_seconds {
            info!("Confirmation outside window ({}s elapsed)", elapsed);
            return FormState::Resolved(Resolution::new(ResolutionStatus::TimedOut, MSG_TIMED_OUT));
        }

        let mut signals = Vec::new();
        if elapsed < screening.min_confirm_seconds {
            signals.push(SpamSignal::BotSpeed);
        }

        let check = display_text(&message.message, DisplayMode::MultiLine).to_lowercase();
        if check.contains("http") || check.contains("www.") {
            signals.push(SpamSignal::ContainsLink);
        }

        let score = self.evaluator.score(&check);
        if score > screening.max_keyword_score {
            signals.push(SpamSignal::KeywordScore(score));
        }

        let is_spam = !signals.is_empty();
        if is_spam {
            debug!("Confirmation flagged: {:?}", signals);
        }

        let sent = !is_spam && self.notifier().deliver(&self.mailer, &message);
        let saved = self.save(&message, is_spam);

        let mut resolution = if saved && sent {
            Resolution::new(ResolutionStatus::Delivered, MSG_CONFIRMED)
        } else if saved {
            Resolution::new(ResolutionStatus::StoredOnly, MSG_STORED_ONLY)
        } else {
            Resolution::new(ResolutionStatus::Failed, MSG_TRY_PROBLEM)
        };
        resolution.is_spam = is_spam;
        resolution.spam_signals = signals;

        info!(
            "Confirmation resolved as {:?} (spam: {})",
            resolution.status, resolution.is_spam
        );
        FormState::Resolved(resolution)
    }

    fn notifier(&self) -> Notifier {
        Notifier::new(&self.settings)
    }

    fn save(&self, message: &ContactMessage, is_spam: bool) -> bool {
        match self.store.save(message, is_spam) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to store contact message: {}", e);
                false
            }
        }
    }

    fn redirect(&self) -> Option<String> {
        self.settings
            .redirect_url
            .as_deref()
            .map(|url| sanitize(url, SemanticType::Url, 0, ""))
            .filter(|url| !url.is_empty())
    }
}

/// First-pass field checks; at most one error per field
pub fn field_errors(fields: &SubmissionFields) -> Vec<FieldError> {
    let checks: [(&str, &str, SemanticType, Option<&str>, &str); 5] = [
        (
            "name",
            fields.name.as_str(),
            SemanticType::LettersWithSpace,
            Some("Please provide your name."),
            "The name you have provided contains invalid characters.",
        ),
        (
            "email",
            fields.email.as_str(),
            SemanticType::Email,
            Some("Please provide your email address."),
            "The email address you have provided is not in a valid format.",
        ),
        (
            "phone",
            fields.phone.as_str(),
            SemanticType::InternationalPhone,
            None,
            "The phone number you provided has invalid characters.",
        ),
        (
            "subject",
            fields.subject.as_str(),
            SemanticType::LettersWithSpace,
            Some("Please select the subject of your message."),
            "Please select a valid subject from the dropdown provided.",
        ),
        (
            "message",
            fields.message.as_str(),
            SemanticType::MultiText,
            Some("Please type in your message below."),
            "The message you have entered below contains invalid characters.",
        ),
    ];

    checks
        .into_iter()
        .filter_map(|(field, value, semantic_type, required, invalid)| {
            if value.is_empty() {
                required.map(|message| FieldError::new(field, message))
            } else if !validate(value, semantic_type, 1, 0, "") {
                Some(FieldError::new(field, invalid))
            } else {
                None
            }
        })
        .collect()
}
