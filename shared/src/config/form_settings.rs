//! Contact form settings
//!
//! This module provides the settings the contact workflow reads on every
//! request: who receives notifications, which subjects are offered, what the
//! visitor sees on success and how strict the confirmation screening is.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    CONFIRMATION_WINDOW_SECS, MAX_CONFIRM_KEYWORD_SCORE, MAX_RECIPIENTS, MIN_HUMAN_SECS,
};
use crate::error::{SharedError, SharedResult};
use crate::models::SemanticType;
use crate::validation::validate;

/// Subject used when a submitted subject is not one of the configured ones
pub const FALLBACK_SUBJECT: &str = "General Inquiry";

/// Success text shown when none is configured
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Your message was sent successfully.";

/// Contact form configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormSettings {
    /// Site name used in mail subjects and the `From:` header
    pub site_name: String,

    /// Fallback recipient and `From:` address
    pub admin_email: String,

    /// Notification recipients; only the first five are used
    pub recipients: Vec<String>,

    /// Subjects offered in the dropdown
    pub subjects: Vec<String>,

    /// Text shown after a successful first-pass delivery
    pub success_message: String,

    /// Where to send the visitor after a successful first-pass delivery
    pub redirect_url: Option<String>,

    /// Keyword list file; the built-in list is used when unset
    pub keyword_file: Option<PathBuf>,

    /// Confirmation screening thresholds
    pub screening: ScreeningSettings,
}

/// Thresholds applied when a confirmation comes back
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScreeningSettings {
    /// Confirmations faster than this are treated as bots
    pub min_confirm_seconds: i64,

    /// Confirmations slower than this have timed out
    pub max_confirm_seconds: i64,

    /// Keyword scores above this mark the message as spam
    pub max_keyword_score: usize,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            site_name: "FormGuard".to_string(),
            admin_email: String::new(),
            recipients: Vec::new(),
            subjects: vec![
                "General Inquiry".to_string(),
                "Sales Issue".to_string(),
                "Technical Issue".to_string(),
                "Question or Comment".to_string(),
            ],
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            redirect_url: None,
            keyword_file: None,
            screening: ScreeningSettings::default(),
        }
    }
}

impl Default for ScreeningSettings {
    fn default() -> Self {
        Self {
            min_confirm_seconds: MIN_HUMAN_SECS,
            max_confirm_seconds: CONFIRMATION_WINDOW_SECS,
            max_keyword_score: MAX_CONFIRM_KEYWORD_SCORE,
        }
    }
}

impl FormSettings {
    /// Parse a comma-separated subject list, dropping blanks
    pub fn parse_subjects(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|subject| !subject.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The configured subject equal to `subject`, or [`FALLBACK_SUBJECT`]
    pub fn resolve_subject(&self, subject: &str) -> String {
        self.subjects
            .iter()
            .find(|candidate| candidate.as_str() == subject)
            .cloned()
            .unwrap_or_else(|| FALLBACK_SUBJECT.to_string())
    }

    /// The recipients that will actually be tried, in order
    pub fn active_recipients(&self) -> impl Iterator<Item = &String> {
        self.recipients.iter().take(MAX_RECIPIENTS)
    }

    /// The success text, falling back to the default when blank
    pub fn success_text(&self) -> &str {
        if self.success_message.trim().is_empty() {
            DEFAULT_SUCCESS_MESSAGE
        } else {
            &self.success_message
        }
    }

    /// Check the settings for problems that would break delivery or screening
    pub fn validate(&self) -> SharedResult<()> {
        if self.site_name.trim().is_empty() {
            return Err(SharedError::Config {
                message: "site_name cannot be empty".to_string(),
            });
        }

        if !self.admin_email.is_empty()
            && !validate(&self.admin_email, SemanticType::Email, 1, 0, "")
        {
            return Err(SharedError::Config {
                message: format!("admin_email is not a valid address: {}", self.admin_email),
            });
        }

        if self.recipients.len() > MAX_RECIPIENTS {
            tracing::warn!(
                "Only the first {} of {} recipients will be notified",
                MAX_RECIPIENTS,
                self.recipients.len()
            );
        }

        if self.subjects.is_empty() {
            return Err(SharedError::Config {
                message: "at least one subject is required".to_string(),
            });
        }

        let screening = &self.screening;
        if screening.min_confirm_seconds < 0
            || screening.max_confirm_seconds <= screening.min_confirm_seconds
        {
            return Err(SharedError::Config {
                message: format!(
                    "confirmation window {}..{} seconds is empty",
                    screening.min_confirm_seconds, screening.max_confirm_seconds
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_settings() {
        let settings = FormSettings::default();
        assert_eq!(settings.subjects.len(), 4);
        assert_eq!(settings.screening.max_confirm_seconds, 3600);
        assert_eq!(settings.screening.min_confirm_seconds, 2);
        assert_eq!(settings.screening.max_keyword_score, 3);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_resolve_subject() {
        let settings = FormSettings::default();
        assert_eq!(settings.resolve_subject("Sales Issue"), "Sales Issue");
        assert_eq!(settings.resolve_subject("Free Money"), FALLBACK_SUBJECT);
    }

    #[test]
    fn test_parse_subjects() {
        assert_eq!(
            FormSettings::parse_subjects(" Billing, Support ,,Other"),
            vec!["Billing", "Support", "Other"]
        );
    }

    #[test]
    fn test_active_recipients_capped() {
        let settings = FormSettings {
            recipients: (0..7).map(|i| format!("r{}@example.com", i)).collect(),
            ..FormSettings::default()
        };
        assert_eq!(settings.active_recipients().count(), 5);
    }

    #[test]
    fn test_success_text_fallback() {
        let settings = FormSettings {
            success_message: "  ".to_string(),
            ..FormSettings::default()
        };
        assert_eq!(settings.success_text(), DEFAULT_SUCCESS_MESSAGE);
    }

    #[test]
    fn test_validate_rejects_bad_admin() {
        let settings = FormSettings {
            admin_email: "not-an-address".to_string(),
            ..FormSettings::default()
        };
        assert_matches!(settings.validate(), Err(SharedError::Config { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_window() {
        let mut settings = FormSettings::default();
        settings.screening.max_confirm_seconds = 1;
        assert_matches!(settings.validate(), Err(SharedError::Config { .. }));
    }

    #[test]
    fn test_partial_settings_deserialize() {
        let settings: FormSettings =
            serde_json::from_str(r#"{"site_name":"Example","screening":{"max_keyword_score":5}}"#)
                .unwrap();
        assert_eq!(settings.site_name, "Example");
        assert_eq!(settings.screening.max_keyword_score, 5);
        assert_eq!(settings.screening.max_confirm_seconds, 3600);
        assert_eq!(settings.subjects.len(), 4);
    }

    #[test]
    fn test_settings_from_yaml() {
        let yaml = r#"
site_name: Example
admin_email: admin@example.com
recipients:
  - sales@example.com
subjects: [Billing, Support]
redirect_url: https://example.com/thanks
keyword_file: /etc/formguard/keywords.txt
"#;
        let settings: FormSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.recipients, vec!["sales@example.com".to_string()]);
        assert_eq!(settings.resolve_subject("Support"), "Support");
        assert_eq!(settings.resolve_subject("Sales Issue"), FALLBACK_SUBJECT);
        assert_eq!(
            settings.keyword_file,
            Some(PathBuf::from("/etc/formguard/keywords.txt"))
        );
        assert_eq!(settings.screening, ScreeningSettings::default());
        assert!(settings.validate().is_ok());
    }
}
