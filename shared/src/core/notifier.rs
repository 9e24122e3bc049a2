//! Notification fan-out
//!
//! Composes the HTML notification for a stored message and hands it to a
//! [`Mailer`] once per configured recipient, falling back to the admin
//! address when no recipient accepted it.

use tracing::{debug, warn};

use crate::config::FormSettings;
use crate::core::collaborators::{Mailer, OutgoingMail};
use crate::models::{ContactMessage, SemanticType};
use crate::sanitize::sanitize;
use crate::utils::text::{escape_html, strip_slashes};
use crate::validation::validate;

/// Builds and sends contact notifications
#[derive(Debug, Clone)]
pub struct Notifier {
    site_name: String,
    admin_email: String,
    recipients: Vec<String>,
}

impl Notifier {
    /// Capture the recipients and site identity from the settings.
    ///
    /// Recipients beyond the first five are ignored, as are those that do
    /// not survive email sanitization.
    pub fn new(settings: &FormSettings) -> Self {
        let recipients = settings
            .active_recipients()
            .map(|address| sanitize(address, SemanticType::Email, 0, ""))
            .filter(|address| {
                !address.is_empty() && validate(address, SemanticType::Email, 1, 0, "")
            })
            .collect();

        Self {
            site_name: sanitize(&settings.site_name, SemanticType::Text, 0, ""),
            admin_email: sanitize(&settings.admin_email, SemanticType::Email, 0, ""),
            recipients,
        }
    }

    /// Recipients that will be tried before the admin fallback
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Compose the notification for a sanitized message
    pub fn compose(&self, message: &ContactMessage) -> OutgoingMail {
        let site = escape_html(&self.site_name);
        let email = escape_html(&message.email);
        let body = strip_slashes(&message.message);

        let html_body = format!(
            "<p>You have received a message through the {site} contact form.</p><br>\n\
             <p>Name: {name}</p>\n\
             <p>Email: {email}</p>\n\
             <p>Phone: {phone}</p>\n\
             <p>Subject: {subject}</p>\n\
             <p>Message:</p>\n\
             <p>{body}</p>\n\
             <p>If you would like to respond to their message, reply to: {email}</p>\n",
            site = site,
            name = escape_html(&message.name),
            email = email,
            phone = escape_html(&message.phone),
            subject = escape_html(&message.subject),
            body = escape_html(&body).replace('\n', "<br>\n"),
        );

        OutgoingMail {
            subject: format!("{} - {}", message.subject, self.site_name),
            html_body,
            headers: vec![
                "Content-Type: text/html; charset=UTF-8".to_string(),
                format!("From: {}<{}>", self.site_name, self.admin_email),
            ],
        }
    }

    /// Send the notification to every recipient.
    ///
    /// Returns whether at least one send succeeded. When no recipient
    /// accepted the message, the admin address is tried once and its result
    /// is returned.
    pub fn deliver<M: Mailer>(&self, mailer: &M, message: &ContactMessage) -> bool {
        let mail = self.compose(message);
        let mut sent = 0usize;

        for recipient in &self.recipients {
            match mailer.send(recipient, &mail) {
                Ok(()) => {
                    debug!("Notification sent to {}", recipient);
                    sent += 1;
                }
                Err(e) => warn!("Notification to {} failed: {}", recipient, e),
            }
        }

        if sent > 0 {
            return true;
        }

        if self.admin_email.is_empty() {
            warn!("No recipient accepted the notification and no admin address is set");
            return false;
        }

        match mailer.send(&self.admin_email, &mail) {
            Ok(()) => {
                debug!("Notification sent to admin fallback");
                true
            }
            Err(e) => {
                warn!("Admin fallback notification failed: {}", e);
                false
            }
        }
    }
}
