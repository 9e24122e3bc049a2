//! Address-syntax checker for email and URL values
//!
//! Both normalizers are total: they return the cleaned value, or an empty
//! string when nothing usable remains. A value is considered valid when
//! normalizing it leaves it unchanged.

use url::Url;

/// Schemes accepted by [`normalize_url`]
pub const ALLOWED_SCHEMES: [&str; 13] = [
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "gopher", "nntp", "feed", "telnet",
    "sms", "tel",
];

const EMAIL_LOCAL_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~.-";
const URL_SPECIALS: &str = "-~+_.?#=!&;,/:%@$|*'()[]";

/// Normalize an email address.
///
/// The local part keeps only atext characters and dots. The domain must not
/// contain `..`, loses leading and trailing dots, and every label is reduced
/// to letters, digits and inner hyphens. At least two labels must survive.
pub fn normalize_email(value: &str) -> String {
    if value.chars().count() < 6 {
        return String::new();
    }

    // The '@' must not be the first character.
    let at = match value.char_indices().skip(1).find(|(_, c)| *c == '@') {
        Some((index, _)) => index,
        None => return String::new(),
    };
    let (local, domain) = (&value[..at], &value[at + 1..]);

    let local: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || EMAIL_LOCAL_SPECIALS.contains(*c))
        .collect();
    if local.is_empty() || domain.contains("..") {
        return String::new();
    }

    let domain = domain.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0' || c == '.');
    if domain.is_empty() {
        return String::new();
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return String::new();
    }

    let labels: Vec<String> = labels
        .into_iter()
        .map(|label| {
            label
                .trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0' || c == '-')
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
        })
        .filter(|label| !label.is_empty())
        .collect();
    if labels.len() < 2 {
        return String::new();
    }

    let normalized = format!("{}@{}", local, labels.join("."));
    if normalized.len() < 6 {
        return String::new();
    }
    normalized
}

/// Normalize a URL for storage.
///
/// Spaces are percent-encoded, characters outside the URL-safe set are
/// dropped and `http://` is assumed when no scheme is present. Absolute
/// URLs must parse and use an allowed scheme. The cleaned text is returned,
/// not the parser's re-serialization.
pub fn normalize_url(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let cleaned: String = trimmed
        .replace(' ', "%20")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || URL_SPECIALS.contains(*c))
        .collect();
    if cleaned.is_empty() {
        return String::new();
    }

    if is_relative(&cleaned) {
        return cleaned;
    }

    let candidate = if cleaned.contains(':') {
        cleaned
    } else {
        format!("http://{}", cleaned)
    };

    match Url::parse(&candidate) {
        Ok(parsed) if ALLOWED_SCHEMES.contains(&parsed.scheme()) => candidate,
        _ => String::new(),
    }
}

fn is_relative(value: &str) -> bool {
    value.starts_with('/') || value.starts_with('#') || value.starts_with('?')
}
