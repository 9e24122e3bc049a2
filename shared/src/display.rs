//! Display formatting for stored values
//!
//! Pure presentation transforms with no validation gate: phone numbers are
//! regrouped into a layout and text is unescaped for editing in a form.

use serde::{Deserialize, Serialize};

use crate::models::PhoneLayout;
use crate::utils::digit_utils::{digits_only, phone_groups};
use crate::utils::text::{decode_entities, replace_line_breaks, strip_slashes};

/// How stored text is prepared for an editable field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Single-line inputs: decode entities, unescape, drop `"` and `<br>`
    #[default]
    SingleLine,
    /// Text areas: unescape, decode entities, `<br>` becomes CRLF
    MultiLine,
    /// Unescape only
    Unescape,
}

impl DisplayMode {
    /// Resolve a numeric mode; anything but 0 and 2 is multi-line
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => DisplayMode::SingleLine,
            2 => DisplayMode::Unescape,
            _ => DisplayMode::MultiLine,
        }
    }
}

/// Regroup the first ten digits of a stored phone number
pub fn display_phone(value: &str, layout: PhoneLayout) -> String {
    if value.is_empty() {
        return String::new();
    }

    let digits = digits_only(value);
    let (area, exchange, line) = phone_groups(&digits);
    layout.assemble(area, exchange, line)
}

/// Prepare stored text for an editable field.
///
/// [`DisplayMode::MultiLine`] can reintroduce bare quotes, so it must only
/// feed text areas, never an HTML attribute.
pub fn display_text(value: &str, mode: DisplayMode) -> String {
    if value.is_empty() {
        return String::new();
    }

    match mode {
        DisplayMode::SingleLine => {
            let decoded = strip_slashes(&decode_entities(value));
            replace_line_breaks(&decoded.replace('"', ""), "")
        }
        DisplayMode::MultiLine => replace_line_breaks(&decode_entities(&strip_slashes(value)), "\r\n"),
        DisplayMode::Unescape => strip_slashes(value),
    }
}
