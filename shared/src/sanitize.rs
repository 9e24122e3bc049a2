//! Sanitization for FormGuard
//!
//! Values that already validate are returned unchanged. Anything else is
//! rewritten with the repair strategy from the pattern registry, and if the
//! rewrite still does not validate the type's safe default is substituted.
//! The result is always defined; empty input stays empty.
//!
//! Types without a safe default (character classes, numbers, email, URL,
//! international phone, time and text) return their repaired value as-is.
//! For the filtering types that means an input with no conforming
//! characters sanitizes to an empty string, which never validates.

use crate::core::{Clock, SystemClock};
use crate::models::{DateLayout, IpFamily, PhoneLayout, SemanticType, TimeLayout};
use crate::patterns::{registry, Repair, SafeDefault, PASSWORD_SYMBOLS};
use crate::utils::address::{normalize_email, normalize_url};
use crate::utils::digit_utils::{clip, digits_only, phone_groups};
use crate::utils::password::PasswordGenerator;
use crate::utils::text::{strip_all_tags, truncate_chars};
use crate::validation::validate;

/// What happened to a sanitized value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOutcome {
    pub value: String,
    /// The returned value differs from the input
    pub changed: bool,
    /// Set when the repair failed and the safe default was substituted
    pub fallback: Option<SafeDefault>,
}

/// Sanitizer with an injectable clock for the date fallback
#[derive(Debug, Clone, Default)]
pub struct Sanitizer<C: Clock = SystemClock> {
    clock: C,
}

impl Sanitizer<SystemClock> {
    /// Create a sanitizer reading the system clock
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> Sanitizer<C> {
    /// Create a sanitizer reading the given clock
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Sanitize a value; see [`sanitize`]
    pub fn sanitize(&self, value: &str, semantic_type: SemanticType, trim: usize, info: &str) -> String {
        self.sanitize_with_report(value, semantic_type, trim, info).value
    }

    /// Sanitize a value and report whether a fallback was used
    pub fn sanitize_with_report(
        &self,
        value: &str,
        semantic_type: SemanticType,
        trim: usize,
        info: &str,
    ) -> SanitizeOutcome {
        if value.is_empty() {
            return SanitizeOutcome {
                value: String::new(),
                changed: false,
                fallback: None,
            };
        }

        let entry = registry().entry(semantic_type);
        let mut fallback = None;

        let mut result = if validate(value, semantic_type, 0, 0, info) {
            value.to_string()
        } else {
            let repaired = self.repair(entry.repair, value, info);
            if entry.safe_default == SafeDefault::None
                || validate(&repaired, semantic_type, 0, 0, info)
            {
                repaired
            } else {
                crate::log_debug!(
                    "Repair for {} did not validate, using safe default {:?}",
                    semantic_type, entry.safe_default
                );
                fallback = Some(entry.safe_default);
                self.safe_default(entry.safe_default, info).unwrap_or(repaired)
            }
        };

        if trim > 0 && value.chars().count() > trim {
            result = truncate_chars(&result, trim);
        }

        SanitizeOutcome {
            changed: result != value,
            value: result,
            fallback,
        }
    }

    fn repair(&self, repair: Repair, value: &str, info: &str) -> String {
        match repair {
            Repair::KeepClass(class) => class.filter(value),
            Repair::Number { signed, decimal } => repair_number(value, signed, decimal),
            Repair::Email => normalize_email(value),
            Repair::Url => normalize_url(value),
            Repair::Phone => {
                let digits = digits_only(value);
                let (area, exchange, line) = phone_groups(&digits);
                PhoneLayout::from_info(info).assemble(area, exchange, line)
            }
            Repair::Money => repair_money(value),
            Repair::Currency => format!("${}", repair_money(value)),
            Repair::Date => repair_date(value, DateLayout::from_info(info)),
            Repair::Time => repair_time(value, TimeLayout::from_info(info)),
            Repair::Password(_) => value
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(*c))
                .collect(),
            Repair::Replace => value.to_string(),
            Repair::StripMarkup { collapse_breaks } => strip_all_tags(value, collapse_breaks),
        }
    }

    fn safe_default(&self, default: SafeDefault, info: &str) -> Option<String> {
        let value = match default {
            SafeDefault::None => return None,
            SafeDefault::Literal(literal) => literal.to_string(),
            SafeDefault::PhonePlaceholder => PhoneLayout::from_info(info).placeholder(),
            SafeDefault::CurrentDate => self
                .clock
                .now()
                .format(DateLayout::from_info(info).strftime())
                .to_string(),
            SafeDefault::GeneratedPassword(strength) => PasswordGenerator::generate_valid(strength),
            SafeDefault::ZeroAddress => IpFamily::from_info(info).zero_address().to_string(),
        };
        Some(value)
    }
}

/// Sanitize a value for a semantic type using the system clock.
///
/// `trim` of zero disables truncation; otherwise the result is cut to
/// `trim` characters when the input was longer than that.
pub fn sanitize(value: &str, semantic_type: SemanticType, trim: usize, info: &str) -> String {
    Sanitizer::new().sanitize(value, semantic_type, trim, info)
}

/// Sign, integer digits, and for decimals the first point plus the digits
/// that follow it. Further points are dropped.
fn repair_number(value: &str, signed: bool, decimal: bool) -> String {
    let kept: Vec<char> = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let negative = signed && kept.first() == Some(&'-');

    let mut integer = String::new();
    let mut fraction = String::new();
    let mut seen_point = false;
    for c in kept {
        match c {
            '0'..='9' if seen_point => fraction.push(c),
            '0'..='9' => integer.push(c),
            '.' if decimal => seen_point = true,
            _ => {}
        }
    }

    if integer.is_empty() && fraction.is_empty() {
        return String::new();
    }

    let mut repaired = String::with_capacity(integer.len() + fraction.len() + 2);
    if negative {
        repaired.push('-');
    }
    repaired.push_str(&integer);
    if !fraction.is_empty() {
        repaired.push('.');
        repaired.push_str(&fraction);
    }
    repaired
}

/// Reformat to `<integer>.<two digits>`
fn repair_money(value: &str) -> String {
    let kept: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let (integer, fraction) = match kept.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (kept.as_str(), ""),
    };

    let integer = integer.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };

    let mut cents: String = fraction.chars().filter(|c| c.is_ascii_digit()).take(2).collect();
    while cents.len() < 2 {
        cents.push('0');
    }

    format!("{}.{}", integer, cents)
}

/// Re-slice 8 or 14 digits into the layout's fields
fn repair_date(value: &str, layout: DateLayout) -> String {
    let digits = digits_only(value);
    if digits.len() != 8 && digits.len() != 14 {
        return digits;
    }

    match layout {
        DateLayout::SqlDateTime => {
            let (hour, minute, second) = if digits.len() == 14 {
                (clip(&digits, 8, 10), clip(&digits, 10, 12), clip(&digits, 12, 14))
            } else {
                ("00", "00", "00")
            };
            format!(
                "{}-{}-{} {}:{}:{}",
                clip(&digits, 0, 4),
                clip(&digits, 4, 6),
                clip(&digits, 6, 8),
                hour,
                minute,
                second
            )
        }
        DateLayout::SqlDate => format!(
            "{}-{}-{}",
            clip(&digits, 0, 4),
            clip(&digits, 4, 6),
            clip(&digits, 6, 8)
        ),
        _ => {
            let separator = layout.separator();
            format!(
                "{}{sep}{}{sep}{}",
                clip(&digits, 0, 2),
                clip(&digits, 2, 4),
                clip(&digits, 4, 8),
                sep = separator
            )
        }
    }
}

/// Rebuild a clock time field by field.
///
/// A colon at index 1 of the input selects a one-digit hour (1-9, default
/// 1); otherwise the hour is two digits (1-12, default 12). Minutes and
/// seconds must be two digits up to 59 or become `00`. A missing or
/// unreadable meridiem becomes `AM`.
fn repair_time(value: &str, layout: TimeLayout) -> String {
    let clean: String = value
        .to_ascii_uppercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, 'A' | 'P' | 'M'))
        .collect();

    let one_digit_hour = value.find(':') == Some(1);
    let (width, hours, default_hour) = if one_digit_hour {
        (1, 1..=9, "1")
    } else {
        (2, 1..=12, "12")
    };

    let hour_text = clip(&clean, 0, width);
    let hour = match hour_text.parse::<u32>() {
        Ok(h) if hours.contains(&h) => hour_text.to_string(),
        _ => default_hour.to_string(),
    };
    let hour = if layout.pads_hour() {
        format!("{:0>2}", hour)
    } else {
        hour
    };

    let mut position = width;
    let minute = sixty_field(clip(&clean, position, position + 2));
    position += 2;

    let mut time = format!("{}:{}", hour, minute);

    if layout.has_seconds() {
        let second = sixty_field(clip(&clean, position, position + 2));
        position += 2;
        time.push(':');
        time.push_str(&second);
    }

    if layout.has_meridiem() {
        let meridiem = match clip(&clean, position, position + 2) {
            "PM" => "PM",
            _ => "AM",
        };
        time.push(' ');
        time.push_str(meridiem);
    }

    time
}

fn sixty_field(text: &str) -> String {
    match text.parse::<u32>() {
        Ok(n) if text.len() == 2 && n <= 59 => text.to_string(),
        _ => "00".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FixedClock;

    fn pinned() -> Sanitizer<FixedClock> {
        // 2021-03-14 15:09:26 UTC
        Sanitizer::with_clock(FixedClock::at_timestamp(1_615_734_566))
    }

    #[test]
    fn test_valid_values_pass_through() {
        assert_eq!(sanitize("Ada Lovelace", SemanticType::LettersWithSpace, 0, ""), "Ada Lovelace");
        assert_eq!(sanitize("1234", SemanticType::Money, 0, ""), "1234");
        assert_eq!(sanitize("(555) 123-4567", SemanticType::Phone, 0, "0"), "(555) 123-4567");
    }

    #[test]
    fn test_empty_stays_empty() {
        for ty in SemanticType::ALL {
            assert_eq!(sanitize("", ty, 5, ""), "");
        }
    }

    #[test]
    fn test_character_classes() {
        assert_eq!(sanitize("Jo3hn Sm!ith", SemanticType::LettersWithSpace, 0, ""), "John Smith");
        assert_eq!(sanitize("ab c-1", SemanticType::AlphanumericNoSpace, 0, ""), "abc1");
        assert_eq!(sanitize("!!!", SemanticType::Letters, 0, ""), "");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(sanitize("4,200 units", SemanticType::Integer, 0, ""), "4200");
        assert_eq!(sanitize("-12a", SemanticType::SignedInteger, 0, ""), "-12");
        assert_eq!(sanitize("+12", SemanticType::SignedInteger, 0, ""), "12");
        assert_eq!(sanitize("3.1.4", SemanticType::Decimal, 0, ""), "3.14");
        assert_eq!(sanitize("12.", SemanticType::Decimal, 0, ""), "12");
        assert_eq!(sanitize("- 0.5", SemanticType::SignedDecimal, 0, ""), "-0.5");
    }

    #[test]
    fn test_money() {
        assert_eq!(sanitize("12.345", SemanticType::Money, 0, ""), "12.34");
        assert_eq!(sanitize("7", SemanticType::Money, 0, ""), "7.00");
        assert_eq!(sanitize("$1,000.5", SemanticType::Money, 0, ""), "1000.50");
        assert_eq!(sanitize("00.1.9", SemanticType::Money, 0, ""), "0.19");
        assert_eq!(sanitize("free", SemanticType::Money, 0, ""), "0.00");
    }

    #[test]
    fn test_currency() {
        assert_eq!(sanitize("$12.34", SemanticType::Currency, 0, ""), "$12.34");
        assert_eq!(sanitize("1234", SemanticType::Currency, 0, ""), "$1234.00");
        assert_eq!(sanitize("12.345", SemanticType::Currency, 0, ""), "$12.34");
    }

    #[test]
    fn test_phone() {
        assert_eq!(sanitize("555 123 4567 ext 9", SemanticType::Phone, 0, "0"), "555-123-4567");
        assert_eq!(sanitize("5551234567", SemanticType::Phone, 0, "4"), "5551234567");
        assert_eq!(sanitize("555-1234", SemanticType::Phone, 0, "1"), "000.000.0000");
        assert_eq!(sanitize("call me", SemanticType::Phone, 0, ""), "(000) 000-0000");
    }

    #[test]
    fn test_phone_fallback_is_reported() {
        let outcome = Sanitizer::new().sanitize_with_report("12", SemanticType::Phone, 0, "2");
        assert_eq!(outcome.value, "000 000 0000");
        assert!(outcome.changed);
        assert_eq!(outcome.fallback, Some(SafeDefault::PhonePlaceholder));
    }

    #[test]
    fn test_date_reslicing() {
        let sanitizer = pinned();
        assert_eq!(sanitizer.sanitize("03.14.2021", SemanticType::Date, 0, "0"), "03/14/2021");
        assert_eq!(sanitizer.sanitize("14 03 2021", SemanticType::Date, 0, "3"), "14-03-2021");
        assert_eq!(
            sanitizer.sanitize("20210314 120000", SemanticType::Date, 0, "4"),
            "2021-03-14 12:00:00"
        );
        assert_eq!(
            sanitizer.sanitize("2021/03/14", SemanticType::Date, 0, "4"),
            "2021-03-14 00:00:00"
        );
        assert_eq!(sanitizer.sanitize("2021.03.14", SemanticType::Date, 0, "5"), "2021-03-14");
    }

    #[test]
    fn test_date_falls_back_to_clock() {
        let sanitizer = pinned();
        assert_eq!(sanitizer.sanitize("13/45/2020", SemanticType::Date, 0, "0"), "03/14/2021");
        assert_eq!(sanitizer.sanitize("yesterday", SemanticType::Date, 0, "2"), "14/03/2021");
        assert_eq!(
            sanitizer.sanitize("soon", SemanticType::Date, 0, "4"),
            "2021-03-14 15:09:26"
        );
    }

    #[test]
    fn test_time() {
        assert_eq!(sanitize("9:5", SemanticType::Time, 0, "HH:MM"), "9:00");
        assert_eq!(sanitize("09:30pm", SemanticType::Time, 0, "HH:MM AM"), "09:30pm");
        assert_eq!(sanitize("09:30 p.m.", SemanticType::Time, 0, "HH:MM AM"), "09:30 PM");
        assert_eq!(sanitize("7:45:99", SemanticType::Time, 0, "HH:MM:SS"), "7:45:00");
        assert_eq!(sanitize("25:61", SemanticType::Time, 0, "HH:MM"), "12:00");
        assert_eq!(sanitize("0:15 xx", SemanticType::Time, 0, "HH:MM AM"), "1:15 AM");
        assert_eq!(sanitize("7:05:09", SemanticType::Time, 0, "HH:MM:SS 24"), "07:05:09");
        assert_eq!(sanitize("noon", SemanticType::Time, 0, "HH:MM:SS AM"), "12:00:00 AM");
    }

    #[test]
    fn test_password() {
        assert_eq!(sanitize("Abc<def>12", SemanticType::Password, 0, ""), "Abcdef12");

        let replaced = sanitize("short", SemanticType::Password, 0, "");
        assert_ne!(replaced, "short");
        assert!(validate(&replaced, SemanticType::Password, 1, 0, ""));

        let strong = sanitize("Abcdefg1", SemanticType::StrongPassword, 0, "");
        assert_eq!(strong.len(), 12);
        assert!(validate(&strong, SemanticType::StrongPassword, 1, 0, ""));
    }

    #[test]
    fn test_ip() {
        assert_eq!(sanitize("10.0.0.1", SemanticType::Ip, 0, ""), "10.0.0.1");
        assert_eq!(sanitize("999.1.1.1", SemanticType::Ip, 0, ""), "0.0.0.0");
        assert_eq!(
            sanitize("not an ip", SemanticType::Ip, 0, "ipv6"),
            "0000:0000:0000:0000:0000:0000:0000:0000"
        );
    }

    #[test]
    fn test_text_and_multitext() {
        assert_eq!(
            sanitize("  Hello <b>world</b>\n\n again ", SemanticType::Text, 0, ""),
            "Hello world again"
        );
        assert_eq!(
            sanitize("Line one<br>\nLine <i>two</i>\n", SemanticType::MultiText, 0, ""),
            "Line one\nLine two"
        );
    }

    #[test]
    fn test_addresses() {
        assert_eq!(sanitize(" ada@example.com", SemanticType::Email, 0, ""), "ada@example.com");
        assert_eq!(sanitize("example.com", SemanticType::Url, 0, ""), "http://example.com");
    }

    #[test]
    fn test_trim_applies_only_to_long_input() {
        assert_eq!(sanitize("Hello there", SemanticType::Text, 5, ""), "Hello");
        assert_eq!(sanitize("Hi", SemanticType::Text, 5, ""), "Hi");
        // The input length decides, not the repaired length.
        assert_eq!(sanitize("<b>abc</b>", SemanticType::Text, 5, ""), "abc");
    }

    #[test]
    fn test_phone_round_trip_through_display() {
        let stored = sanitize("5551234567", SemanticType::Phone, 0, "4");
        assert_eq!(
            crate::display::display_phone(&stored, PhoneLayout::Parenthesized),
            "(555) 123-4567"
        );
    }
}
