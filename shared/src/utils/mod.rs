//! Utility modules for FormGuard
//!
//! This module provides helpers used throughout the shared library,
//! including markup stripping, address normalization, password generation
//! and date conversion.

pub mod address;
pub mod dates;
pub mod password;
pub mod text;

// Re-export commonly used items for convenience
pub use address::{normalize_email, normalize_url};
pub use dates::{to_epoch, to_sql_date, to_sql_datetime, ConvertError, SourceLayout};
pub use password::{CharacterSets, PasswordGenerator, PasswordStrength};
pub use text::{decode_entities, strip_all_tags, strip_slashes};

/// Utility functions for working with digit runs
pub mod digit_utils {
    /// Keep only ASCII digits
    pub fn digits_only(s: &str) -> String {
        s.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Slice `[start, end)` out of an ASCII string, clipped to its length
    pub fn clip(s: &str, start: usize, end: usize) -> &str {
        let end = end.min(s.len());
        s.get(start..end).unwrap_or("")
    }

    /// Split the first ten digits into the 3/3/4 phone groups
    pub fn phone_groups(digits: &str) -> (&str, &str, &str) {
        (clip(digits, 0, 3), clip(digits, 3, 6), clip(digits, 6, 10))
    }
}

#[cfg(test)]
mod tests {
    use super::digit_utils::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("(555) 123-4567 ext. 8"), "55512345678");
        assert_eq!(digits_only("none"), "");
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("123456", 2, 4), "34");
        assert_eq!(clip("123", 2, 8), "3");
        assert_eq!(clip("123", 5, 8), "");
    }

    #[test]
    fn test_phone_groups() {
        assert_eq!(phone_groups("555123456789"), ("555", "123", "4567"));
        assert_eq!(phone_groups("5551"), ("555", "1", ""));
    }
}
