//! Password generation utilities
//!
//! This module builds random passwords that satisfy the `password` and
//! `passwordstrong` grammars. Draws come from `rand::thread_rng`, a
//! cryptographically secure generator.

use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use crate::constants::{STANDARD_PASSWORD_LENGTH, STRONG_PASSWORD_LENGTH};
use crate::models::SemanticType;
use crate::validation::validate;

/// Password character sets for generation
pub struct CharacterSets;

impl CharacterSets {
    pub const LOWERCASE: &'static str = "abcdefghijklmnopqrstuvwxyz";
    pub const UPPERCASE: &'static str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    pub const DIGITS: &'static str = "0123456789";
    pub const SPECIALS: &'static str = ".*^&$@#:=+-_~!?%";
}

/// Password policy targeted by the generator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    #[default]
    Standard,
    Strong,
}

impl PasswordStrength {
    /// Number of characters generated
    pub fn target_length(&self) -> usize {
        match self {
            PasswordStrength::Standard => STANDARD_PASSWORD_LENGTH,
            PasswordStrength::Strong => STRONG_PASSWORD_LENGTH,
        }
    }

    /// Semantic type the generated password has to satisfy
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            PasswordStrength::Standard => SemanticType::Password,
            PasswordStrength::Strong => SemanticType::StrongPassword,
        }
    }
}

/// Character category drawn on each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Lower,
    Upper,
    Digit,
    Special,
}

/// Password generator
pub struct PasswordGenerator;

impl PasswordGenerator {
    /// Build one candidate password.
    ///
    /// Digits (and specials for strong passwords) only become drawable once a
    /// letter has been placed, while the password is still shorter than one
    /// before the target length, and while fewer than three of each have been
    /// placed. The result is not guaranteed to satisfy the policy; see
    /// [`PasswordGenerator::generate_valid`].
    pub fn generate(strength: PasswordStrength) -> String {
        Self::generate_with(&mut thread_rng(), strength)
    }

    /// Build one candidate password from the given random source
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, strength: PasswordStrength) -> String {
        let target = strength.target_length();
        let mut password = String::with_capacity(target);
        let (mut letters, mut digits, mut specials) = (0usize, 0usize, 0usize);

        while password.len() < target {
            let widened = letters > 0
                && password.len() < target - 1
                && digits < 3
                && (strength == PasswordStrength::Standard || specials < 3);

            let categories: &[Category] = match (widened, strength) {
                (false, _) => &[Category::Lower, Category::Upper],
                (true, PasswordStrength::Standard) => {
                    &[Category::Lower, Category::Upper, Category::Digit]
                }
                (true, PasswordStrength::Strong) => &[
                    Category::Lower,
                    Category::Upper,
                    Category::Digit,
                    Category::Special,
                ],
            };

            let category = categories[rng.gen_range(0..categories.len())];
            let charset = match category {
                Category::Lower => {
                    letters += 1;
                    CharacterSets::LOWERCASE
                }
                Category::Upper => {
                    letters += 1;
                    CharacterSets::UPPERCASE
                }
                Category::Digit => {
                    digits += 1;
                    CharacterSets::DIGITS
                }
                Category::Special => {
                    specials += 1;
                    CharacterSets::SPECIALS
                }
            };

            let bytes = charset.as_bytes();
            password.push(bytes[rng.gen_range(0..bytes.len())] as char);
        }

        password
    }

    /// Generate until the password passes validation for its policy
    pub fn generate_valid(strength: PasswordStrength) -> String {
        Self::generate_valid_with(&mut thread_rng(), strength)
    }

    /// Generate from the given random source until the password validates
    pub fn generate_valid_with<R: Rng + ?Sized>(rng: &mut R, strength: PasswordStrength) -> String {
        let semantic_type = strength.semantic_type();
        loop {
            let candidate = Self::generate_with(rng, strength);
            if validate(&candidate, semantic_type, 1, 0, "") {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_candidate_length() {
        assert_eq!(PasswordGenerator::generate(PasswordStrength::Standard).len(), 8);
        assert_eq!(PasswordGenerator::generate(PasswordStrength::Strong).len(), 12);
    }

    #[test]
    fn test_candidate_starts_with_letter() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let password = PasswordGenerator::generate_with(&mut rng, PasswordStrength::Strong);
            assert!(password.chars().next().unwrap().is_ascii_alphabetic());
        }
    }

    #[test]
    fn test_candidate_category_caps() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let password = PasswordGenerator::generate_with(&mut rng, PasswordStrength::Strong);
            let digits = password.chars().filter(|c| c.is_ascii_digit()).count();
            let specials = password
                .chars()
                .filter(|c| CharacterSets::SPECIALS.contains(*c))
                .count();
            assert!(digits <= 3);
            assert!(specials <= 3);
            // The final character is always a letter.
            assert!(password.chars().last().unwrap().is_ascii_alphabetic());
        }
    }

    #[test]
    fn test_valid_standard_passwords() {
        for _ in 0..1000 {
            let password = PasswordGenerator::generate_valid(PasswordStrength::Standard);
            assert_eq!(password.len(), 8);
            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
            assert!(password.chars().any(|c| c.is_ascii_uppercase()));
            assert!(password.chars().any(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_valid_strong_passwords() {
        for _ in 0..200 {
            let password = PasswordGenerator::generate_valid(PasswordStrength::Strong);
            assert_eq!(password.len(), 12);
            assert!(validate(&password, SemanticType::StrongPassword, 1, 0, ""));
        }
    }
}
