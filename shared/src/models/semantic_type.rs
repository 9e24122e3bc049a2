//! Semantic type tags
//!
//! Every value handled by the validator and the sanitizer carries one of
//! these tags. The canonical names are the short identifiers used in form
//! definitions and on the command line.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::SharedError;

/// Data-shape contract for a submitted value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SemanticType {
    /// Single-line text, markup removed and whitespace collapsed
    #[serde(rename = "text")]
    Text,

    /// Multi-line text, line breaks kept
    #[serde(rename = "multitext")]
    MultiText,

    /// Letters and spaces
    #[serde(rename = "letters1a", alias = "letters-with-space")]
    LettersWithSpace,

    /// Letters only
    #[serde(rename = "letters1b", alias = "letters")]
    Letters,

    /// Letters, digits and spaces
    #[serde(rename = "alphanum1a", alias = "alphanumeric")]
    Alphanumeric,

    /// Letters and digits
    #[serde(rename = "alphanum1b")]
    AlphanumericNoSpace,

    /// Letters, digits, spaces, dots, dashes and underscores
    #[serde(rename = "alphanum2a")]
    AlphanumericExtended,

    /// Letters, digits, dots, dashes and underscores
    #[serde(rename = "alphanum2b")]
    AlphanumericExtendedNoSpace,

    /// Unsigned integer
    #[serde(rename = "num", alias = "integer")]
    Integer,

    /// Integer with optional leading minus
    #[serde(rename = "numneg")]
    SignedInteger,

    /// Unsigned decimal
    #[serde(rename = "numdec", alias = "decimal")]
    Decimal,

    /// Decimal with optional leading minus
    #[serde(rename = "numdecneg")]
    SignedDecimal,

    /// Email address
    #[serde(rename = "email")]
    Email,

    /// Ten-digit US phone number in one of five layouts
    #[serde(rename = "phone", alias = "us-phone")]
    Phone,

    /// Free-form international phone number
    #[serde(rename = "intphone", alias = "international-phone")]
    InternationalPhone,

    /// Amount with two fractional digits
    #[serde(rename = "money")]
    Money,

    /// Dollar amount with two fractional digits
    #[serde(rename = "currency")]
    Currency,

    /// Calendar date, layout selected by `info`
    #[serde(rename = "date")]
    Date,

    /// Clock time, layout selected by `info`
    #[serde(rename = "time")]
    Time,

    /// Web address
    #[serde(rename = "url")]
    Url,

    /// Password with lower, upper and digit
    #[serde(rename = "password")]
    Password,

    /// Password with lower, upper, digit and special
    #[serde(rename = "passwordstrong", alias = "strong-password")]
    StrongPassword,

    /// IPv4 or IPv6 address
    #[serde(rename = "ip")]
    Ip,
}

impl SemanticType {
    /// Every semantic type, in registry order
    pub const ALL: [SemanticType; 23] = [
        SemanticType::Text,
        SemanticType::MultiText,
        SemanticType::LettersWithSpace,
        SemanticType::Letters,
        SemanticType::Alphanumeric,
        SemanticType::AlphanumericNoSpace,
        SemanticType::AlphanumericExtended,
        SemanticType::AlphanumericExtendedNoSpace,
        SemanticType::Integer,
        SemanticType::SignedInteger,
        SemanticType::Decimal,
        SemanticType::SignedDecimal,
        SemanticType::Email,
        SemanticType::Phone,
        SemanticType::InternationalPhone,
        SemanticType::Money,
        SemanticType::Currency,
        SemanticType::Date,
        SemanticType::Time,
        SemanticType::Url,
        SemanticType::Password,
        SemanticType::StrongPassword,
        SemanticType::Ip,
    ];

    /// Get the canonical name used in form definitions
    pub fn name(&self) -> &'static str {
        match self {
            SemanticType::Text => "text",
            SemanticType::MultiText => "multitext",
            SemanticType::LettersWithSpace => "letters1a",
            SemanticType::Letters => "letters1b",
            SemanticType::Alphanumeric => "alphanum1a",
            SemanticType::AlphanumericNoSpace => "alphanum1b",
            SemanticType::AlphanumericExtended => "alphanum2a",
            SemanticType::AlphanumericExtendedNoSpace => "alphanum2b",
            SemanticType::Integer => "num",
            SemanticType::SignedInteger => "numneg",
            SemanticType::Decimal => "numdec",
            SemanticType::SignedDecimal => "numdecneg",
            SemanticType::Email => "email",
            SemanticType::Phone => "phone",
            SemanticType::InternationalPhone => "intphone",
            SemanticType::Money => "money",
            SemanticType::Currency => "currency",
            SemanticType::Date => "date",
            SemanticType::Time => "time",
            SemanticType::Url => "url",
            SemanticType::Password => "password",
            SemanticType::StrongPassword => "passwordstrong",
            SemanticType::Ip => "ip",
        }
    }

    /// Position of this type in [`SemanticType::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Resolve a type name, treating anything unrecognized as plain text
    pub fn from_name_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            debug!("Unknown semantic type '{}', using text rule", name);
            SemanticType::Text
        })
    }

    /// Check if `info` selects a sub-format for this type
    pub fn has_layouts(&self) -> bool {
        matches!(
            self,
            SemanticType::Phone | SemanticType::Date | SemanticType::Time | SemanticType::Ip
        )
    }

    /// Check if values of this type must never be logged
    pub fn is_sensitive(&self) -> bool {
        matches!(self, SemanticType::Password | SemanticType::StrongPassword)
    }
}

impl FromStr for SemanticType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let found = match normalized.as_str() {
            "letters-with-space" => Some(SemanticType::LettersWithSpace),
            "letters" => Some(SemanticType::Letters),
            "alphanumeric" => Some(SemanticType::Alphanumeric),
            "integer" => Some(SemanticType::Integer),
            "decimal" => Some(SemanticType::Decimal),
            "us-phone" => Some(SemanticType::Phone),
            "international-phone" => Some(SemanticType::InternationalPhone),
            "strong-password" => Some(SemanticType::StrongPassword),
            other => SemanticType::ALL.iter().copied().find(|t| t.name() == other),
        };

        found.ok_or_else(|| SharedError::UnknownType {
            name: s.to_string(),
        })
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
