//! Pattern registry
//!
//! Maps each [`SemanticType`] to its matching rule, its repair strategy and
//! its safe default. The registry is built once on first use and never
//! mutated afterwards, so it can be shared freely between threads.
//!
//! All grammars are anchored: a value matches only if the whole string
//! conforms.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{DateLayout, SemanticType, TimeLayout};
use crate::utils::address::{normalize_email, normalize_url};
use crate::utils::password::PasswordStrength;
use crate::utils::text::strip_all_tags;

/// Characters allowed in passwords besides letters and digits
pub const PASSWORD_SYMBOLS: &str = ".* ^&$@#:=+-_~!?%";

static REGISTRY: Lazy<PatternRegistry> = Lazy::new(PatternRegistry::build);

/// Shared registry instance
pub fn registry() -> &'static PatternRegistry {
    &REGISTRY
}

/// Character classes repaired by filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    LettersWithSpace,
    Letters,
    Alphanumeric,
    AlphanumericNoSpace,
    AlphanumericExtended,
    AlphanumericExtendedNoSpace,
    PhoneSymbols,
}

impl CharClass {
    /// Check if `c` belongs to the class
    pub fn allows(&self, c: char) -> bool {
        match self {
            CharClass::LettersWithSpace => c.is_ascii_alphabetic() || c == ' ',
            CharClass::Letters => c.is_ascii_alphabetic(),
            CharClass::Alphanumeric => c.is_ascii_alphanumeric() || c == ' ',
            CharClass::AlphanumericNoSpace => c.is_ascii_alphanumeric(),
            CharClass::AlphanumericExtended => c.is_ascii_alphanumeric() || " .-_".contains(c),
            CharClass::AlphanumericExtendedNoSpace => {
                c.is_ascii_alphanumeric() || ".-_".contains(c)
            }
            CharClass::PhoneSymbols => c.is_ascii_digit() || " .+-()".contains(c),
        }
    }

    /// Drop every character outside the class
    pub fn filter(&self, value: &str) -> String {
        value.chars().filter(|c| self.allows(*c)).collect()
    }
}

/// How a value is matched against its type
#[derive(Debug)]
pub enum Rule {
    /// A single anchored pattern
    Pattern(Regex),
    /// Valid if any of the patterns matches
    AnyOf(Vec<Regex>),
    /// Pattern chosen by [`DateLayout`]
    Dated,
    /// Pattern chosen by [`TimeLayout`]
    Timed,
    /// Unchanged by markup stripping
    Markup { collapse_breaks: bool },
    /// Unchanged by the email normalizer
    Email,
    /// Unchanged by the URL normalizer
    Url,
    /// Character-class coverage plus minimum length
    Password(PasswordStrength),
    /// IPv4 or IPv6
    IpAddress,
}

/// How an invalid value is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    KeepClass(CharClass),
    Number { signed: bool, decimal: bool },
    Email,
    Url,
    Phone,
    Money,
    Currency,
    Date,
    Time,
    Password(PasswordStrength),
    /// No rewrite exists; go straight to the safe default
    Replace,
    /// Default handler for text and unknown types
    StripMarkup { collapse_breaks: bool },
}

/// Value substituted when a repaired value still does not validate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeDefault {
    /// The repaired value is returned even if it is invalid
    None,
    Literal(&'static str),
    /// All-zero number in the requested phone layout
    PhonePlaceholder,
    /// Clock reading in the requested date layout
    CurrentDate,
    GeneratedPassword(PasswordStrength),
    /// Zero address of the requested family
    ZeroAddress,
}

/// Registry entry for one semantic type
#[derive(Debug)]
pub struct PatternEntry {
    pub semantic_type: SemanticType,
    pub rule: Rule,
    pub repair: Repair,
    pub safe_default: SafeDefault,
    /// Human readable grammar, used in diagnostics
    pub description: &'static str,
}

/// Immutable registry of grammars and repair rules
#[derive(Debug)]
pub struct PatternRegistry {
    entries: Vec<PatternEntry>,
    dates: Vec<Regex>,
    times: Vec<Regex>,
    ipv4: Regex,
    ipv6: Regex,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid registry pattern {pattern}: {e}"))
}

impl PatternRegistry {
    fn build() -> Self {
        let entries = SemanticType::ALL.iter().map(|ty| Self::entry_for(*ty)).collect();

        let dates = DateLayout::ALL
            .iter()
            .map(|layout| {
                compile(match layout {
                    DateLayout::MonthDayYearSlash => {
                        r"^(0[1-9]|1[0-2])/(0[1-9]|[12][0-9]|3[01])/[12][0-9]{3}$"
                    }
                    DateLayout::MonthDayYearDash => {
                        r"^(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])-[12][0-9]{3}$"
                    }
                    DateLayout::DayMonthYearSlash => {
                        r"^(0[1-9]|[12][0-9]|3[01])/(0[1-9]|1[0-2])/[12][0-9]{3}$"
                    }
                    DateLayout::DayMonthYearDash => {
                        r"^(0[1-9]|[12][0-9]|3[01])-(0[1-9]|1[0-2])-[12][0-9]{3}$"
                    }
                    DateLayout::SqlDateTime => {
                        r"^[12][0-9]{3}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01]) ([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]$"
                    }
                    DateLayout::SqlDate => {
                        r"^[12][0-9]{3}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$"
                    }
                })
            })
            .collect();

        let times = TimeLayout::ALL
            .iter()
            .map(|layout| {
                compile(match layout {
                    TimeLayout::HourMinute => r"^(0?[1-9]|1[0-2]):[0-5][0-9]$",
                    TimeLayout::HourMinuteMeridiem => {
                        r"^(1[0-2]|0?[1-9]):[0-5][0-9] ?[AaPp][Mm]$"
                    }
                    TimeLayout::HourMinuteSecond => r"^(1[0-2]|0?[1-9]):[0-5][0-9]:[0-5][0-9]$",
                    TimeLayout::HourMinuteSecondMeridiem => {
                        r"^(1[0-2]|0?[1-9]):[0-5][0-9]:[0-5][0-9] ?[AaPp][Mm]$"
                    }
                    TimeLayout::HourMinute24 => r"^([0-9]|0[0-9]|1[0-9]|2[0-3]):[0-5][0-9]$",
                    TimeLayout::HourMinuteSecond24 => {
                        r"^([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]$"
                    }
                })
            })
            .collect();

        let ipv4 = compile(r"^(?:(?:^|\.)(?:2(?:5[0-5]|[0-4][0-9])|1?[0-9]?[0-9])){4}$");
        let ipv6 = compile(concat!(
            r"^(?:",
            r"([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}",
            r"|([0-9a-fA-F]{1,4}:){1,7}:",
            r"|([0-9a-fA-F]{1,4}:){1,6}:[0-9a-fA-F]{1,4}",
            r"|([0-9a-fA-F]{1,4}:){1,5}(:[0-9a-fA-F]{1,4}){1,2}",
            r"|([0-9a-fA-F]{1,4}:){1,4}(:[0-9a-fA-F]{1,4}){1,3}",
            r"|([0-9a-fA-F]{1,4}:){1,3}(:[0-9a-fA-F]{1,4}){1,4}",
            r"|([0-9a-fA-F]{1,4}:){1,2}(:[0-9a-fA-F]{1,4}){1,5}",
            r"|[0-9a-fA-F]{1,4}:((:[0-9a-fA-F]{1,4}){1,6})",
            r"|:((:[0-9a-fA-F]{1,4}){1,7}|:)",
            r"|fe80:(:[0-9a-fA-F]{0,4}){0,4}%[0-9a-zA-Z]+",
            r"|::(ffff(:0{1,4})?:)?((25[0-5]|(2[0-4]|1?[0-9])?[0-9])\.){3}(25[0-5]|(2[0-4]|1?[0-9])?[0-9])",
            r"|([0-9a-fA-F]{1,4}:){1,4}:((25[0-5]|(2[0-4]|1?[0-9])?[0-9])\.){3}(25[0-5]|(2[0-4]|1?[0-9])?[0-9])",
            r")$"
        ));

        Self {
            entries,
            dates,
            times,
            ipv4,
            ipv6,
        }
    }

    fn entry_for(ty: SemanticType) -> PatternEntry {
        use SemanticType::*;

        let class = |class: CharClass, pattern: &str, description: &'static str| PatternEntry {
            semantic_type: ty,
            rule: Rule::Pattern(compile(pattern)),
            repair: Repair::KeepClass(class),
            safe_default: SafeDefault::None,
            description,
        };
        let number = |signed: bool, decimal: bool, pattern: &str, description: &'static str| {
            PatternEntry {
                semantic_type: ty,
                rule: Rule::Pattern(compile(pattern)),
                repair: Repair::Number { signed, decimal },
                safe_default: SafeDefault::None,
                description,
            }
        };

        match ty {
            Text | MultiText => {
                let collapse_breaks = ty == Text;
                PatternEntry {
                    semantic_type: ty,
                    rule: Rule::Markup { collapse_breaks },
                    repair: Repair::StripMarkup { collapse_breaks },
                    safe_default: SafeDefault::None,
                    description: if collapse_breaks {
                        "plain text without markup or repeated whitespace"
                    } else {
                        "plain text without markup"
                    },
                }
            }
            LettersWithSpace => class(
                CharClass::LettersWithSpace,
                r"^[a-zA-Z ]*$",
                "letters and spaces",
            ),
            Letters => class(CharClass::Letters, r"^[a-zA-Z]*$", "letters"),
            Alphanumeric => class(
                CharClass::Alphanumeric,
                r"^[a-zA-Z0-9 ]*$",
                "letters, digits and spaces",
            ),
            AlphanumericNoSpace => class(
                CharClass::AlphanumericNoSpace,
                r"^[a-zA-Z0-9]*$",
                "letters and digits",
            ),
            AlphanumericExtended => class(
                CharClass::AlphanumericExtended,
                r"^[a-zA-Z0-9 .\-_]*$",
                "letters, digits, spaces, dots, dashes and underscores",
            ),
            AlphanumericExtendedNoSpace => class(
                CharClass::AlphanumericExtendedNoSpace,
                r"^[a-zA-Z0-9.\-_]*$",
                "letters, digits, dots, dashes and underscores",
            ),
            Integer => number(false, false, r"^[0-9]+$", "an unsigned integer"),
            SignedInteger => number(true, false, r"^-?[0-9]+$", "an integer"),
            Decimal => number(false, true, r"^[0-9]*(\.[0-9]+)?$", "an unsigned decimal"),
            SignedDecimal => number(true, true, r"^-?[0-9]*(\.[0-9]+)?$", "a decimal"),
            Email => PatternEntry {
                semantic_type: ty,
                rule: Rule::Email,
                repair: Repair::Email,
                safe_default: SafeDefault::None,
                description: "an email address",
            },
            Phone => PatternEntry {
                semantic_type: ty,
                rule: Rule::AnyOf(
                    [
                        r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$",
                        r"^[0-9]{3}\.[0-9]{3}\.[0-9]{4}$",
                        r"^[0-9]{3} [0-9]{3} [0-9]{4}$",
                        r"^\([0-9]{3}\) ?[0-9]{3}-[0-9]{4}$",
                        r"^[0-9]{10}$",
                    ]
                    .iter()
                    .map(|p| compile(p))
                    .collect(),
                ),
                repair: Repair::Phone,
                safe_default: SafeDefault::PhonePlaceholder,
                description: "a ten digit phone number",
            },
            InternationalPhone => class(
                CharClass::PhoneSymbols,
                r"^[0-9 .+\-()]*$",
                "digits, spaces and + . - ( )",
            ),
            Money => PatternEntry {
                semantic_type: ty,
                rule: Rule::Pattern(compile(r"^[0-9]+\.?[0-9]{2}$")),
                repair: Repair::Money,
                safe_default: SafeDefault::Literal("0.00"),
                description: "an amount with two decimal places",
            },
            Currency => PatternEntry {
                semantic_type: ty,
                rule: Rule::Pattern(compile(r"^\$[0-9]+\.[0-9]{2}$")),
                repair: Repair::Currency,
                safe_default: SafeDefault::Literal("$0.00"),
                description: "a dollar amount such as $12.34",
            },
            Date => PatternEntry {
                semantic_type: ty,
                rule: Rule::Dated,
                repair: Repair::Date,
                safe_default: SafeDefault::CurrentDate,
                description: "a date in the requested layout",
            },
            Time => PatternEntry {
                semantic_type: ty,
                rule: Rule::Timed,
                repair: Repair::Time,
                safe_default: SafeDefault::None,
                description: "a time in the requested layout",
            },
            Url => PatternEntry {
                semantic_type: ty,
                rule: Rule::Url,
                repair: Repair::Url,
                safe_default: SafeDefault::None,
                description: "a web address",
            },
            Password | StrongPassword => {
                let strength = if ty == Password {
                    PasswordStrength::Standard
                } else {
                    PasswordStrength::Strong
                };
                PatternEntry {
                    semantic_type: ty,
                    rule: Rule::Password(strength),
                    repair: Repair::Password(strength),
                    safe_default: SafeDefault::GeneratedPassword(strength),
                    description: if strength == PasswordStrength::Strong {
                        "at least 8 characters with a lowercase letter, an uppercase letter, a digit and a symbol"
                    } else {
                        "at least 8 characters with a lowercase letter, an uppercase letter and a digit"
                    },
                }
            }
            Ip => PatternEntry {
                semantic_type: ty,
                rule: Rule::IpAddress,
                repair: Repair::Replace,
                safe_default: SafeDefault::ZeroAddress,
                description: "an IPv4 or IPv6 address",
            },
        }
    }

    /// Get the entry for a semantic type
    pub fn entry(&self, ty: SemanticType) -> &PatternEntry {
        &self.entries[ty.index()]
    }

    pub fn rule(&self, ty: SemanticType) -> &Rule {
        &self.entry(ty).rule
    }

    pub fn repair(&self, ty: SemanticType) -> Repair {
        self.entry(ty).repair
    }

    /// Pattern for a date layout
    pub fn date_pattern(&self, layout: DateLayout) -> &Regex {
        &self.dates[layout as usize]
    }

    /// Pattern for a time layout
    pub fn time_pattern(&self, layout: TimeLayout) -> &Regex {
        &self.times[layout as usize]
    }

    /// Check a value against its type grammar, ignoring length bounds
    pub fn is_match(&self, ty: SemanticType, value: &str, info: &str) -> bool {
        match &self.entry(ty).rule {
            Rule::Pattern(pattern) => pattern.is_match(value),
            Rule::AnyOf(patterns) => patterns.iter().any(|p| p.is_match(value)),
            Rule::Dated => self.date_pattern(DateLayout::from_info(info)).is_match(value),
            Rule::Timed => self.time_pattern(TimeLayout::from_info(info)).is_match(value),
            Rule::Markup { collapse_breaks: true } => strip_all_tags(value, true) == value,
            Rule::Markup {
                collapse_breaks: false,
            } => strip_all_tags(value, false) == value.trim_end(),
            Rule::Email => normalize_email(value) == value,
            Rule::Url => normalize_url(value) == value,
            Rule::Password(strength) => password_conforms(value, *strength),
            Rule::IpAddress => self.is_ip(value),
        }
    }

    /// Check for an IPv4 or IPv6 address
    pub fn is_ip(&self, value: &str) -> bool {
        self.ipv4.is_match(value) || self.ipv6.is_match(value)
    }
}

/// Check the password grammar for a policy
pub fn password_conforms(value: &str, strength: PasswordStrength) -> bool {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c));
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_symbol = value.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    let base = allowed && has_lower && has_upper && has_digit && value.len() > 7;
    match strength {
        PasswordStrength::Standard => base,
        PasswordStrength::Strong => base && has_symbol,
    }
}
