//! Validation for FormGuard
//!
//! This module applies the pattern registry plus length bounds to a value.
//! [`validate`] is the boolean contract used throughout the crate;
//! [`check`] and [`explain`] report why a value failed and always agree
//! with it.
//!
//! Length bounds are compared against `min_length - 1` and
//! `max_length - 1`, counted in characters, and only after the grammar has
//! matched. A bound of zero disables that side of the check.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::DEFAULT_MIN_LENGTH;
use crate::models::SemanticType;
use crate::patterns::registry;

/// Validation result with detailed error information
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub failure: Option<ValidationFailure>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            failure: None,
        }
    }

    /// Create a failed validation result for a reason
    pub fn failed(failure: ValidationFailure, message: String) -> Self {
        Self {
            is_valid: false,
            errors: vec![message],
            warnings: Vec::new(),
            failure: Some(failure),
        }
    }

    /// Add a warning to this validation result
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// Why a value was rejected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    Empty,
    Grammar,
    TooShort { min_length: usize },
    TooLong { max_length: usize },
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::Empty => write!(f, "value is empty"),
            ValidationFailure::Grammar => write!(f, "value does not match its type"),
            ValidationFailure::TooShort { min_length } => {
                write!(f, "value is shorter than {} characters", min_length)
            }
            ValidationFailure::TooLong { max_length } => {
                write!(f, "value is longer than {} characters", max_length)
            }
        }
    }
}

/// A value plus everything needed to validate it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationRequest {
    pub value: String,
    pub semantic_type: SemanticType,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default)]
    pub max_length: usize,
    #[serde(default)]
    pub info: String,
}

fn default_min_length() -> usize {
    DEFAULT_MIN_LENGTH
}

impl ValidationRequest {
    /// Create a request with the default bounds
    pub fn new<S: Into<String>>(value: S, semantic_type: SemanticType) -> Self {
        Self {
            value: value.into(),
            semantic_type,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: 0,
            info: String::new(),
        }
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Select a phone, date, time or IP layout
    pub fn with_info<S: Into<String>>(mut self, info: S) -> Self {
        self.info = info.into();
        self
    }

    /// Run the boolean check
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Run the check and report the first failing rule
    pub fn check(&self) -> Result<(), ValidationFailure> {
        check(
            &self.value,
            self.semantic_type,
            self.min_length,
            self.max_length,
            &self.info,
        )
    }
}

/// Validate a value for a semantic type.
///
/// Empty input always fails. `max_length` of zero means unbounded.
pub fn validate(
    value: &str,
    semantic_type: SemanticType,
    min_length: usize,
    max_length: usize,
    info: &str,
) -> bool {
    check(value, semantic_type, min_length, max_length, info).is_ok()
}

/// Validate a value and report the first failing rule
pub fn check(
    value: &str,
    semantic_type: SemanticType,
    min_length: usize,
    max_length: usize,
    info: &str,
) -> Result<(), ValidationFailure> {
    if value.is_empty() {
        return Err(ValidationFailure::Empty);
    }

    if !registry().is_match(semantic_type, value, info) {
        return Err(ValidationFailure::Grammar);
    }

    let length = value.chars().count();
    if min_length > 0 && length < min_length - 1 {
        return Err(ValidationFailure::TooShort { min_length });
    }
    if max_length > 0 && length > max_length - 1 {
        return Err(ValidationFailure::TooLong { max_length });
    }

    Ok(())
}

/// Validate a request and describe any failure in words.
///
/// An `info` given for a type without layouts has no effect on the outcome
/// and is reported as a warning.
pub fn explain(request: &ValidationRequest) -> ValidationResult {
    let mut result = match request.check() {
        Ok(()) => ValidationResult::success(),
        Err(ValidationFailure::Grammar) => {
            let description = registry().entry(request.semantic_type).description;
            ValidationResult::failed(
                ValidationFailure::Grammar,
                format!("Expected {} ({})", description, request.semantic_type),
            )
        }
        Err(failure) => ValidationResult::failed(failure, capitalize(&failure.to_string())),
    };

    if !request.info.is_empty() && !request.semantic_type.has_layouts() {
        result.add_warning(format!(
            "Info {:?} is ignored for {}",
            request.info, request.semantic_type
        ));
    }
    result
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
