//! Date conversion utilities
//!
//! Loosely formatted dates are reduced to their digits, sliced into fixed
//! width calendar fields and re-emitted as SQL datetime, SQL date or epoch
//! seconds. All times are UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DateLayout, SemanticType};
use crate::validation::validate;

/// Field order of the value handed to a converter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceLayout {
    /// `mm dd yyyy [hh mm ss]`
    #[default]
    MonthDayYear,
    /// `dd mm yyyy [hh mm ss]`
    DayMonthYear,
    /// Seconds since the Unix epoch
    Epoch,
}

impl SourceLayout {
    /// Resolve a numeric layout index (0-2)
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => SourceLayout::DayMonthYear,
            2 => SourceLayout::Epoch,
            _ => SourceLayout::MonthDayYear,
        }
    }
}

/// Date conversion failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("no date given")]
    Empty,

    #[error("'{digits}' does not describe a calendar date")]
    InvalidCalendar { digits: String },

    #[error("epoch value '{digits}' is out of range")]
    OutOfRange { digits: String },

    #[error("converted value '{value}' is outside the supported years")]
    Rejected { value: String },
}

/// Convert to `Y-m-d H:i:s`
pub fn to_sql_datetime(date: &str, layout: SourceLayout) -> Result<String, ConvertError> {
    let parsed = parse_loose(date, layout)?;
    render_checked(&parsed, DateLayout::SqlDateTime)
}

/// Convert to `Y-m-d`
pub fn to_sql_date(date: &str, layout: SourceLayout) -> Result<String, ConvertError> {
    let parsed = parse_loose(date, layout)?;
    render_checked(&parsed, DateLayout::SqlDate)
}

/// Convert to epoch seconds
pub fn to_epoch(date: &str, layout: SourceLayout) -> Result<i64, ConvertError> {
    let parsed = parse_loose(date, layout)?;
    render_checked(&parsed, DateLayout::SqlDateTime)?;
    Ok(parsed.and_utc().timestamp())
}

fn render_checked(parsed: &NaiveDateTime, layout: DateLayout) -> Result<String, ConvertError> {
    let rendered = parsed.format(layout.strftime()).to_string();
    let info = if layout == DateLayout::SqlDateTime { "4" } else { "5" };

    if validate(&rendered, SemanticType::Date, 0, 0, info) {
        Ok(rendered)
    } else {
        Err(ConvertError::Rejected { value: rendered })
    }
}

fn parse_loose(date: &str, layout: SourceLayout) -> Result<NaiveDateTime, ConvertError> {
    if date.trim().is_empty() {
        return Err(ConvertError::Empty);
    }

    let digits: String = date.chars().filter(|c| c.is_ascii_digit()).collect();
    let invalid = || ConvertError::InvalidCalendar {
        digits: digits.clone(),
    };

    if layout == SourceLayout::Epoch {
        let seconds: i64 = digits.parse().map_err(|_| invalid())?;
        return DateTime::<Utc>::from_timestamp(seconds, 0)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| ConvertError::OutOfRange {
                digits: digits.clone(),
            });
    }

    let first: u32 = field(&digits, 0, 2).ok_or_else(invalid)?;
    let second: u32 = field(&digits, 2, 4).ok_or_else(invalid)?;
    let year: i32 = field(&digits, 4, 8).ok_or_else(invalid)?;
    let hour: u32 = field(&digits, 8, 10).unwrap_or(0);
    let minute: u32 = field(&digits, 10, 12).unwrap_or(0);
    let second_of_minute: u32 = field(&digits, 12, 14).unwrap_or(0);

    let (month, day) = match layout {
        SourceLayout::DayMonthYear => (second, first),
        _ => (first, second),
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second_of_minute))
        .ok_or_else(invalid)
}

/// Parse the digit run `[start, end)`, clipped to the input length
fn field<T: std::str::FromStr>(digits: &str, start: usize, end: usize) -> Option<T> {
    let end = end.min(digits.len());
    digits.get(start..end).filter(|s| !s.is_empty())?.parse().ok()
}
