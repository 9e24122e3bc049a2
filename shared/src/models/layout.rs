//! Layout discriminators
//!
//! Phone, date, time and IP values accept several sub-formats. On the
//! string boundary the format is selected with an `info` argument; these
//! enums are its parsed form. Unrecognized `info` always resolves to the
//! layout's default rather than failing.

use serde::{Deserialize, Serialize};

/// US phone number layouts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhoneLayout {
    /// `###-###-####`
    Dashed,
    /// `###.###.####`
    Dotted,
    /// `### ### ####`
    Spaced,
    /// `(###) ###-####`
    #[default]
    Parenthesized,
    /// `##########`
    Bare,
}

impl PhoneLayout {
    /// Resolve a numeric layout index (0-4)
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => PhoneLayout::Dashed,
            1 => PhoneLayout::Dotted,
            2 => PhoneLayout::Spaced,
            3 => PhoneLayout::Parenthesized,
            4 => PhoneLayout::Bare,
            _ => PhoneLayout::default(),
        }
    }

    /// Resolve an `info` string
    pub fn from_info(info: &str) -> Self {
        info.trim()
            .parse::<i64>()
            .map(Self::from_index)
            .unwrap_or_default()
    }

    /// Join the three digit groups in this layout
    pub fn assemble(&self, area: &str, exchange: &str, line: &str) -> String {
        match self {
            PhoneLayout::Dashed => format!("{area}-{exchange}-{line}"),
            PhoneLayout::Dotted => format!("{area}.{exchange}.{line}"),
            PhoneLayout::Spaced => format!("{area} {exchange} {line}"),
            PhoneLayout::Parenthesized => format!("({area}) {exchange}-{line}"),
            PhoneLayout::Bare => format!("{area}{exchange}{line}"),
        }
    }

    /// All-zero number in this layout
    pub fn placeholder(&self) -> String {
        self.assemble("000", "000", "0000")
    }
}

/// Date layouts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateLayout {
    /// `m/d/Y`
    #[default]
    MonthDayYearSlash,
    /// `m-d-Y`
    MonthDayYearDash,
    /// `d/m/Y`
    DayMonthYearSlash,
    /// `d-m-Y`
    DayMonthYearDash,
    /// `Y-m-d H:i:s`
    SqlDateTime,
    /// `Y-m-d`
    SqlDate,
}

impl DateLayout {
    /// Every date layout, in index order
    pub const ALL: [DateLayout; 6] = [
        DateLayout::MonthDayYearSlash,
        DateLayout::MonthDayYearDash,
        DateLayout::DayMonthYearSlash,
        DateLayout::DayMonthYearDash,
        DateLayout::SqlDateTime,
        DateLayout::SqlDate,
    ];

    /// Resolve a numeric layout index (0-5)
    pub fn from_index(index: i64) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    /// Resolve an `info` string
    pub fn from_info(info: &str) -> Self {
        info.trim()
            .parse::<i64>()
            .map(Self::from_index)
            .unwrap_or_default()
    }

    /// `chrono` format string that renders this layout
    pub fn strftime(&self) -> &'static str {
        match self {
            DateLayout::MonthDayYearSlash => "%m/%d/%Y",
            DateLayout::MonthDayYearDash => "%m-%d-%Y",
            DateLayout::DayMonthYearSlash => "%d/%m/%Y",
            DateLayout::DayMonthYearDash => "%d-%m-%Y",
            DateLayout::SqlDateTime => "%Y-%m-%d %H:%M:%S",
            DateLayout::SqlDate => "%Y-%m-%d",
        }
    }

    /// Separator between the calendar fields
    pub fn separator(&self) -> char {
        match self {
            DateLayout::MonthDayYearSlash | DateLayout::DayMonthYearSlash => '/',
            _ => '-',
        }
    }
}

/// Clock time layouts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeLayout {
    /// `HH:MM`, 12 hour
    #[default]
    HourMinute,
    /// `HH:MM AM`
    HourMinuteMeridiem,
    /// `HH:MM:SS`, 12 hour
    HourMinuteSecond,
    /// `HH:MM:SS AM`
    HourMinuteSecondMeridiem,
    /// `HH:MM 24`
    HourMinute24,
    /// `HH:MM:SS 24`
    HourMinuteSecond24,
}

impl TimeLayout {
    /// Every time layout
    pub const ALL: [TimeLayout; 6] = [
        TimeLayout::HourMinute,
        TimeLayout::HourMinuteMeridiem,
        TimeLayout::HourMinuteSecond,
        TimeLayout::HourMinuteSecondMeridiem,
        TimeLayout::HourMinute24,
        TimeLayout::HourMinuteSecond24,
    ];

    /// Resolve an `info` string such as `"HH:MM:SS AM"`
    pub fn from_info(info: &str) -> Self {
        let wanted = info.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|layout| layout.info() == wanted)
            .unwrap_or_default()
    }

    /// The `info` string naming this layout
    pub fn info(&self) -> &'static str {
        match self {
            TimeLayout::HourMinute => "HH:MM",
            TimeLayout::HourMinuteMeridiem => "HH:MM AM",
            TimeLayout::HourMinuteSecond => "HH:MM:SS",
            TimeLayout::HourMinuteSecondMeridiem => "HH:MM:SS AM",
            TimeLayout::HourMinute24 => "HH:MM 24",
            TimeLayout::HourMinuteSecond24 => "HH:MM:SS 24",
        }
    }

    pub fn has_seconds(&self) -> bool {
        matches!(
            self,
            TimeLayout::HourMinuteSecond
                | TimeLayout::HourMinuteSecondMeridiem
                | TimeLayout::HourMinuteSecond24
        )
    }

    pub fn has_meridiem(&self) -> bool {
        matches!(
            self,
            TimeLayout::HourMinuteMeridiem | TimeLayout::HourMinuteSecondMeridiem
        )
    }

    /// Check if the layout requires a zero-padded hour
    pub fn pads_hour(&self) -> bool {
        matches!(self, TimeLayout::HourMinuteSecond24)
    }
}

/// Address family used for the zero-address fallback
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum IpFamily {
    #[default]
    V4,
    V6,
}

impl IpFamily {
    /// Resolve an `info` string (`"ipv4"` or `"ipv6"`)
    pub fn from_info(info: &str) -> Self {
        match info.trim().to_ascii_lowercase().as_str() {
            "ipv6" | "v6" | "6" => IpFamily::V6,
            _ => IpFamily::V4,
        }
    }

    /// Unspecified address, fully expanded
    pub fn zero_address(&self) -> &'static str {
        match self {
            IpFamily::V4 => "0.0.0.0",
            IpFamily::V6 => "0000:0000:0000:0000:0000:0000:0000:0000",
        }
    }
}
