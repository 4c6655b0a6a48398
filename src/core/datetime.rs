//! Date and time resolution for report headers and rows
//!
//! Report headers carry a date in one of several layouts depending on the
//! platform and locale that produced them. [`determine_format`] walks a fixed,
//! ordered table of regular expressions and the first match wins, so the
//! order of [`DATE_FORMAT_TABLE`] matters (`03/28/16` must fall through the
//! four-digit-year entries before reaching `MM/dd/yy`).

use crate::error::{Result, SarError};
use chrono::{Month, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Preference value that turns on date and time layout detection
pub const AUTOMATIC_DETECTION: &str = "Automatic Detection";

/// Linux date format preferences accepted by `config set date-format`
pub const LINUX_DATE_FORMATS: &[&str] = &[
    AUTOMATIC_DETECTION,
    "MM/DD/YYYY 23:59:59",
    "MM/DD/YYYY 12:59:59 AM|PM",
    "DD/MM/YYYY 23:59:59",
    "YYYY-MM-DD 23:59:59",
    "MM/DD/YY 23:59:59",
    "MM/DD/YY 12:59:59 AM|PM",
    "DD/MM/YY 23:59:59",
];

/// Known header date layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePattern {
    /// `yyyyMMdd`
    CompactYmd,
    /// `dd-MM-yyyy`
    DashDmy,
    /// `yyyy-MM-dd`
    DashYmd,
    /// `MM/dd/yyyy`
    SlashMdy,
    /// `yyyy/MM/dd`
    SlashYmd,
    /// `dd MMM yyyy`
    ShortMonthName,
    /// `dd MMMM yyyy`
    LongMonthName,
    /// `dd-MM-yy`
    DashDmyShort,
    /// `MM/dd/yy`
    SlashMdyShort,
    /// `dd/MM/yyyy`, only reachable through an explicit preference
    SlashDmy,
    /// `dd/MM/yy`, only reachable through an explicit preference
    SlashDmyShort,
}

#[derive(Clone, Copy)]
enum Field {
    Day,
    Month,
    MonthName,
    Year,
    ShortYear,
}

impl DatePattern {
    const ALL: [DatePattern; 11] = [
        DatePattern::CompactYmd,
        DatePattern::DashDmy,
        DatePattern::DashYmd,
        DatePattern::SlashMdy,
        DatePattern::SlashYmd,
        DatePattern::ShortMonthName,
        DatePattern::LongMonthName,
        DatePattern::DashDmyShort,
        DatePattern::SlashMdyShort,
        DatePattern::SlashDmy,
        DatePattern::SlashDmyShort,
    ];

    pub fn as_pattern_str(&self) -> &'static str {
        match self {
            DatePattern::CompactYmd => "yyyyMMdd",
            DatePattern::DashDmy => "dd-MM-yyyy",
            DatePattern::DashYmd => "yyyy-MM-dd",
            DatePattern::SlashMdy => "MM/dd/yyyy",
            DatePattern::SlashYmd => "yyyy/MM/dd",
            DatePattern::ShortMonthName => "dd MMM yyyy",
            DatePattern::LongMonthName => "dd MMMM yyyy",
            DatePattern::DashDmyShort => "dd-MM-yy",
            DatePattern::SlashMdyShort => "MM/dd/yy",
            DatePattern::SlashDmy => "dd/MM/yyyy",
            DatePattern::SlashDmyShort => "dd/MM/yy",
        }
    }

    /// Reverse of [`DatePattern::as_pattern_str`]
    pub fn from_pattern_str(pattern: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_pattern_str() == pattern)
    }

    fn layout(&self) -> (&'static str, [Field; 3]) {
        use Field::*;
        match self {
            DatePattern::CompactYmd => (r"^(\d{4})(\d{2})(\d{2})$", [Year, Month, Day]),
            DatePattern::DashDmy => (r"^(\d{1,2})-(\d{1,2})-(\d{4})$", [Day, Month, Year]),
            DatePattern::DashYmd => (r"^(\d{4})-(\d{1,2})-(\d{1,2})$", [Year, Month, Day]),
            DatePattern::SlashMdy => (r"^(\d{1,2})/(\d{1,2})/(\d{4})$", [Month, Day, Year]),
            DatePattern::SlashYmd => (r"^(\d{4})/(\d{1,2})/(\d{1,2})$", [Year, Month, Day]),
            DatePattern::ShortMonthName => {
                (r"^(\d{1,2})\s+([a-z]{3})\s+(\d{4})$", [Day, MonthName, Year])
            }
            DatePattern::LongMonthName => {
                (r"^(\d{1,2})\s+([a-z]{4,})\s+(\d{4})$", [Day, MonthName, Year])
            }
            DatePattern::DashDmyShort => (r"^(\d{1,2})-(\d{1,2})-(\d{2})$", [Day, Month, ShortYear]),
            DatePattern::SlashMdyShort => {
                (r"^(\d{1,2})/(\d{1,2})/(\d{2})$", [Month, Day, ShortYear])
            }
            DatePattern::SlashDmy => (r"^(\d{1,2})/(\d{1,2})/(\d{4})$", [Day, Month, Year]),
            DatePattern::SlashDmyShort => {
                (r"^(\d{1,2})/(\d{1,2})/(\d{2})$", [Day, Month, ShortYear])
            }
        }
    }

    /// Parse `text` strictly according to this layout.
    ///
    /// Two-digit years land in 2000-2099; month names are case-insensitive.
    pub fn parse(&self, text: &str) -> Result<NaiveDate> {
        let (_, fields) = self.layout();
        let bad = || {
            SarError::malformed_datetime(format!(
                "'{}' does not match {}",
                text,
                self.as_pattern_str()
            ))
        };

        let re = LAYOUT_REGEXES.get(self).ok_or_else(bad)?;
        let lowered = text.trim().to_lowercase();
        let caps = re.captures(&lowered).ok_or_else(bad)?;

        let (mut year, mut month, mut day) = (0i32, 0u32, 0u32);
        for (idx, field) in fields.iter().enumerate() {
            let raw = caps.get(idx + 1).map(|m| m.as_str()).ok_or_else(bad)?;
            match field {
                Field::Day => day = raw.parse().map_err(|_| bad())?,
                Field::Month => month = raw.parse().map_err(|_| bad())?,
                Field::MonthName => {
                    month = Month::from_str(raw).map_err(|_| bad())?.number_from_month()
                }
                Field::Year => year = raw.parse().map_err(|_| bad())?,
                Field::ShortYear => year = 2000 + raw.parse::<i32>().map_err(|_| bad())?,
            }
        }

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(bad)
    }
}

/// Compiled capture expression of every layout
static LAYOUT_REGEXES: Lazy<HashMap<DatePattern, Regex>> = Lazy::new(|| {
    DatePattern::ALL
        .iter()
        .filter_map(|pattern| {
            Regex::new(pattern.layout().0)
                .ok()
                .map(|re| (*pattern, re))
        })
        .collect()
});

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_pattern_str())
    }
}

/// Ordered detection table, first match wins
pub static DATE_FORMAT_TABLE: Lazy<Vec<(Regex, DatePattern)>> = Lazy::new(|| {
    [
        (r"^\d{8}$", DatePattern::CompactYmd),
        (r"^\d{1,2}-\d{1,2}-\d{4}$", DatePattern::DashDmy),
        (r"^\d{4}-\d{1,2}-\d{1,2}$", DatePattern::DashYmd),
        (r"^\d{1,2}/\d{1,2}/\d{4}$", DatePattern::SlashMdy),
        (r"^\d{4}/\d{1,2}/\d{1,2}$", DatePattern::SlashYmd),
        (r"^\d{1,2}\s[a-z]{3}\s\d{4}$", DatePattern::ShortMonthName),
        (r"^\d{1,2}\s[a-z]{4,}\s\d{4}$", DatePattern::LongMonthName),
        (r"^\d{1,2}-\d{1,2}-\d{2}$", DatePattern::DashDmyShort),
        (r"^\d{1,2}/\d{1,2}/\d{2}$", DatePattern::SlashMdyShort),
    ]
    .into_iter()
    .filter_map(|(expr, pattern)| Regex::new(expr).ok().map(|re| (re, pattern)))
    .collect()
});

/// Detect the date layout of `text`, `None` if no table entry matches
pub fn determine_format(text: &str) -> Option<DatePattern> {
    let lowered = text.to_lowercase();
    DATE_FORMAT_TABLE
        .iter()
        .find(|(re, _)| re.is_match(&lowered))
        .map(|(_, pattern)| *pattern)
}

/// How header dates are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormatChoice {
    #[default]
    Automatic,
    Fixed(DatePattern),
}

/// Row time-of-day layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// `HH:mm:ss`, one column
    #[default]
    TwentyFourHour,
    /// `hh:mm:ss a`, spread over two columns
    TwelveHour,
}

static TWELVE_HOUR_PREFIX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\d\d:\d\d:\d\d [AP]M$").ok());

impl TimeFormat {
    /// Number of leading columns a time stamp occupies
    pub fn columns(&self) -> usize {
        match self {
            TimeFormat::TwentyFourHour => 1,
            TimeFormat::TwelveHour => 2,
        }
    }

    pub fn as_pattern_str(&self) -> &'static str {
        match self {
            TimeFormat::TwentyFourHour => "HH:mm:ss",
            TimeFormat::TwelveHour => "hh:mm:ss a",
        }
    }

    /// Guess the layout from the first data row's leading columns
    pub fn detect<S: AsRef<str>>(columns: &[S]) -> TimeFormat {
        if columns.len() >= 2 {
            let joined = format!("{} {}", columns[0].as_ref(), columns[1].as_ref());
            if TWELVE_HOUR_PREFIX
                .as_ref()
                .map_or(false, |re| re.is_match(&joined))
            {
                return TimeFormat::TwelveHour;
            }
        }
        TimeFormat::TwentyFourHour
    }

    /// Parse the leading time column(s) of a row
    pub fn parse<S: AsRef<str>>(&self, columns: &[S]) -> Result<NaiveTime> {
        let first = columns.first().map(|c| c.as_ref()).unwrap_or("");
        match self {
            TimeFormat::TwentyFourHour => NaiveTime::parse_from_str(first, "%H:%M:%S")
                .map_err(|_| SarError::malformed_datetime(format!("'{}' is not HH:mm:ss", first))),
            TimeFormat::TwelveHour => {
                let second = columns.get(1).map(|c| c.as_ref()).unwrap_or("");
                let joined = format!("{} {}", first, second);
                NaiveTime::parse_from_str(&joined, "%I:%M:%S %p").map_err(|_| {
                    SarError::malformed_datetime(format!("'{}' is not hh:mm:ss a", joined))
                })
            }
        }
    }
}

/// A date layout paired with the optional time layout, as set by the Linux preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinuxDateFormat {
    pub date: DateFormatChoice,
    /// `None` means the time layout is detected on the first data row
    pub time: Option<TimeFormat>,
}

impl LinuxDateFormat {
    pub fn is_automatic(&self) -> bool {
        self.date == DateFormatChoice::Automatic
    }
}

impl FromStr for LinuxDateFormat {
    type Err = SarError;

    /// Accepts [`AUTOMATIC_DETECTION`] or `<DATE> <TIME> [AM|PM]` where the
    /// date uses upper case `DD`/`MM`/`YY` placeholders
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == AUTOMATIC_DETECTION {
            return Ok(LinuxDateFormat::default());
        }

        let parts: Vec<&str> = s.splitn(3, ' ').collect();
        let date_part = parts[0].replace("DD", "dd").replace("YY", "yy");
        let pattern = DatePattern::from_pattern_str(&date_part)
            .ok_or_else(|| SarError::config(format!("unsupported date format '{}'", s)))?;

        let time = if parts.len() == 3 && parts[2].contains("AM|PM") {
            TimeFormat::TwelveHour
        } else {
            TimeFormat::TwentyFourHour
        };

        Ok(LinuxDateFormat {
            date: DateFormatChoice::Fixed(pattern),
            time: Some(time),
        })
    }
}

/// A header date as written in the log plus its parsed value
#[derive(Debug, Clone, PartialEq, Eq)]
struct RecordedDate {
    text: String,
    date: NaiveDate,
}

/// Tracks the current report date and the span of dates seen
#[derive(Debug, Clone, Default)]
pub struct DateResolver {
    choice: DateFormatChoice,
    current: Option<NaiveDate>,
    first: Option<RecordedDate>,
    last: Option<RecordedDate>,
}

impl DateResolver {
    pub fn new(choice: DateFormatChoice) -> Self {
        Self {
            choice,
            ..Default::default()
        }
    }

    /// Parse a header date and make it current.
    ///
    /// On failure nothing changes and `false` is returned.
    pub fn record_date(&mut self, text: &str) -> bool {
        let pattern = match self.choice {
            DateFormatChoice::Fixed(p) => Some(p),
            DateFormatChoice::Automatic => determine_format(text),
        };
        let Some(pattern) = pattern else {
            log::error!("Unable to detect date format of '{}'", text);
            return false;
        };

        let date = match pattern.parse(text) {
            Ok(date) => date,
            Err(e) => {
                log::error!("Unable to parse date {}: {}", text, e);
                return false;
            }
        };

        let recorded = RecordedDate {
            text: text.to_string(),
            date,
        };
        self.current = Some(date);
        if self.first.as_ref().map_or(true, |f| date < f.date) {
            self.first = Some(recorded.clone());
        }
        if self.last.as_ref().map_or(true, |l| date > l.date) {
            self.last = Some(recorded);
        }

        log::debug!(
            "Parsed date {} ({}), span {:?} to {:?}",
            date,
            pattern,
            self.start_date(),
            self.end_date()
        );
        true
    }

    pub fn current_date(&self) -> Option<NaiveDate> {
        self.current
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.first.as_ref().map(|r| r.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.last.as_ref().map(|r| r.date)
    }

    /// Earliest header date as written in the log
    pub fn start_date_text(&self) -> Option<&str> {
        self.first.as_ref().map(|r| r.text.as_str())
    }

    pub fn end_date_text(&self) -> Option<&str> {
        self.last.as_ref().map(|r| r.text.as_str())
    }

    /// The single date, or `"<start> to <end>"` in the log's own spelling
    pub fn date_range_text(&self) -> Option<String> {
        match (&self.first, &self.last) {
            (Some(first), Some(last)) if first.date == last.date => Some(first.text.clone()),
            (Some(first), Some(last)) => Some(format!("{} to {}", first.text, last.text)),
            _ => None,
        }
    }

    /// Combine the current date with a row time
    pub fn timestamp(&self, time: NaiveTime) -> Option<NaiveDateTime> {
        self.current.map(|date| date.and_time(time))
    }
}

/// `[start, end]` of all row timestamps seen, only ever widened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

impl TimeWindow {
    pub fn widen(&mut self, timestamp: NaiveDateTime) {
        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                if timestamp < start {
                    self.start = Some(timestamp);
                }
                if timestamp > end {
                    self.end = Some(timestamp);
                }
            }
            _ => {
                self.start = Some(timestamp);
                self.end = Some(timestamp);
            }
        }
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }
}
