//! Line parsing for sar-style reports
//!
//! A single [`ParserEngine`] drives every OS family. What differs between
//! families (header layout, date layout, time columns, marker lines and the
//! stats whose rows carry no time) is supplied by an [`OsPolicy`].

pub mod aix;
pub mod engine;
pub mod hpux;
pub mod linux;
pub mod registry;
pub mod sunos;

pub use engine::ParserEngine;
pub use registry::{FamilyRegistry, ParserOptions};

use crate::core::datetime::{DateFormatChoice, TimeFormat};
use crate::error::Result;
use serde::Serialize;
use std::fmt;

/// Split a line on whitespace runs.
///
/// A line that starts with whitespace keeps a leading empty column so that
/// continuation rows stay aligned with the header they belong to.
pub fn split_columns(line: &str) -> Vec<&str> {
    let mut columns = Vec::new();
    if line.starts_with(char::is_whitespace) {
        columns.push("");
    }
    columns.extend(line.split_whitespace());
    columns
}

/// Per-line result of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineOutcome {
    Consumed,
    Skipped,
    Rejected,
}

impl LineOutcome {
    /// Numeric form: 0 consumed, 1 skipped, -1 rejected
    pub fn code(self) -> i32 {
        match self {
            LineOutcome::Consumed => 0,
            LineOutcome::Skipped => 1,
            LineOutcome::Rejected => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParserState {
    AwaitingHeader,
    Active,
    /// Summary block in progress, rows are ignored until the stat changes
    AverageSkip,
}

/// Lines a family recognises before any time parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMarker {
    /// Start of a summary (average) block
    Summary,
    /// Restart notices, configuration banners, comments
    Ignore,
}

/// Machine description assembled from report headers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostInfo {
    pub os_type: Option<String>,
    pub hostname: Option<String>,
    pub os_version: Option<String>,
    pub kernel: Option<String>,
    pub cpu_type: Option<String>,
    pub mac_address: Option<String>,
    pub memory: Option<String>,
    pub disks: Option<String>,
    pub cpus: Option<String>,
    pub entitlement: Option<String>,
}

impl HostInfo {
    /// Overwrite every field that `other` knows about
    pub fn merge(&mut self, other: HostInfo) {
        fn take(dst: &mut Option<String>, src: Option<String>) {
            if src.is_some() {
                *dst = src;
            }
        }
        take(&mut self.os_type, other.os_type);
        take(&mut self.hostname, other.hostname);
        take(&mut self.os_version, other.os_version);
        take(&mut self.kernel, other.kernel);
        take(&mut self.cpu_type, other.cpu_type);
        take(&mut self.mac_address, other.mac_address);
        take(&mut self.memory, other.memory);
        take(&mut self.disks, other.disks);
        take(&mut self.cpus, other.cpus);
        take(&mut self.entitlement, other.entitlement);
    }

    /// Labelled `(name, value)` pairs for the fields that are set
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("OS Type", &self.os_type),
            ("OS Version", &self.os_version),
            ("Kernel Release", &self.kernel),
            ("CPU Type", &self.cpu_type),
            ("Hostname", &self.hostname),
            ("Mac Address", &self.mac_address),
            ("Memory", &self.memory),
            ("Number of disks", &self.disks),
            ("Number of CPU", &self.cpus),
            ("Ent", &self.entitlement),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }
}

/// Result of parsing a header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    pub host: HostInfo,
    /// Report date exactly as written
    pub date: String,
}

/// Family-specific behaviour plugged into the [`ParserEngine`]
pub trait OsPolicy: fmt::Debug + Send {
    /// Schema system name
    fn family(&self) -> &'static str;

    fn parse_header(&mut self, line: &str) -> Result<ParsedHeader>;

    /// How header dates are read
    fn date_format(&self) -> DateFormatChoice;

    /// Time layout for a row; may settle on a layout the first time it is asked
    fn resolve_time_format(&mut self, columns: &[&str]) -> TimeFormat;

    fn line_marker(&self, line: &str, columns: &[&str]) -> Option<LineMarker>;

    /// Extra rows the family wants skipped after the time was read
    fn filter_line(&self, _line: &str, _columns: &[&str], _first_data_column: usize) -> bool {
        false
    }

    /// Graphs whose continuation rows carry no time column
    fn timeless_stats(&self) -> &'static [&'static str] {
        &[]
    }
}

const UNIX_IGNORED_FRAGMENTS: &[&str] = &[
    "unix restarts",
    " unix restarted",
    "System Configuration",
    "System configuration",
    "State change",
];

/// Marker rules shared by HP-UX, SunOS and AIX
pub(crate) fn unix_line_marker(line: &str, columns: &[&str]) -> Option<LineMarker> {
    if columns.first() == Some(&"Average") {
        return Some(LineMarker::Summary);
    }
    if UNIX_IGNORED_FRAGMENTS.iter().any(|f| line.contains(f)) {
        return Some(LineMarker::Ignore);
    }
    None
}
