use crate::core::datetime::{DateFormatChoice, DatePattern, TimeFormat};
use crate::error::{Result, SarError};

use super::{unix_line_marker, HostInfo, LineMarker, OsPolicy, ParsedHeader};

/// HP-UX reports
///
/// `HP-UX host.example.com B.11.31 U ia64    03/21/18`
#[derive(Debug, Clone, Default)]
pub struct HpuxPolicy;

impl OsPolicy for HpuxPolicy {
    fn family(&self) -> &'static str {
        "HPUX"
    }

    fn parse_header(&mut self, line: &str) -> Result<ParsedHeader> {
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 6 {
            return Err(SarError::malformed_header(format!(
                "expected 'HP-UX <host> <version> <kernel> <cpu> <date>', got '{}'",
                line.trim()
            )));
        }

        Ok(ParsedHeader {
            host: HostInfo {
                os_type: Some(columns[0].to_string()),
                hostname: Some(columns[1].to_string()),
                os_version: Some(columns[2].to_string()),
                kernel: Some(columns[3].to_string()),
                cpu_type: Some(columns[4].to_string()),
                ..Default::default()
            },
            date: columns[5].to_string(),
        })
    }

    fn date_format(&self) -> DateFormatChoice {
        DateFormatChoice::Fixed(DatePattern::SlashMdyShort)
    }

    fn resolve_time_format(&mut self, _columns: &[&str]) -> TimeFormat {
        TimeFormat::TwentyFourHour
    }

    fn line_marker(&self, line: &str, columns: &[&str]) -> Option<LineMarker> {
        unix_line_marker(line, columns)
    }

    fn timeless_stats(&self) -> &'static [&'static str] {
        &["DEVICE", "CPU"]
    }
}
