use crate::core::datetime::{DateFormatChoice, DatePattern, TimeFormat};
use crate::error::{Result, SarError};

use super::{unix_line_marker, HostInfo, LineMarker, OsPolicy, ParsedHeader};

/// AIX reports
///
/// `AIX host 1 7 00F84C0C4C00    06/12/17`
#[derive(Debug, Clone, Default)]
pub struct AixPolicy;

impl OsPolicy for AixPolicy {
    fn family(&self) -> &'static str {
        "AIX"
    }

    fn parse_header(&mut self, line: &str) -> Result<ParsedHeader> {
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 6 {
            return Err(SarError::malformed_header(format!(
                "expected 'AIX <host> <version> <release> <machine id> <date>', got '{}'",
                line.trim()
            )));
        }

        Ok(ParsedHeader {
            host: HostInfo {
                os_type: Some(columns[0].to_string()),
                hostname: Some(columns[1].to_string()),
                os_version: Some(format!("{}.{}", columns[2], columns[3])),
                mac_address: Some(columns[4].to_string()),
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
        &["DEVICE", "CPUS", "CPUSLPAR"]
    }
}
