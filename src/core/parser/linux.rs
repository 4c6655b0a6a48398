use crate::core::datetime::{DateFormatChoice, LinuxDateFormat, TimeFormat};
use crate::error::{Result, SarError};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{HostInfo, LineMarker, OsPolicy, ParsedHeader};

const SUMMARY_MARKERS: &[&str] = &["Average:", "Summary", "Summary:"];

/// Per-CPU interrupt tables (`CPU i000/s i001/s ...`)
static INTERRUPT_TABLE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"i([0-9]+)/s").ok());

/// Linux sysstat reports
///
/// `Linux 3.10.0-327.el7.x86_64 (host.example.com)  03/28/16  _x86_64_  (48 CPU)`
#[derive(Debug, Clone, Default)]
pub struct LinuxPolicy {
    preference: LinuxDateFormat,
    time_format: Option<TimeFormat>,
}

impl LinuxPolicy {
    pub fn new(preference: LinuxDateFormat) -> Self {
        Self {
            preference,
            time_format: preference.time,
        }
    }
}

impl OsPolicy for LinuxPolicy {
    fn family(&self) -> &'static str {
        "Linux"
    }

    fn parse_header(&mut self, line: &str) -> Result<ParsedHeader> {
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 4 {
            return Err(SarError::malformed_header(format!(
                "expected 'Linux <kernel> (<host>) <date>', got '{}'",
                line.trim()
            )));
        }

        let hostname = columns[2]
            .strip_prefix('(')
            .and_then(|h| h.strip_suffix(')'))
            .unwrap_or(columns[2]);

        let mut host = HostInfo {
            os_type: Some(columns[0].to_string()),
            kernel: Some(columns[1].to_string()),
            hostname: Some(hostname.to_string()),
            ..Default::default()
        };

        // Optional trailer: `_x86_64_  (48 CPU)`
        let rest = &columns[4..];
        for (idx, token) in rest.iter().enumerate() {
            if token.len() > 2 && token.starts_with('_') && token.ends_with('_') {
                host.cpu_type = Some(token.trim_matches('_').to_string());
            } else if let Some(count) = token.strip_prefix('(') {
                if rest.get(idx + 1).map_or(false, |next| next.starts_with("CPU")) {
                    host.cpus = Some(count.to_string());
                }
            }
        }

        Ok(ParsedHeader {
            host,
            date: columns[3].to_string(),
        })
    }

    fn date_format(&self) -> DateFormatChoice {
        self.preference.date
    }

    fn resolve_time_format(&mut self, columns: &[&str]) -> TimeFormat {
        if let Some(format) = self.time_format {
            return format;
        }
        let detected = TimeFormat::detect(columns);
        log::debug!("Time format: {}", detected.as_pattern_str());
        self.time_format = Some(detected);
        detected
    }

    fn line_marker(&self, line: &str, columns: &[&str]) -> Option<LineMarker> {
        match columns.first() {
            Some(first) if SUMMARY_MARKERS.contains(first) => return Some(LineMarker::Summary),
            Some(&"##") => return Some(LineMarker::Ignore),
            _ => {}
        }
        if line.contains("LINUX RESTART") {
            log::debug!("{}", line.trim());
            return Some(LineMarker::Ignore);
        }
        None
    }

    fn filter_line(&self, line: &str, columns: &[&str], first_data_column: usize) -> bool {
        columns.get(first_data_column) == Some(&"CPU")
            && INTERRUPT_TABLE
                .as_ref()
                .map_or(false, |re| re.is_match(line))
    }
}
