use crate::core::datetime::{DateResolver, TimeWindow};
use crate::core::schema::{GraphKind, OsSchema, StatDefinition, IGNORE_GRAPH};
use crate::core::series::{
    ColumnTypes, LineUpdate, MultiInstanceDispatcher, SeriesAggregator, StatHandler,
};
use crate::error::{Result, SarError};
use chrono::{NaiveDateTime, NaiveTime};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::{split_columns, HostInfo, LineMarker, LineOutcome, OsPolicy, ParserState};

/// Per-session parsing state machine shared by all OS families
#[derive(Debug)]
pub struct ParserEngine {
    policy: Box<dyn OsPolicy>,
    schema: Arc<OsSchema>,
    column_types: ColumnTypes,
    /// First token of the header line, a later line starting with it is a header refresh
    header_token: String,
    state: ParserState,
    host: HostInfo,
    dates: DateResolver,
    window: TimeWindow,
    timestamps: BTreeSet<NaiveDateTime>,
    /// Graph name of the stat rows are currently attributed to
    current_stat: Option<String>,
    last_stat: Option<String>,
    last_time: Option<NaiveTime>,
    handlers: HashMap<String, StatHandler>,
    totals: LineUpdate,
}

impl ParserEngine {
    /// Build an engine from the first line of a report
    pub fn new(
        mut policy: Box<dyn OsPolicy>,
        schema: Arc<OsSchema>,
        column_types: ColumnTypes,
        header_line: &str,
    ) -> Result<Self> {
        let header_token = split_columns(header_line)
            .into_iter()
            .find(|c| !c.is_empty())
            .ok_or_else(|| SarError::malformed_header("empty header line"))?
            .to_string();

        let parsed = policy.parse_header(header_line)?;
        let mut dates = DateResolver::new(policy.date_format());
        if !dates.record_date(&parsed.date) {
            return Err(SarError::malformed_header(format!(
                "unreadable date '{}' in '{}'",
                parsed.date,
                header_line.trim()
            )));
        }

        log::debug!(
            "{} parser bound, host {:?}, date {}",
            policy.family(),
            parsed.host.hostname,
            parsed.date
        );

        Ok(Self {
            policy,
            schema,
            column_types,
            header_token,
            state: ParserState::Active,
            host: parsed.host,
            dates,
            window: TimeWindow::default(),
            timestamps: BTreeSet::new(),
            current_stat: None,
            last_stat: None,
            last_time: None,
            handlers: HashMap::new(),
            totals: LineUpdate::default(),
        })
    }

    pub fn family(&self) -> &'static str {
        self.policy.family()
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn host_info(&self) -> &HostInfo {
        &self.host
    }

    pub fn dates(&self) -> &DateResolver {
        &self.dates
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn timestamps(&self) -> &BTreeSet<NaiveDateTime> {
        &self.timestamps
    }

    pub fn current_stat(&self) -> Option<&str> {
        self.current_stat.as_deref()
    }

    pub fn handler(&self, graph: &str) -> Option<&StatHandler> {
        self.handlers.get(graph)
    }

    pub fn handlers(&self) -> &HashMap<String, StatHandler> {
        &self.handlers
    }

    /// Values stored, merged, rejected and failed so far
    pub fn totals(&self) -> LineUpdate {
        self.totals
    }

    /// Feed one non-empty line
    pub fn process_line(&mut self, line: &str) -> LineOutcome {
        let columns = split_columns(line);
        if columns.is_empty() {
            return LineOutcome::Skipped;
        }

        if columns[0] == self.header_token {
            return self.refresh_header(line);
        }

        if let Some(marker) = self.policy.line_marker(line, &columns) {
            if marker == LineMarker::Summary && self.state != ParserState::AverageSkip {
                log::trace!("Summary block starts: {}", line.trim());
                self.state = ParserState::AverageSkip;
            }
            return LineOutcome::Skipped;
        }

        let (timestamp, first_data_column) = match self.resolve_time(&columns) {
            Ok(resolved) => resolved,
            Err(e) => {
                log::trace!("ERR {}: {}", e, line.trim());
                return LineOutcome::Rejected;
            }
        };

        if self.policy.filter_line(line, &columns, first_data_column) {
            // Rows below a filtered header belong to it, not to the previous stat
            self.current_stat = Some(IGNORE_GRAPH.to_string());
            return LineOutcome::Skipped;
        }

        let classified = self
            .schema
            .classify_stat(&columns, first_data_column)
            .cloned();
        if let Some(stat) = classified {
            self.bind_stat(&stat, line, first_data_column);
            return LineOutcome::Consumed;
        }

        self.handle_data_row(timestamp, line)
    }

    fn refresh_header(&mut self, line: &str) -> LineOutcome {
        let parsed = match self.policy.parse_header(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Ignoring header refresh: {}", e);
                return LineOutcome::Rejected;
            }
        };
        if !self.dates.record_date(&parsed.date) {
            return LineOutcome::Rejected;
        }
        log::debug!("Header refresh, date now {}", parsed.date);
        self.host.merge(parsed.host);
        self.state = ParserState::Active;
        LineOutcome::Consumed
    }

    /// Row timestamp and the index of the first column after it
    fn resolve_time(&mut self, columns: &[&str]) -> Result<(NaiveDateTime, usize)> {
        let time_format = self.policy.resolve_time_format(columns);
        match time_format.parse(columns) {
            Ok(time) => {
                let timestamp = self
                    .dates
                    .timestamp(time)
                    .ok_or_else(|| SarError::malformed_datetime("date is missing"))?;
                self.last_time = Some(time);
                self.window.widen(timestamp);
                Ok((timestamp, time_format.columns()))
            }
            Err(e) if self.in_timeless_stat() => {
                // Continuation row of the current block
                let timestamp = self
                    .last_time
                    .and_then(|t| self.dates.timestamp(t))
                    .ok_or(e)?;
                Ok((timestamp, 0))
            }
            Err(e) => Err(e),
        }
    }

    fn in_timeless_stat(&self) -> bool {
        self.current_stat
            .as_deref()
            .map_or(false, |stat| self.policy.timeless_stats().contains(&stat))
    }

    fn bind_stat(&mut self, stat: &StatDefinition, line: &str, first_data_column: usize) {
        let graph_name = stat.graph.clone();

        if !stat.is_ignored() && !self.handlers.contains_key(&graph_name) {
            match self.schema.graph_definition(&graph_name) {
                Some(graph) => {
                    let graph = Arc::new(graph.clone());
                    let title = graph.title.clone();
                    let handler = match graph.kind {
                        GraphKind::Single => StatHandler::Single(SeriesAggregator::new(
                            title,
                            graph,
                            line,
                            first_data_column,
                            stat.duplicate_time,
                            Arc::clone(&self.column_types),
                        )),
                        GraphKind::Multi => StatHandler::Multi(MultiInstanceDispatcher::new(
                            title,
                            graph,
                            line,
                            first_data_column,
                            stat.duplicate_time,
                            Arc::clone(&self.column_types),
                        )),
                    };
                    log::debug!("Bound stat {} to graph {}", stat.name, graph_name);
                    self.handlers.insert(graph_name.clone(), handler);
                }
                None => log::debug!("Stat {} has no graph {}", stat.name, graph_name),
            }
        }

        self.current_stat = Some(graph_name);
    }

    fn handle_data_row(&mut self, timestamp: NaiveDateTime, line: &str) -> LineOutcome {
        if self.last_stat != self.current_stat {
            log::debug!(
                "Stat change from {} to {}",
                self.last_stat.as_deref().unwrap_or("NONE"),
                self.current_stat.as_deref().unwrap_or("NONE")
            );
            self.last_stat = self.current_stat.clone();
            // Only a different stat (or a header refresh) ends a summary block.
            // Re-announcing the same stat stays in AverageSkip.
            if self.state == ParserState::AverageSkip {
                self.state = ParserState::Active;
            }
        }

        let Some(stat) = self.current_stat.as_deref() else {
            log::trace!("ERR no stat yet: {}", line.trim());
            return LineOutcome::Rejected;
        };
        if stat == IGNORE_GRAPH {
            return LineOutcome::Skipped;
        }
        if self.state == ParserState::AverageSkip {
            return LineOutcome::Skipped;
        }

        let Some(handler) = self.handlers.get_mut(stat) else {
            log::trace!("ERR {}: {}", SarError::unknown_stat(stat), line.trim());
            return LineOutcome::Rejected;
        };

        self.timestamps.insert(timestamp);
        let update = handler.parse_line(timestamp, line);
        self.totals.absorb(update);
        LineOutcome::Consumed
    }
}
