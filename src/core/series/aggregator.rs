use crate::core::parser::split_columns;
use crate::core::schema::{ColumnType, GraphDefinition, PlotGroup};
use crate::error::SarError;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;

use super::timeseries::{DuplicatePolicy, InsertOutcome, TimeSeries};

/// Column type table shared by every aggregator of a session
pub type ColumnTypes = Arc<HashMap<String, ColumnType>>;

/// Per-line tally of what an aggregator did with the values it was given
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineUpdate {
    pub stored: usize,
    pub merged: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl LineUpdate {
    pub fn absorb(&mut self, other: LineUpdate) {
        self.stored += other.stored;
        self.merged += other.merged;
        self.rejected += other.rejected;
        self.failed += other.failed;
    }

    fn record(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted => self.stored += 1,
            InsertOutcome::Merged(_) => self.merged += 1,
            InsertOutcome::Rejected => self.rejected += 1,
        }
    }
}

/// Series for one stacked plot group, one per member column
#[derive(Debug, Clone)]
pub struct StackedDataset {
    group: PlotGroup,
    series: Vec<TimeSeries>,
}

impl StackedDataset {
    fn new(group: &PlotGroup) -> Self {
        Self {
            series: group.columns.iter().map(TimeSeries::new).collect(),
            group: group.clone(),
        }
    }

    pub fn group(&self) -> &PlotGroup {
        &self.group
    }

    pub fn series(&self) -> &[TimeSeries] {
        &self.series
    }

    fn series_mut(&mut self, column: &str) -> Option<&mut TimeSeries> {
        self.series.iter_mut().find(|s| s.name() == column)
    }
}

/// Time series for every data column of one stat (or one instance of a
/// multi-instance stat)
#[derive(Debug, Clone)]
pub struct SeriesAggregator {
    title: String,
    graph: Arc<GraphDefinition>,
    headers: Vec<String>,
    first_data_column: usize,
    series: Vec<TimeSeries>,
    stacks: Vec<StackedDataset>,
    /// column name -> indexes into `stacks`
    stacks_by_column: HashMap<String, Vec<usize>>,
    allow_duplicates: bool,
    column_types: ColumnTypes,
}

impl SeriesAggregator {
    /// Bind to the columns of `header_line` starting at `first_data_column`
    pub fn new<S: Into<String>>(
        title: S,
        graph: Arc<GraphDefinition>,
        header_line: &str,
        first_data_column: usize,
        allow_duplicates: bool,
        column_types: ColumnTypes,
    ) -> Self {
        let headers: Vec<String> = split_columns(header_line)
            .into_iter()
            .map(str::to_string)
            .collect();

        let series = headers
            .iter()
            .skip(first_data_column)
            .map(TimeSeries::new)
            .collect();

        let mut stacks = Vec::new();
        let mut stacks_by_column: HashMap<String, Vec<usize>> = HashMap::new();
        for group in graph.stacked_groups() {
            let idx = stacks.len();
            stacks.push(StackedDataset::new(group));
            for column in &group.columns {
                stacks_by_column.entry(column.clone()).or_default().push(idx);
            }
        }

        Self {
            title: title.into(),
            graph,
            headers,
            first_data_column,
            series,
            stacks,
            stacks_by_column,
            allow_duplicates,
            column_types,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn graph(&self) -> &GraphDefinition {
        &self.graph
    }

    /// Data column names in header order
    pub fn columns(&self) -> &[String] {
        self.headers.get(self.first_data_column..).unwrap_or(&[])
    }

    pub fn first_data_column(&self) -> usize {
        self.first_data_column
    }

    pub fn series(&self) -> &[TimeSeries] {
        &self.series
    }

    pub fn series_for(&self, column: &str) -> Option<&TimeSeries> {
        self.series.iter().find(|s| s.name() == column)
    }

    pub fn stacks(&self) -> &[StackedDataset] {
        &self.stacks
    }

    /// Number of stored points across all column series
    pub fn sample_count(&self) -> usize {
        self.series.iter().map(TimeSeries::len).sum()
    }

    fn policy_for(&self, column: &str) -> DuplicatePolicy {
        if self.allow_duplicates {
            DuplicatePolicy::Merge(self.column_types.get(column).copied())
        } else {
            DuplicatePolicy::Reject
        }
    }

    /// Store every data column of a raw row at `timestamp`.
    ///
    /// A missing or non-numeric value only skips its own column.
    pub fn parse_line(&mut self, timestamp: NaiveDateTime, line: &str) -> LineUpdate {
        let cols = split_columns(line);
        let mut update = LineUpdate::default();

        for i in self.first_data_column..self.headers.len() {
            let column = self.headers[i].clone();
            let value = match cols.get(i) {
                None => Err(SarError::column(&column, format!("missing in '{}'", line.trim()))),
                Some(raw) => raw
                    .parse::<f64>()
                    .map_err(|_| SarError::column(&column, format!("{} is NaN", raw))),
            };

            match value {
                Ok(value) => update.absorb(self.add_point(&column, timestamp, value)),
                Err(e) => {
                    log::warn!("{}: {}", self.title, e);
                    update.failed += 1;
                }
            }
        }

        update
    }

    /// Insert one value into the column's series and into every stacked
    /// dataset that contains the column
    pub fn add_point(&mut self, column: &str, timestamp: NaiveDateTime, value: f64) -> LineUpdate {
        let policy = self.policy_for(column);
        let mut update = LineUpdate::default();

        let Some(series) = self.series.iter_mut().find(|s| s.name() == column) else {
            log::warn!(
                "{}: {}",
                self.title,
                SarError::column(column, "not a column of this graph")
            );
            update.failed += 1;
            return update;
        };

        let outcome = series.insert(timestamp, value, policy);
        if outcome == InsertOutcome::Rejected {
            log::trace!(
                "{}: {}",
                self.title,
                SarError::DuplicateTimestampUnmergeable {
                    column: column.to_string(),
                    timestamp,
                }
            );
        }
        update.record(outcome);

        if let Some(indexes) = self.stacks_by_column.get(column) {
            for &idx in indexes {
                if let Some(stacked) = self.stacks[idx].series_mut(column) {
                    stacked.insert(timestamp, value, policy);
                }
            }
        }

        update
    }
}
