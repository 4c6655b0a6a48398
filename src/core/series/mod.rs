// Time-series storage and per-instance dispatch

pub mod aggregator;
pub mod dispatcher;
pub mod natural;
pub mod timeseries;

pub use aggregator::{ColumnTypes, LineUpdate, SeriesAggregator, StackedDataset};
pub use dispatcher::MultiInstanceDispatcher;
pub use natural::{instance_cmp, natural_cmp, InstanceKey};
pub use timeseries::{DuplicatePolicy, InsertOutcome, TimeSeries};

use crate::core::schema::GraphDefinition;
use chrono::NaiveDateTime;

/// Data handler bound to a stat, resolved once when the stat is first seen
#[derive(Debug, Clone)]
pub enum StatHandler {
    Single(SeriesAggregator),
    Multi(MultiInstanceDispatcher),
}

impl StatHandler {
    pub fn parse_line(&mut self, timestamp: NaiveDateTime, line: &str) -> LineUpdate {
        match self {
            StatHandler::Single(agg) => agg.parse_line(timestamp, line),
            StatHandler::Multi(dispatcher) => dispatcher.parse_line(timestamp, line),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            StatHandler::Single(agg) => agg.title(),
            StatHandler::Multi(dispatcher) => dispatcher.title(),
        }
    }

    pub fn graph(&self) -> &GraphDefinition {
        match self {
            StatHandler::Single(agg) => agg.graph(),
            StatHandler::Multi(dispatcher) => dispatcher.graph(),
        }
    }

    pub fn sample_count(&self) -> usize {
        match self {
            StatHandler::Single(agg) => agg.sample_count(),
            StatHandler::Multi(dispatcher) => dispatcher.sample_count(),
        }
    }

    pub fn as_single(&self) -> Option<&SeriesAggregator> {
        match self {
            StatHandler::Single(agg) => Some(agg),
            StatHandler::Multi(_) => None,
        }
    }

    pub fn as_multi(&self) -> Option<&MultiInstanceDispatcher> {
        match self {
            StatHandler::Multi(dispatcher) => Some(dispatcher),
            StatHandler::Single(_) => None,
        }
    }
}
