use crate::core::parser::split_columns;
use crate::core::schema::GraphDefinition;
use crate::error::SarError;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::aggregator::{ColumnTypes, LineUpdate, SeriesAggregator};
use super::natural::InstanceKey;

/// One aggregator per instance key (CPU number, device, interface, ...),
/// iterated in natural key order
#[derive(Debug, Clone)]
pub struct MultiInstanceDispatcher {
    title: String,
    graph: Arc<GraphDefinition>,
    header_line: String,
    first_data_column: usize,
    allow_duplicates: bool,
    column_types: ColumnTypes,
    instances: BTreeMap<InstanceKey, SeriesAggregator>,
}

impl MultiInstanceDispatcher {
    /// `first_data_column` points at the instance key column of `header_line`
    pub fn new<S: Into<String>>(
        title: S,
        graph: Arc<GraphDefinition>,
        header_line: &str,
        first_data_column: usize,
        allow_duplicates: bool,
        column_types: ColumnTypes,
    ) -> Self {
        Self {
            title: title.into(),
            graph,
            header_line: header_line.to_string(),
            first_data_column,
            allow_duplicates,
            column_types,
            instances: BTreeMap::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn graph(&self) -> &GraphDefinition {
        &self.graph
    }

    /// Route a raw row to the aggregator of its instance, creating it on first sight
    pub fn parse_line(&mut self, timestamp: NaiveDateTime, line: &str) -> LineUpdate {
        let cols = split_columns(line);
        let Some(key) = cols.get(self.first_data_column) else {
            log::warn!(
                "{}: {}",
                self.title,
                SarError::column("instance", format!("missing in '{}'", line.trim()))
            );
            return LineUpdate {
                failed: 1,
                ..Default::default()
            };
        };

        let key = InstanceKey::new(*key);
        if !self.instances.contains_key(&key) {
            log::debug!("{}: new instance '{}'", self.title, key);
            let aggregator = SeriesAggregator::new(
                format!("{} {}", self.title, key),
                Arc::clone(&self.graph),
                &self.header_line,
                self.first_data_column + 1,
                self.allow_duplicates,
                Arc::clone(&self.column_types),
            );
            self.instances.insert(key.clone(), aggregator);
        }

        match self.instances.get_mut(&key) {
            Some(aggregator) => aggregator.parse_line(timestamp, line),
            None => LineUpdate::default(),
        }
    }

    pub fn instance(&self, key: &str) -> Option<&SeriesAggregator> {
        self.instances.get(&InstanceKey::new(key))
    }

    /// Instance keys in natural order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(InstanceKey::as_str)
    }

    pub fn instances(&self) -> impl Iterator<Item = (&str, &SeriesAggregator)> {
        self.instances.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn sample_count(&self) -> usize {
        self.instances.values().map(SeriesAggregator::sample_count).sum()
    }
}
