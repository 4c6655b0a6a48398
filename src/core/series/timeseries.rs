use crate::core::schema::ColumnType;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// What happened to a value handed to [`TimeSeries::insert`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsertOutcome {
    /// First value at this timestamp
    Inserted,
    /// Combined with the existing value, carries the stored result
    Merged(f64),
    /// Existing value kept
    Rejected,
}

/// How a series treats a second value at an already-populated timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    Reject,
    /// Merge by column type, or keep the original when the column has no type
    Merge(Option<ColumnType>),
}

/// Values of one column keyed by timestamp, at most one value per timestamp
#[derive(Debug, Clone)]
pub struct TimeSeries {
    name: String,
    points: BTreeMap<NaiveDateTime, f64>,
}

impl TimeSeries {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            points: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(
        &mut self,
        timestamp: NaiveDateTime,
        value: f64,
        policy: DuplicatePolicy,
    ) -> InsertOutcome {
        let Some(existing) = self.points.get_mut(&timestamp) else {
            self.points.insert(timestamp, value);
            return InsertOutcome::Inserted;
        };

        match policy {
            DuplicatePolicy::Merge(Some(column_type)) => {
                *existing = column_type.merge(*existing, value);
                InsertOutcome::Merged(*existing)
            }
            DuplicatePolicy::Merge(None) | DuplicatePolicy::Reject => InsertOutcome::Rejected,
        }
    }

    pub fn get(&self, timestamp: &NaiveDateTime) -> Option<f64> {
        self.points.get(timestamp).copied()
    }

    /// Points in timestamp order
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDateTime, &f64)> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.points.keys().next().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.points.keys().next_back().copied()
    }

    /// Smallest and largest value, `None` when empty
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.points.values().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
