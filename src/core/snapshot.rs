use crate::core::datetime::TimeWindow;
use crate::core::parser::{HostInfo, ParserEngine};
use crate::core::schema::GraphKind;
use crate::core::series::{SeriesAggregator, StatHandler};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Frozen, serializable copy of a session's results
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub family: Option<String>,
    pub host: HostInfo,
    pub date_range: Option<String>,
    pub window: TimeWindow,
    pub timestamps: Vec<NaiveDateTime>,
    pub stats: Vec<StatSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatSnapshot {
    pub graph: String,
    pub title: String,
    pub kind: GraphKind,
    pub instances: Vec<InstanceSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstanceSnapshot {
    /// `None` for single graphs
    pub key: Option<String>,
    pub title: String,
    pub series: Vec<SeriesSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesSnapshot {
    pub column: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

impl SessionSnapshot {
    pub fn capture(engine: &ParserEngine) -> Self {
        let mut stats: Vec<StatSnapshot> = engine
            .handlers()
            .iter()
            .map(|(graph, handler)| StatSnapshot::capture(graph, handler))
            .collect();
        stats.sort_by(|a, b| a.graph.cmp(&b.graph));

        Self {
            family: Some(engine.family().to_string()),
            host: engine.host_info().clone(),
            date_range: engine.dates().date_range_text(),
            window: engine.window(),
            timestamps: engine.timestamps().iter().copied().collect(),
            stats,
        }
    }

    /// Keep only the named graph
    pub fn retain_stat(&mut self, graph: &str) {
        self.stats.retain(|s| s.graph == graph);
    }

    pub fn stat(&self, graph: &str) -> Option<&StatSnapshot> {
        self.stats.iter().find(|s| s.graph == graph)
    }
}

impl StatSnapshot {
    fn capture(graph: &str, handler: &StatHandler) -> Self {
        let instances = match handler {
            StatHandler::Single(agg) => vec![InstanceSnapshot::capture(None, agg)],
            StatHandler::Multi(dispatcher) => dispatcher
                .instances()
                .map(|(key, agg)| InstanceSnapshot::capture(Some(key), agg))
                .collect(),
        };
        Self {
            graph: graph.to_string(),
            title: handler.title().to_string(),
            kind: handler.graph().kind,
            instances,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.instances
            .iter()
            .flat_map(|i| i.series.iter())
            .map(|s| s.points.len())
            .sum()
    }
}

impl InstanceSnapshot {
    fn capture(key: Option<&str>, agg: &SeriesAggregator) -> Self {
        Self {
            key: key.map(str::to_string),
            title: agg.title().to_string(),
            series: agg
                .series()
                .iter()
                .map(|ts| SeriesSnapshot {
                    column: ts.name().to_string(),
                    points: ts.iter().map(|(t, v)| (*t, *v)).collect(),
                })
                .collect(),
        }
    }
}
