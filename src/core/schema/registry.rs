//! Schema registry: per-OS stat and graph definitions
//!
//! The registry is built once at startup from the bundled document plus an
//! optional user overlay, then shared read-only (behind an `Arc`) with every
//! parsing session. Each [`OsSchema`] keeps a reverse index from header
//! signature to stat name so that classifying a line is a single hash lookup.
//! The index is rebuilt whenever the schema is mutated, so a reload never
//! leaves stale mappings behind.

use crate::error::{Result, SarError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::types::{ColumnType, GraphDefinition, StatDefinition};

const BUNDLED_SCHEMA: &str = include_str!("default_schema.json");

/// Definitions for one OS family
#[derive(Debug, Clone, Default)]
pub struct OsSchema {
    name: String,
    stats: HashMap<String, StatDefinition>,
    graphs: HashMap<String, GraphDefinition>,
    /// header signature -> stat name
    header_index: HashMap<String, String>,
    /// graph name -> stat name
    graph_index: HashMap<String, String>,
}

impl OsSchema {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register or replace a stat definition
    pub fn add_stat(&mut self, stat: StatDefinition) {
        self.stats.insert(stat.name.clone(), stat);
        self.rebuild_index();
    }

    /// Register or replace a graph definition
    pub fn add_graph(&mut self, graph: GraphDefinition) {
        self.graphs.insert(graph.name.clone(), graph);
    }

    fn rebuild_index(&mut self) {
        self.header_index.clear();
        self.graph_index.clear();

        let mut names: Vec<&String> = self.stats.keys().collect();
        names.sort();
        for name in names {
            let stat = &self.stats[name];
            self.header_index
                .entry(stat.signature())
                .or_insert_with(|| name.clone());
            // Several header variants may feed one graph, the first by name wins
            self.graph_index
                .entry(stat.graph.clone())
                .or_insert_with(|| name.clone());
        }
    }

    /// Classify a line by the header signature formed from `columns[first_data_column..]`.
    ///
    /// Returns the graph name bound to the matched stat, or `None` when the
    /// line is an ordinary data row.
    pub fn classify<S: AsRef<str>>(&self, columns: &[S], first_data_column: usize) -> Option<&str> {
        self.classify_stat(columns, first_data_column)
            .map(|stat| stat.graph.as_str())
    }

    /// Same lookup as [`OsSchema::classify`], returning the whole stat definition
    pub fn classify_stat<S: AsRef<str>>(
        &self,
        columns: &[S],
        first_data_column: usize,
    ) -> Option<&StatDefinition> {
        if first_data_column > columns.len() {
            return None;
        }
        let signature = columns[first_data_column..]
            .iter()
            .map(|c| c.as_ref())
            .collect::<Vec<_>>()
            .join(" ");

        let stat_name = self.header_index.get(&signature)?;
        self.stats.get(stat_name)
    }

    /// Look up a stat by its own name
    pub fn stat_definition(&self, name: &str) -> Option<&StatDefinition> {
        self.stats.get(name)
    }

    /// Look up the stat bound to a graph name (the name sessions track)
    pub fn stat_for_graph(&self, graph: &str) -> Option<&StatDefinition> {
        self.graph_index
            .get(graph)
            .and_then(|stat_name| self.stats.get(stat_name))
    }

    pub fn graph_definition(&self, name: &str) -> Option<&GraphDefinition> {
        self.graphs.get(name)
    }

    /// Stats sorted by name
    pub fn stats(&self) -> Vec<&StatDefinition> {
        let mut stats: Vec<_> = self.stats.values().collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }

    /// Graphs sorted by name
    pub fn graphs(&self) -> Vec<&GraphDefinition> {
        let mut graphs: Vec<_> = self.graphs.values().collect();
        graphs.sort_by(|a, b| a.name.cmp(&b.name));
        graphs
    }
}

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    columns: HashMap<String, ColumnType>,
    #[serde(default)]
    systems: Vec<SystemDocument>,
}

#[derive(Debug, Deserialize)]
struct SystemDocument {
    name: String,
    #[serde(default)]
    stats: Vec<StatDefinition>,
    #[serde(default)]
    graphs: Vec<GraphDefinition>,
}

/// All loaded OS schemas plus the global column type table
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    systems: HashMap<String, Arc<OsSchema>>,
    column_types: Arc<HashMap<String, ColumnType>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry loaded with the definitions shipped in the binary
    pub fn bundled() -> Result<Self> {
        let mut registry = Self::new();
        registry.load_schema(BUNDLED_SCHEMA)?;
        Ok(registry)
    }

    /// Merge a schema document into the registry.
    ///
    /// Systems are created on first mention; stats, graphs and column types
    /// replace existing entries with the same name.
    pub fn load_schema(&mut self, document: &str) -> Result<()> {
        let doc: SchemaDocument = serde_json::from_str(document)
            .map_err(|e| SarError::schema(format!("invalid schema document: {}", e)))?;

        for system in doc.systems {
            validate_system(&system)?;

            let entry = self
                .systems
                .entry(system.name.clone())
                .or_insert_with(|| Arc::new(OsSchema::new(system.name.clone())));
            let os = Arc::make_mut(entry);

            for graph in system.graphs {
                os.add_graph(graph);
            }
            for stat in system.stats {
                os.add_stat(stat);
            }
            log::debug!(
                "Schema for {}: {} stats, {} graphs",
                os.name(),
                os.stats.len(),
                os.graphs.len()
            );
        }

        if !doc.columns.is_empty() {
            Arc::make_mut(&mut self.column_types).extend(doc.columns);
        }

        Ok(())
    }

    /// Load an overlay document from disk
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        self.load_schema(&content)
            .map_err(|e| SarError::schema(format!("{}: {}", path.display(), e)))
    }

    /// Shared handle to one OS schema
    pub fn system(&self, name: &str) -> Option<Arc<OsSchema>> {
        self.systems.get(name).cloned()
    }

    pub fn system_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.systems.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Classify against one OS schema
    pub fn classify<S: AsRef<str>>(
        &self,
        os: &str,
        columns: &[S],
        first_data_column: usize,
    ) -> Option<&str> {
        self.systems
            .get(os)
            .and_then(|schema| schema.classify(columns, first_data_column))
    }

    pub fn stat_definition(&self, os: &str, name: &str) -> Option<&StatDefinition> {
        self.systems.get(os).and_then(|s| s.stat_definition(name))
    }

    pub fn graph_definition(&self, os: &str, name: &str) -> Option<&GraphDefinition> {
        self.systems.get(os).and_then(|s| s.graph_definition(name))
    }

    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.column_types.get(column).copied()
    }

    /// Shared handle to the column type table
    pub fn column_types(&self) -> Arc<HashMap<String, ColumnType>> {
        Arc::clone(&self.column_types)
    }
}

fn validate_system(system: &SystemDocument) -> Result<()> {
    if system.name.trim().is_empty() {
        return Err(SarError::schema("system without a name"));
    }
    for stat in &system.stats {
        if stat.header.trim().is_empty() {
            return Err(SarError::schema(format!(
                "{}: stat {} has an empty header",
                system.name, stat.name
            )));
        }
    }
    Ok(())
}
