// Stat / graph schema definitions

pub mod registry;
pub mod types;

pub use registry::{OsSchema, SchemaRegistry};
pub use types::{
    AxisBase, ColumnType, GraphDefinition, GraphKind, PlotGroup, StatDefinition, ValueRange,
    IGNORE_GRAPH,
};
