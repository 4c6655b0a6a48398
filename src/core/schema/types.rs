use serde::{Deserialize, Serialize};

/// Graph name used by stats whose rows are recognised but never charted
pub const IGNORE_GRAPH: &str = "IGNORE";

/// Whether a graph holds one set of series or one set per instance (CPU, disk, ...)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    #[default]
    #[serde(alias = "unique")]
    Single,
    #[serde(alias = "multiple")]
    Multi,
}

/// Declared merge behaviour of a column when two values share a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Instantaneous level, duplicates are averaged
    Gauge,
    /// Accumulating quantity, duplicates are summed
    Counter,
}

impl ColumnType {
    /// Resolve a duplicate value according to the column type
    pub fn merge(self, old: f64, new: f64) -> f64 {
        match self {
            ColumnType::Gauge => (old + new) / 2.0,
            ColumnType::Counter => old + new,
        }
    }
}

/// Axis scaling base carried for renderers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum AxisBase {
    #[default]
    Plain,
    /// SI multiples (K, M, G)
    Si,
    /// IEC binary multiples (Ki, Mi, Gi)
    Iec,
}

impl TryFrom<u32> for AxisBase {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AxisBase::Plain),
            1000 => Ok(AxisBase::Si),
            1024 => Ok(AxisBase::Iec),
            other => Err(format!("unsupported axis base {} (expected 0, 1000 or 1024)", other)),
        }
    }
}

impl From<AxisBase> for u32 {
    fn from(base: AxisBase) -> u32 {
        match base {
            AxisBase::Plain => 0,
            AxisBase::Si => 1000,
            AxisBase::Iec => 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

fn default_size() -> u32 {
    1
}

/// A named subset of columns charted together on one axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotGroup {
    pub title: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub stacked: bool,
    #[serde(default)]
    pub base: AxisBase,
    #[serde(default)]
    pub factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<ValueRange>,
    /// Relative height of the plot in the combined chart
    #[serde(default = "default_size")]
    pub size: u32,
}

impl PlotGroup {
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// A category of report rows identified by its header signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDefinition {
    pub name: String,
    /// Space-joined data columns of the header line
    pub header: String,
    pub graph: String,
    #[serde(default)]
    pub duplicate_time: bool,
}

impl StatDefinition {
    /// Header text normalised to single spaces, the classification key
    pub fn signature(&self) -> String {
        self.header.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn is_ignored(&self) -> bool {
        self.graph == IGNORE_GRAPH
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub kind: GraphKind,
    #[serde(default)]
    pub groups: Vec<PlotGroup>,
}

impl GraphDefinition {
    /// Stacked groups only, in declaration order
    pub fn stacked_groups(&self) -> impl Iterator<Item = &PlotGroup> {
        self.groups.iter().filter(|g| g.stacked)
    }

    /// Axis scaling of the first group, stacked or not, holding `column`
    pub fn axis_for(&self, column: &str) -> (AxisBase, f64) {
        self.groups
            .iter()
            .find(|g| g.contains(column))
            .map_or((AxisBase::Plain, 0.0), |g| (g.base, g.factor))
    }
}
