use chrono::NaiveDateTime;
use std::io;
use thiserror::Error;

/// Error taxonomy for sar log ingestion
#[derive(Error, Debug)]
pub enum SarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unrecognized source: no parser registered for '{0}'")]
    UnrecognizedSource(String),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Malformed date/time: {0}")]
    MalformedDateTime(String),

    #[error("Missing or non-numeric value for column {column}: {detail}")]
    MissingOrNonNumericColumn { column: String, detail: String },

    #[error("Unknown stat: {0} has no data handler")]
    UnknownStat(String),

    #[error("Duplicate timestamp {timestamp} for column {column} cannot be merged")]
    DuplicateTimestampUnmergeable {
        column: String,
        timestamp: NaiveDateTime,
    },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("A parsing job is already running on this session")]
    AlreadyParsing,
}

/// Result type alias for sargraph
pub type Result<T> = std::result::Result<T, SarError>;

impl SarError {
    /// Create an unrecognized source error
    pub fn unrecognized_source<S: Into<String>>(token: S) -> Self {
        SarError::UnrecognizedSource(token.into())
    }

    /// Create a malformed header error
    pub fn malformed_header<S: Into<String>>(msg: S) -> Self {
        SarError::MalformedHeader(msg.into())
    }

    /// Create a malformed date/time error
    pub fn malformed_datetime<S: Into<String>>(msg: S) -> Self {
        SarError::MalformedDateTime(msg.into())
    }

    pub fn column<S: Into<String>, D: Into<String>>(column: S, detail: D) -> Self {
        SarError::MissingOrNonNumericColumn {
            column: column.into(),
            detail: detail.into(),
        }
    }

    pub fn unknown_stat<S: Into<String>>(stat: S) -> Self {
        SarError::UnknownStat(stat.into())
    }

    /// Create a schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        SarError::Schema(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SarError::Config(msg.into())
    }

    /// True for errors that abort a whole ingestion job
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SarError::UnrecognizedSource(_)
                | SarError::MalformedHeader(_)
                | SarError::AlreadyParsing
                | SarError::Io(_)
        )
    }
}
