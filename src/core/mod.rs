// Core business logic module

pub mod config;
pub mod datetime;
pub mod parser;
pub mod schema;
pub mod series;
pub mod session;
pub mod snapshot;

// Re-export commonly used items
pub use config::Config;
pub use parser::{FamilyRegistry, LineOutcome, ParserEngine, ParserOptions, ParserState};
pub use schema::SchemaRegistry;
pub use series::StatHandler;
pub use session::{CancelHandle, IngestReport, Session, TerminalStatus};
pub use snapshot::SessionSnapshot;
