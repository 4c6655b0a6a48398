// Command handlers module
pub mod config;
pub mod parse;
pub mod schema;
pub mod version;

// Re-exports for cleaner imports
pub use parse::execute as parse;
pub use schema::execute as schema;
pub use version::execute as version;
