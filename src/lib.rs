// sargraph Library - Public API

// Re-export error types
pub mod error;
pub use error::{Result, SarError};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use core::config::Config;
pub use core::session::Session;

// Initialize logging, RUST_LOG still wins when set
pub fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
