// UI and formatting module

pub mod formatters;
pub mod messages;
pub mod report;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_axis_value, format_decimal, format_duration, format_timestamp};
pub use messages::{dimmed, error, info, success, warn};
pub use report::{print_stats, print_summary};
