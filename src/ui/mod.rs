// UI and formatting module

pub mod messages;
pub mod status_formatter;

// Re-export commonly used items for cleaner imports
pub use messages::{dimmed, error, info, success, warn};
pub use status_formatter::{format_outcome, format_snapshot, format_status};
