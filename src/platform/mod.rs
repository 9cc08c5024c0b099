// Platform-specific code module

pub mod sensors;

// Re-exports
pub use sensors::{MetricsSource, SysfsMetricsSource};
