// Core business logic module

pub mod config;
pub mod config_store;
pub mod ingest;
pub mod thermal;

// Re-export commonly used items
pub use config::Config;
pub use config_store::ConfigStore;
pub use ingest::Agent;
pub use thermal::{Pipeline, Snapshot};
