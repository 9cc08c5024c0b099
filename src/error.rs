use std::io;
use thiserror::Error;

/// Custom error type for the thermal hub
#[derive(Error, Debug)]
pub enum HubError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Malformed telemetry: {0}")]
    Ingest(String),

    #[error("Pipeline is shutting down")]
    ShuttingDown,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the thermal hub
pub type Result<T> = std::result::Result<T, HubError>;

impl HubError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        HubError::Config(msg.into())
    }

    /// Create a sink error
    pub fn sink<S: Into<String>>(msg: S) -> Self {
        HubError::Sink(msg.into())
    }

    /// Create a malformed-telemetry error
    pub fn ingest<S: Into<String>>(msg: S) -> Self {
        HubError::Ingest(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HubError::Other(msg.into())
    }

    /// Whether the error comes from bad input rather than the environment.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, HubError::Ingest(_) | HubError::Json(_))
    }
}
