// Point-in-time view of the agent, served by /health and the status command

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::dispatcher::BucketStatus;
use super::evaluator::HysteresisRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub running: bool,
    pub hysteresis: HysteresisRecord,
    pub rate_limits: Vec<BucketStatus>,
    pub sink_connected: bool,
    pub config_path: Option<PathBuf>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub monitoring: StatusReport,
}

impl HealthResponse {
    pub fn healthy(monitoring: StatusReport) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
            monitoring,
        }
    }
}
