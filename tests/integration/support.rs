// Shared fixtures for integration tests

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thermal_hub::core::{Config, ConfigStore, Pipeline};
use thermal_hub::integrations::{Attributes, NotificationMetadata, Sink};
use thermal_hub::{HubError, Result};

/// Sink that records everything it receives
#[derive(Default)]
pub struct RecordingSink {
    pub notifications: parking_lot::Mutex<Vec<(String, NotificationMetadata)>>,
    pub sensors: parking_lot::Mutex<Vec<(String, Value)>>,
    pub failing: AtomicBool,
}

impl RecordingSink {
    pub fn titles(&self) -> Vec<String> {
        self.notifications
            .lock()
            .iter()
            .map(|(title, _)| title.clone())
            .collect()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Sink for RecordingSink {
    async fn update_sensor(&self, name: &str, value: &Value, _: &Attributes) -> Result<()> {
        self.sensors.lock().push((name.to_string(), value.clone()));
        Ok(())
    }

    async fn notify(&self, title: &str, _: &str, metadata: &NotificationMetadata) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HubError::sink("sink unavailable"));
        }
        self.notifications
            .lock()
            .push((title.to_string(), metadata.clone()));
        Ok(())
    }

    async fn test_connection(&self) -> bool {
        !self.failing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub fn pipeline_with(config: Config) -> (Arc<Pipeline>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let pipeline = Pipeline::new(
        Arc::clone(&sink) as Arc<dyn Sink>,
        Arc::new(ConfigStore::new(config)),
    );
    (Arc::new(pipeline), sink)
}

pub fn pipeline() -> (Arc<Pipeline>, Arc<RecordingSink>) {
    pipeline_with(Config::default())
}

pub const VALID_CONFIG: &str = r#"{
    "homeassistant": {"url": "http://homeassistant.local:8123", "token": "long-lived-token"},
    "thresholds": {
        "cpu_temp": {"warning": 80, "critical": 90},
        "socket_temp": {"warning": 70, "critical": 85},
        "cpu_freq": {"throttling_threshold": 3000},
        "load_avg": {"high": 3.0, "normal": 1.0}
    },
    "monitoring": {"data_file": "/tmp/nucbox-thermal.json", "interval": 30, "http_port": 8080},
    "sensors": {"thermal_zone_socket": 0, "thermal_zone_cpu": 1, "cooling_devices": [0, 1, 2, 3, 4]}
}"#;
