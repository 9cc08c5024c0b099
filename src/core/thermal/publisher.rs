//! Projects snapshots onto named sensor values.

use futures_util::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;

use super::snapshot::Snapshot;
use crate::core::config::Config;
use crate::core::config_store::ConfigStore;
use crate::integrations::{Attributes, Sink};

/// One sensor update ready for the sink
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub name: String,
    pub value: Value,
    pub attributes: Attributes,
}

impl SensorReading {
    fn new(name: String, value: Value, attributes: Value) -> Self {
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => Attributes::new(),
        };
        Self {
            name,
            value,
            attributes,
        }
    }
}

/// Build the six sensor readings for a snapshot.
pub fn sensor_readings(snapshot: &Snapshot, config: &Config) -> Vec<SensorReading> {
    let prefix = &config.sensors.entity_prefix;
    let device = &config.sensors.device_name;
    let throttling = snapshot.is_throttling(config.thresholds.cpu_freq.throttling_threshold);

    vec![
        SensorReading::new(
            format!("{}_socket_temp", prefix),
            json!(snapshot.socket_temp),
            json!({
                "unit_of_measurement": "°C",
                "device_class": "temperature",
                "friendly_name": format!("{} Socket Temperature", device),
            }),
        ),
        SensorReading::new(
            format!("{}_cpu_temp", prefix),
            json!(snapshot.cpu_temp),
            json!({
                "unit_of_measurement": "°C",
                "device_class": "temperature",
                "friendly_name": format!("{} CPU Temperature", device),
            }),
        ),
        SensorReading::new(
            format!("{}_cpu_freq", prefix),
            json!(snapshot.cpu_freq),
            json!({
                "unit_of_measurement": "MHz",
                "device_class": "frequency",
                "friendly_name": format!("{} CPU Frequency", device),
                "icon": "mdi:chip",
            }),
        ),
        SensorReading::new(
            format!("{}_fan_active", prefix),
            json!(u8::from(snapshot.fan_active)),
            json!({
                "device_class": "running",
                "friendly_name": format!("{} Fans Active", device),
                "fan_states": snapshot.fan_states,
            }),
        ),
        SensorReading::new(
            format!("{}_cpu_throttling", prefix),
            json!(u8::from(throttling)),
            json!({
                "device_class": "problem",
                "friendly_name": format!("{} CPU Throttling", device),
                "cpu_frequency": format!("{}MHz", snapshot.cpu_freq),
            }),
        ),
        SensorReading::new(
            format!("{}_load_avg", prefix),
            json!(snapshot.load_avg),
            json!({
                "unit_of_measurement": "load",
                "friendly_name": format!("{} Load Average", device),
            }),
        ),
    ]
}

pub struct SensorPublisher {
    sink: Arc<dyn Sink>,
    config: Arc<ConfigStore>,
}

impl SensorPublisher {
    pub fn new(sink: Arc<dyn Sink>, config: Arc<ConfigStore>) -> Self {
        Self { sink, config }
    }

    /// Push every sensor concurrently. Returns how many updates succeeded.
    pub async fn publish(&self, snapshot: &Snapshot) -> usize {
        let config = self.config.current();
        let readings = sensor_readings(snapshot, &config);

        let results = join_all(readings.iter().map(|reading| async move {
            let result = self
                .sink
                .update_sensor(&reading.name, &reading.value, &reading.attributes)
                .await;
            if let Err(e) = &result {
                log::error!("Failed to update sensor {}: {}", reading.name, e);
            }
            result.is_ok()
        }))
        .await;

        results.into_iter().filter(|ok| *ok).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HubError, Result};
    use crate::integrations::NotificationMetadata;

    #[derive(Default)]
    struct RecordingSink {
        updates: parking_lot::Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl Sink for RecordingSink {
        async fn update_sensor(&self, name: &str, _: &Value, _: &Attributes) -> Result<()> {
            if self.fail_on.is_some_and(|f| name.ends_with(f)) {
                return Err(HubError::sink("boom"));
            }
            self.updates.lock().push(name.to_string());
            Ok(())
        }

        async fn notify(&self, _: &str, _: &str, _: &NotificationMetadata) -> Result<()> {
            Ok(())
        }

        async fn test_connection(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn sample() -> Snapshot {
        Snapshot {
            timestamp: 1_700_000_000,
            socket_temp: 55,
            cpu_temp: 62,
            fan_active: true,
            fan_states: "10100".to_string(),
            cpu_freq: 2800,
            load_avg: 1.5,
        }
    }

    #[test]
    fn test_readings_cover_all_sensors() {
        let readings = sensor_readings(&sample(), &Config::default());
        let names: Vec<_> = readings.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "nucbox_socket_temp",
                "nucbox_cpu_temp",
                "nucbox_cpu_freq",
                "nucbox_fan_active",
                "nucbox_cpu_throttling",
                "nucbox_load_avg",
            ]
        );

        assert_eq!(readings[3].value, json!(1));
        assert_eq!(readings[3].attributes["fan_states"], "10100");
        assert_eq!(readings[4].value, json!(1));
        assert_eq!(readings[4].attributes["cpu_frequency"], "2800MHz");
        assert_eq!(readings[1].attributes["friendly_name"], "NucBox CPU Temperature");
    }

    #[test]
    fn test_throttling_sensor_uses_configured_threshold() {
        let mut config = Config::default();
        config.thresholds.cpu_freq.throttling_threshold = 2500;
        config.sensors.entity_prefix = "lab".to_string();

        let readings = sensor_readings(&sample(), &config);
        assert_eq!(readings[4].name, "lab_cpu_throttling");
        assert_eq!(readings[4].value, json!(0));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_others() {
        let sink = Arc::new(RecordingSink {
            fail_on: Some("cpu_freq"),
            ..Default::default()
        });
        let publisher = SensorPublisher::new(
            Arc::clone(&sink) as Arc<dyn Sink>,
            Arc::new(ConfigStore::new(Config::default())),
        );

        assert_eq!(publisher.publish(&sample()).await, 5);
        assert_eq!(sink.updates.lock().len(), 5);
    }
}
