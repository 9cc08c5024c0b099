//! Normalized telemetry sample.
//!
//! The poll file and the push endpoint share one JSON shape. Decoding is
//! lenient about number kinds and absent fields (absent means zero) but
//! rejects values of the wrong kind, so a half-understood document never
//! reaches the evaluator.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{HubError, Result};

/// One telemetry sample. Every field is always present; unreadable values are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "lenient::int")]
    pub timestamp: i64, // Unix timestamp
    #[serde(default, deserialize_with = "lenient::int")]
    pub socket_temp: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub cpu_temp: i64,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub fan_active: bool,
    #[serde(default, deserialize_with = "lenient::fan_states")]
    pub fan_states: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub cpu_freq: i64, // MHz
    #[serde(default, deserialize_with = "lenient::float")]
    pub load_avg: f64,
}

impl Snapshot {
    /// Decode a snapshot from a JSON document.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| HubError::ingest(format!("invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(HubError::ingest("telemetry payload must be a JSON object"));
        }

        serde_json::from_value(value).map_err(|e| HubError::ingest(e.to_string()))
    }

    /// Whether the CPU runs below the given frequency boundary.
    pub fn is_throttling(&self, throttling_threshold: i64) -> bool {
        self.cpu_freq < throttling_threshold
    }
}

mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    impl Number {
        fn as_i64(&self) -> i64 {
            match *self {
                Number::Int(v) => v,
                Number::Float(v) => v.trunc() as i64,
                Number::Bool(v) => v as i64,
            }
        }

        fn as_f64(&self) -> f64 {
            match *self {
                Number::Int(v) => v as f64,
                Number::Float(v) => v,
                Number::Bool(v) => {
                    if v {
                        1.0
                    } else {
                        0.0
                    }
                }
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FanStates {
        Text(String),
        Codes(Vec<i64>),
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i64, D::Error> {
        Ok(Option::<Number>::deserialize(d)?.map_or(0, |n| n.as_i64()))
    }

    pub fn float<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
        Ok(Option::<Number>::deserialize(d)?.map_or(0.0, |n| n.as_f64()))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
        Ok(Option::<Number>::deserialize(d)?.is_some_and(|n| match n {
            Number::Bool(v) => v,
            other => other.as_f64() != 0.0,
        }))
    }

    pub fn fan_states<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
        Ok(match Option::<FanStates>::deserialize(d)? {
            None => String::new(),
            Some(FanStates::Text(text)) => text,
            Some(FanStates::Codes(codes)) => codes.iter().map(|c| c.to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_zero_filled() {
        let snapshot = Snapshot::from_json_slice(b"{}").unwrap();
        assert_eq!(snapshot, Snapshot::default());
        assert!(!snapshot.fan_active);
        assert_eq!(snapshot.fan_states, "");
        assert_eq!(snapshot.cpu_freq, 0);
        assert_eq!(snapshot.load_avg, 0.0);
    }

    #[test]
    fn test_collector_payload_shape() {
        let payload = br#"{
            "timestamp": 1718000000,
            "socket_temp": 61,
            "cpu_temp": 72,
            "fan_active": 1,
            "fan_states": "01000",
            "cpu_freq": 3412,
            "load_avg": 2.35
        }"#;

        let snapshot = Snapshot::from_json_slice(payload).unwrap();
        assert_eq!(snapshot.timestamp, 1718000000);
        assert_eq!(snapshot.socket_temp, 61);
        assert_eq!(snapshot.cpu_temp, 72);
        assert!(snapshot.fan_active);
        assert_eq!(snapshot.fan_states, "01000");
        assert_eq!(snapshot.cpu_freq, 3412);
        assert!((snapshot.load_avg - 2.35).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lenient_number_kinds() {
        let payload = br#"{"cpu_temp": 71.9, "cpu_freq": 2999.6, "load_avg": 4, "fan_active": true, "fan_states": [0, 2, 1]}"#;
        let snapshot = Snapshot::from_json_slice(payload).unwrap();
        assert_eq!(snapshot.cpu_temp, 71);
        assert_eq!(snapshot.cpu_freq, 2999);
        assert_eq!(snapshot.load_avg, 4.0);
        assert!(snapshot.fan_active);
        assert_eq!(snapshot.fan_states, "021");
    }

    #[test]
    fn test_null_and_unknown_fields() {
        let payload = br#"{"cpu_temp": null, "fan_active": null, "gpu_temp": 90, "host": "nucbox"}"#;
        let snapshot = Snapshot::from_json_slice(payload).unwrap();
        assert_eq!(snapshot.cpu_temp, 0);
        assert!(!snapshot.fan_active);
    }

    #[test]
    fn test_wrong_kind_is_malformed() {
        let err = Snapshot::from_json_slice(br#"{"cpu_temp": "hot"}"#).unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_non_object_is_malformed() {
        assert!(Snapshot::from_json_slice(b"[1, 2, 3]").is_err());
        assert!(Snapshot::from_json_slice(b"not json").is_err());
    }

    #[test]
    fn test_is_throttling() {
        let snapshot = Snapshot {
            cpu_freq: 2800,
            ..Default::default()
        };
        assert!(snapshot.is_throttling(3000));
        assert!(!snapshot.is_throttling(2800));
    }
}
