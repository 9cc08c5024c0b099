//! Alert evaluation.
//!
//! Compares a snapshot against the thresholds and the previous hysteresis
//! record. Temperatures are level alerts (re-raised on every snapshot and left
//! to the dispatcher's rate limiter); fans and throttling are edge alerts;
//! load uses asymmetric hysteresis where only the return to normal is reported.

use serde::{Deserialize, Serialize};

use super::alert::{Alert, NotificationType, Priority};
use super::snapshot::Snapshot;
use super::thresholds::{TemperatureLevels, ThresholdSet};

/// State carried between snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HysteresisRecord {
    pub fan_active: bool,
    pub throttling: bool,
    pub high_load: bool,
}

/// Wording of the workload-complete alert. `{load}` in the message is
/// replaced by the current load average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionText {
    #[serde(default = "default_completion_title")]
    pub title: String,
    #[serde(default = "default_completion_message")]
    pub message: String,
}

impl Default for CompletionText {
    fn default() -> Self {
        Self {
            title: default_completion_title(),
            message: default_completion_message(),
        }
    }
}

fn default_completion_title() -> String {
    "✅ Workload Complete".to_string()
}

fn default_completion_message() -> String {
    "System load is back to normal ({load}) after a sustained high-load period".to_string()
}

/// Result of one evaluator pass
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub alerts: Vec<Alert>,
    pub record: HysteresisRecord,
}

/// Evaluate a snapshot and produce alerts plus the next hysteresis record.
pub fn evaluate_alerts(
    snapshot: &Snapshot,
    previous: &HysteresisRecord,
    thresholds: &ThresholdSet,
    completion: &CompletionText,
) -> Evaluation {
    let mut alerts = Vec::new();
    let mut record = *previous;

    // Temperature alerts
    if let Some(alert) = temperature_alert("CPU", snapshot.cpu_temp, &thresholds.cpu_temp) {
        alerts.push(alert);
    }
    if let Some(alert) = temperature_alert("Socket", snapshot.socket_temp, &thresholds.socket_temp)
    {
        alerts.push(alert);
    }

    // Fan state edge
    match (previous.fan_active, snapshot.fan_active) {
        (false, true) => alerts.push(Alert::new(
            "🌀 Fans Activated",
            format!(
                "Cooling fans turned on (CPU {}°C, socket {}°C, states {})",
                snapshot.cpu_temp,
                snapshot.socket_temp,
                display_fan_states(&snapshot.fan_states)
            ),
            Priority::Normal,
            NotificationType::FanStateChange,
        )),
        (true, false) => alerts.push(Alert::new(
            "💤 Fans Deactivated",
            format!(
                "Cooling fans turned off (CPU {}°C, socket {}°C)",
                snapshot.cpu_temp, snapshot.socket_temp
            ),
            Priority::Normal,
            NotificationType::FanStateChange,
        )),
        _ => {}
    }
    record.fan_active = snapshot.fan_active;

    // Throttling edge
    let throttling = snapshot.is_throttling(thresholds.cpu_freq.throttling_threshold);
    match (previous.throttling, throttling) {
        (false, true) => alerts.push(Alert::new(
            "🐢 CPU Throttling Started",
            format!(
                "CPU frequency dropped to {} MHz (threshold: {} MHz)",
                snapshot.cpu_freq, thresholds.cpu_freq.throttling_threshold
            ),
            Priority::High,
            NotificationType::ThrottlingChange,
        )),
        (true, false) => alerts.push(Alert::new(
            "🚀 CPU Throttling Ended",
            format!("CPU frequency recovered to {} MHz", snapshot.cpu_freq),
            Priority::Normal,
            NotificationType::ThrottlingChange,
        )),
        _ => {}
    }
    record.throttling = throttling;

    // Load recovery
    if snapshot.load_avg < thresholds.load_avg.normal && previous.high_load {
        alerts.push(Alert::new(
            completion.title.clone(),
            completion
                .message
                .replace("{load}", &format!("{:.2}", snapshot.load_avg)),
            Priority::Normal,
            NotificationType::WorkloadComplete,
        ));
        record.high_load = false;
    } else if snapshot.load_avg > thresholds.load_avg.high {
        record.high_load = true;
    }

    Evaluation { alerts, record }
}

fn temperature_alert(label: &str, value: i64, levels: &TemperatureLevels) -> Option<Alert> {
    if value >= levels.critical {
        Some(Alert::new(
            format!("🔥 {} Temperature Critical", label),
            format!(
                "{} at {}°C (critical threshold: {}°C)",
                label, value, levels.critical
            ),
            Priority::Critical,
            NotificationType::TemperatureCritical,
        ))
    } else if value >= levels.warning {
        Some(Alert::new(
            format!("⚠️ {} Temperature Warning", label),
            format!(
                "{} at {}°C (warning threshold: {}°C)",
                label, value, levels.warning
            ),
            Priority::High,
            NotificationType::TemperatureWarning,
        ))
    } else {
        None
    }
}

fn display_fan_states(states: &str) -> &str {
    if states.is_empty() {
        "n/a"
    } else {
        states
    }
}
