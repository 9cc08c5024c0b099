//! Alert events produced by the evaluator and consumed by the dispatcher.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Notification priority. Also selects the rate-limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Normal, Priority::High, Priority::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification category, used for the enabled-type filter and rate-limit keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    TemperatureCritical,
    TemperatureWarning,
    FanStateChange,
    ThrottlingChange,
    WorkloadComplete,
    Test,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::TemperatureCritical => "temperature_critical",
            NotificationType::TemperatureWarning => "temperature_warning",
            NotificationType::FanStateChange => "fan_state_change",
            NotificationType::ThrottlingChange => "throttling_change",
            NotificationType::WorkloadComplete => "workload_complete",
            NotificationType::Test => "test",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An individual alert. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub notification_type: NotificationType,
}

impl Alert {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        priority: Priority,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            priority,
            notification_type,
        }
    }
}
