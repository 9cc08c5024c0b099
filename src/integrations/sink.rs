//! Sink trait definition and the payload types it carries.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::thermal::{NotificationType, Priority};
use crate::error::Result;

/// Extra attributes published alongside a sensor state
pub type Attributes = Map<String, Value>;

/// Presentation hints attached to a notification. Opaque to the hub.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationMetadata {
    pub priority: Priority,
    pub tag: String,
    pub notification_type: NotificationType,
    pub timestamp: String,
    pub color: &'static str,
    pub sound: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
}

impl NotificationMetadata {
    pub fn for_priority(
        priority: Priority,
        notification_type: NotificationType,
        tag: impl Into<String>,
    ) -> Self {
        let (color, sound, persistent) = match priority {
            Priority::Critical => ("red", "alarm", Some(true)),
            Priority::High => ("orange", "default", None),
            Priority::Normal => ("blue", "none", None),
        };

        Self {
            priority,
            tag: tag.into(),
            notification_type,
            timestamp: chrono::Local::now().to_rfc3339(),
            color,
            sound,
            persistent,
        }
    }
}

/// External service receiving sensor states and notifications.
#[async_trait::async_trait]
pub trait Sink: Send + Sync {
    /// Publish the latest value of a named sensor.
    async fn update_sensor(&self, name: &str, value: &Value, attributes: &Attributes)
        -> Result<()>;

    /// Deliver a notification.
    async fn notify(&self, title: &str, message: &str, metadata: &NotificationMetadata)
        -> Result<()>;

    /// Whether the sink is reachable right now.
    async fn test_connection(&self) -> bool;

    /// Human-readable name for logs (e.g. "homeassistant").
    fn name(&self) -> &str;
}
