//! Routes alerts to the sink.
//!
//! Each alert passes the enabled-type filter, then the rate limiter keyed by
//! `(notification type, priority)`. A bucket only advances after the sink
//! confirmed delivery, so a failed send never delays the next attempt.
//! The check, the send and the bucket update run under a per-key async gate;
//! the bucket itself sits behind a short sync lock so status reads and resets
//! never wait for a send in progress.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex as AsyncMutex;

use super::alert::{Alert, NotificationType, Priority};
use crate::core::config::NotificationConfig;
use crate::core::config_store::ConfigStore;
use crate::integrations::{NotificationMetadata, Sink};

/// Rate-limit bucket key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub notification_type: NotificationType,
    pub priority: Priority,
}

impl BucketKey {
    pub fn new(notification_type: NotificationType, priority: Priority) -> Self {
        Self {
            notification_type,
            priority,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    last_sent: Instant,
    last_sent_at: DateTime<Local>,
}

#[derive(Default)]
struct Slot {
    gate: AsyncMutex<()>,
    bucket: parking_lot::Mutex<Option<Bucket>>,
}

/// What happened to one alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Disabled,
    RateLimited,
    Failed(String),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent)
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Sent => f.write_str("sent"),
            DispatchOutcome::Disabled => f.write_str("disabled"),
            DispatchOutcome::RateLimited => f.write_str("rate limited"),
            DispatchOutcome::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Rate-limit state of one bucket, for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketStatus {
    pub notification_type: NotificationType,
    pub priority: Priority,
    pub last_sent: DateTime<Local>,
    pub seconds_since_last: u64,
    pub seconds_until_next: u64,
    pub can_send: bool,
    /// A send for this bucket is in progress
    #[serde(default)]
    pub in_flight: bool,
}

pub struct NotificationDispatcher {
    sink: Arc<dyn Sink>,
    config: Arc<ConfigStore>,
    buckets: parking_lot::Mutex<HashMap<BucketKey, Arc<Slot>>>,
}

impl NotificationDispatcher {
    pub fn new(sink: Arc<dyn Sink>, config: Arc<ConfigStore>) -> Self {
        Self {
            sink,
            config,
            buckets: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    pub async fn dispatch(&self, alert: &Alert) -> DispatchOutcome {
        self.dispatch_at(alert, Instant::now()).await
    }

    /// Dispatch with an explicit clock reading.
    pub async fn dispatch_at(&self, alert: &Alert, now: Instant) -> DispatchOutcome {
        let config = self.config.current();
        let notifications = &config.notifications;

        if !notifications.is_enabled(alert.notification_type) {
            log::debug!("Notification type {} is disabled", alert.notification_type);
            return DispatchOutcome::Disabled;
        }

        self.send_rate_limited(alert, notifications, now).await
    }

    /// Dispatch alerts in order; one failure does not stop the rest.
    pub async fn dispatch_all(&self, alerts: &[Alert]) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::with_capacity(alerts.len());
        for alert in alerts {
            outcomes.push(self.dispatch(alert).await);
        }
        outcomes
    }

    /// Send one test notification per priority. Skips the type filter but
    /// not the rate limiter.
    pub async fn send_test_notifications(&self) -> Vec<(Priority, DispatchOutcome)> {
        let config = self.config.current();
        let tests = [
            (
                Priority::Normal,
                "✅ Test Normal Priority",
                "This is a normal priority test notification",
            ),
            (
                Priority::High,
                "⚠️ Test High Priority",
                "This is a high priority test notification",
            ),
            (
                Priority::Critical,
                "🚨 Test Critical Priority",
                "This is a critical priority test notification",
            ),
        ];

        let mut results = Vec::with_capacity(tests.len());
        for (priority, title, message) in tests {
            let alert = Alert::new(title, message, priority, NotificationType::Test);
            let outcome = self
                .send_rate_limited(&alert, &config.notifications, Instant::now())
                .await;
            results.push((priority, outcome));
        }
        results
    }

    async fn send_rate_limited(
        &self,
        alert: &Alert,
        notifications: &NotificationConfig,
        now: Instant,
    ) -> DispatchOutcome {
        let key = BucketKey::new(alert.notification_type, alert.priority);
        let slot = self.slot(key);
        let _gate = slot.gate.lock().await;

        let window = notifications.rate_limit.window(alert.priority);
        let previous = *slot.bucket.lock();
        if let Some(previous) = previous {
            if now.saturating_duration_since(previous.last_sent) < window {
                log::debug!(
                    "Rate limit hit for {} ({})",
                    alert.notification_type,
                    alert.priority
                );
                return DispatchOutcome::RateLimited;
            }
        }

        let metadata = NotificationMetadata::for_priority(
            alert.priority,
            alert.notification_type,
            notifications.tag.clone(),
        );

        match self.sink.notify(&alert.title, &alert.message, &metadata).await {
            Ok(()) => {
                *slot.bucket.lock() = Some(Bucket {
                    last_sent: now,
                    last_sent_at: Local::now(),
                });
                log::info!("Notification sent: {} ({})", alert.title, alert.priority);
                DispatchOutcome::Sent
            }
            Err(e) => {
                log::error!(
                    "Failed to send notification '{}' via {}: {}",
                    alert.title,
                    self.sink.name(),
                    e
                );
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }

    fn slot(&self, key: BucketKey) -> Arc<Slot> {
        let mut buckets = self.buckets.lock();
        Arc::clone(buckets.entry(key).or_default())
    }

    /// Forget every bucket, so the next alert of any kind is sent immediately.
    /// Slots stay in place: a send already in progress records into the same
    /// bucket and still suppresses duplicates that follow it.
    pub fn reset(&self) {
        for slot in self.buckets.lock().values() {
            *slot.bucket.lock() = None;
        }
        log::info!("Rate limiting history cleared");
    }

    pub fn bucket_status(&self) -> Vec<BucketStatus> {
        self.bucket_status_at(Instant::now())
    }

    pub fn bucket_status_at(&self, now: Instant) -> Vec<BucketStatus> {
        let config = self.config.current();
        let mut slots: Vec<(BucketKey, Arc<Slot>)> = self
            .buckets
            .lock()
            .iter()
            .map(|(key, slot)| (*key, Arc::clone(slot)))
            .collect();
        slots.sort_by_key(|(key, _)| *key);

        let mut status = Vec::with_capacity(slots.len());
        for (key, slot) in slots {
            let in_flight = slot.gate.try_lock().is_err();
            let Some(bucket) = *slot.bucket.lock() else {
                continue;
            };

            let window = config.notifications.rate_limit.window(key.priority);
            let since = now.saturating_duration_since(bucket.last_sent);
            let until = window.saturating_sub(since);

            status.push(BucketStatus {
                notification_type: key.notification_type,
                priority: key.priority,
                last_sent: bucket.last_sent_at,
                seconds_since_last: since.as_secs(),
                seconds_until_next: until.as_secs(),
                can_send: until.is_zero(),
                in_flight,
            });
        }
        status
    }
}
