//! Single entry point for snapshots from every producer.
//!
//! `submit` runs alert evaluation plus dispatch and sensor publication side
//! by side. After `close` new submissions fail with `ShuttingDown` while
//! ones already inside `submit` finish normally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::alert::Alert;
use super::dispatcher::{DispatchOutcome, NotificationDispatcher};
use super::publisher::SensorPublisher;
use super::snapshot::Snapshot;
use super::status::StatusReport;
use super::tracker::AlertTracker;
use crate::core::config_store::ConfigStore;
use crate::error::{HubError, Result};
use crate::integrations::Sink;

/// What one submission produced
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub alerts: Vec<(Alert, DispatchOutcome)>,
    pub sensors_published: usize,
}

impl PipelineOutcome {
    pub fn notifications_sent(&self) -> usize {
        self.alerts
            .iter()
            .filter(|(_, outcome)| outcome.is_sent())
            .count()
    }
}

pub struct Pipeline {
    tracker: AlertTracker,
    dispatcher: NotificationDispatcher,
    publisher: SensorPublisher,
    sink: Arc<dyn Sink>,
    config: Arc<ConfigStore>,
    accepting: AtomicBool,
}

impl Pipeline {
    pub fn new(sink: Arc<dyn Sink>, config: Arc<ConfigStore>) -> Self {
        Self {
            tracker: AlertTracker::new(Arc::clone(&config)),
            dispatcher: NotificationDispatcher::new(Arc::clone(&sink), Arc::clone(&config)),
            publisher: SensorPublisher::new(Arc::clone(&sink), Arc::clone(&config)),
            sink,
            config,
            accepting: AtomicBool::new(true),
        }
    }

    pub async fn submit(&self, snapshot: Snapshot) -> Result<PipelineOutcome> {
        if !self.is_accepting() {
            return Err(HubError::ShuttingDown);
        }

        log::debug!(
            "Thermal data: Socket={}°C, CPU={}°C, Fans={}, Freq={}MHz, Load={}",
            snapshot.socket_temp,
            snapshot.cpu_temp,
            snapshot.fan_active,
            snapshot.cpu_freq,
            snapshot.load_avg
        );

        let alerting = async {
            let alerts = self.tracker.process(&snapshot);
            let outcomes = self.dispatcher.dispatch_all(&alerts).await;
            alerts.into_iter().zip(outcomes).collect::<Vec<_>>()
        };

        let (alerts, sensors_published) = tokio::join!(alerting, self.publisher.publish(&snapshot));

        Ok(PipelineOutcome {
            alerts,
            sensors_published,
        })
    }

    /// Stop accepting snapshots.
    pub fn close(&self) {
        if self.accepting.swap(false, Ordering::SeqCst) {
            log::info!("Pipeline closed to new snapshots");
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    pub fn tracker(&self) -> &AlertTracker {
        &self.tracker
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub async fn status(&self) -> StatusReport {
        let rate_limits = self.dispatcher.bucket_status();
        let sink_connected = self.sink.test_connection().await;

        StatusReport {
            running: self.is_accepting(),
            hysteresis: self.tracker.state(),
            rate_limits,
            sink_connected,
            config_path: self.config.path().map(|p| p.to_path_buf()),
        }
    }
}
