//! Data-file poll loop.
//!
//! Every interval the data file is stat'ed. A changed modification time means
//! a new snapshot; the marker advances even if the contents fail to decode so
//! a broken file is reported once rather than on every tick.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use crate::core::thermal::{Pipeline, PipelineOutcome, Snapshot};
use crate::error::HubError;

/// Result of a single poll
#[derive(Debug)]
pub enum PollResult {
    Missing,
    Unchanged,
    Submitted(PipelineOutcome),
    Rejected(HubError),
}

pub struct FilePoller {
    pipeline: Arc<Pipeline>,
    last_modified: Option<SystemTime>,
}

impl FilePoller {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            last_modified: None,
        }
    }

    pub async fn poll_once(&mut self, path: &Path) -> PollResult {
        let modified = match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) if e.kind() == ErrorKind::NotFound => return PollResult::Missing,
            Err(e) => {
                log::warn!("Cannot stat data file {}: {}", path.display(), e);
                return PollResult::Rejected(e.into());
            }
        };

        if self.last_modified == Some(modified) {
            return PollResult::Unchanged;
        }
        self.last_modified = Some(modified);

        let snapshot = match tokio::fs::read(path).await {
            Ok(bytes) => Snapshot::from_json_slice(&bytes),
            Err(e) => Err(e.into()),
        };

        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("Discarding data file {}: {}", path.display(), e);
                return PollResult::Rejected(e);
            }
        };

        match self.pipeline.submit(snapshot).await {
            Ok(outcome) => PollResult::Submitted(outcome),
            Err(e) => {
                log::warn!("Snapshot from {} not processed: {}", path.display(), e);
                PollResult::Rejected(e)
            }
        }
    }

    /// Poll until shutdown. Picks up interval and path changes from the config store.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        let mut period = self.pipeline.config().current().monitoring.interval();
        let mut ticker = poll_interval(period, Instant::now());

        log::info!("File monitor started (every {}s)", period.as_secs());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let config = self.pipeline.config().current();
                    self.poll_once(&config.monitoring.data_file).await;

                    let configured = config.monitoring.interval();
                    if configured != period {
                        log::info!("Poll interval changed to {}s", configured.as_secs());
                        period = configured;
                        ticker = ticker_after(period);
                    }
                }
                _ = shutdown.recv() => {
                    log::info!("File monitor shutting down");
                    break;
                }
            }
        }
    }
}

fn poll_interval(period: Duration, start: Instant) -> tokio::time::Interval {
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

fn ticker_after(period: Duration) -> tokio::time::Interval {
    poll_interval(period, Instant::now() + period)
}
