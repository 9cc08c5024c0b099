//! Owner of the hysteresis record.
//!
//! `process` is the only way to touch the record. The lock is held for the
//! whole evaluator pass and never across an await point, so snapshots from
//! the poll loop and the push listener are applied one at a time.

use parking_lot::Mutex;
use std::sync::Arc;

use super::alert::Alert;
use super::evaluator::{evaluate_alerts, HysteresisRecord};
use super::snapshot::Snapshot;
use crate::core::config_store::ConfigStore;

pub struct AlertTracker {
    record: Mutex<HysteresisRecord>,
    config: Arc<ConfigStore>,
}

impl AlertTracker {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self {
            record: Mutex::new(HysteresisRecord::default()),
            config,
        }
    }

    /// Evaluate one snapshot against the current thresholds and advance the record.
    pub fn process(&self, snapshot: &Snapshot) -> Vec<Alert> {
        let config = self.config.current();

        let mut record = self.record.lock();
        let evaluation = evaluate_alerts(
            snapshot,
            &record,
            &config.thresholds,
            &config.notifications.workload_complete,
        );
        *record = evaluation.record;

        log::debug!(
            "Hysteresis updated: fan_active={} throttling={} high_load={} ({} alerts)",
            record.fan_active,
            record.throttling,
            record.high_load,
            evaluation.alerts.len()
        );

        evaluation.alerts
    }

    /// Consistent copy of the current record
    pub fn state(&self) -> HysteresisRecord {
        *self.record.lock()
    }
}
