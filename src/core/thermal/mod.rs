//! Thermal alerting core.
//!
//! Snapshots flow through the pipeline into the tracker, which evaluates them
//! against the thresholds and hands the resulting alerts to the dispatcher.
//! Sensor publication runs alongside.

pub mod alert;
pub mod dispatcher;
pub mod evaluator;
pub mod pipeline;
pub mod publisher;
pub mod snapshot;
pub mod status;
pub mod thresholds;
pub mod tracker;

pub use alert::{Alert, NotificationType, Priority};
pub use dispatcher::{BucketKey, BucketStatus, DispatchOutcome, NotificationDispatcher};
pub use evaluator::{evaluate_alerts, CompletionText, Evaluation, HysteresisRecord};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use publisher::{sensor_readings, SensorPublisher, SensorReading};
pub use snapshot::Snapshot;
pub use status::{HealthResponse, StatusReport};
pub use thresholds::{FrequencyLevels, LoadLevels, TemperatureLevels, ThresholdSet};
pub use tracker::AlertTracker;
