use std::sync::Arc;
use thermal_hub::core::thermal::{DispatchOutcome, NotificationType, Priority, Snapshot};
use thermal_hub::core::Config;

use super::support::{pipeline, pipeline_with};

fn calm() -> Snapshot {
    Snapshot {
        socket_temp: 45,
        cpu_temp: 50,
        cpu_freq: 3400,
        load_avg: 0.5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fan_edges_produce_two_alerts() {
    let (pipeline, sink) = pipeline();

    let mut titles = Vec::new();
    for fan_active in [false, false, true, true, false] {
        let outcome = pipeline
            .submit(Snapshot {
                fan_active,
                ..calm()
            })
            .await
            .unwrap();
        titles.extend(outcome.alerts.into_iter().map(|(alert, _)| alert.title));
    }

    assert_eq!(titles, vec!["🌀 Fans Activated", "💤 Fans Deactivated"]);
    // Both edges share the (fan_state_change, normal) bucket
    assert_eq!(sink.titles(), vec!["🌀 Fans Activated"]);
}

#[tokio::test]
async fn test_workload_complete_only_after_recovery() {
    let (pipeline, sink) = pipeline();

    let mut alerts_per_snapshot = Vec::new();
    for load_avg in [0.5, 4.0, 2.0, 0.5] {
        let outcome = pipeline
            .submit(Snapshot { load_avg, ..calm() })
            .await
            .unwrap();
        alerts_per_snapshot.push(outcome.alerts.len());
    }

    assert_eq!(alerts_per_snapshot, vec![0, 0, 0, 1]);
    let notifications = sink.notifications.lock();
    assert_eq!(notifications.len(), 1);
    assert_eq!(
        notifications[0].1.notification_type,
        NotificationType::WorkloadComplete
    );
}

#[tokio::test]
async fn test_sustained_critical_temperature_notifies_once() {
    let (pipeline, sink) = pipeline();

    for _ in 0..5 {
        let outcome = pipeline
            .submit(Snapshot {
                cpu_temp: 93,
                ..calm()
            })
            .await
            .unwrap();
        assert_eq!(outcome.alerts.len(), 1);
    }

    let notifications = sink.notifications.lock();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].1.priority, Priority::Critical);
    assert_eq!(notifications[0].1.persistent, Some(true));
}

#[tokio::test]
async fn test_independent_types_are_not_suppressed() {
    let (pipeline, sink) = pipeline();

    // Critical temperature, then throttling starts while still hot
    pipeline
        .submit(Snapshot {
            cpu_temp: 95,
            ..calm()
        })
        .await
        .unwrap();
    let outcome = pipeline
        .submit(Snapshot {
            cpu_temp: 95,
            cpu_freq: 2200,
            ..calm()
        })
        .await
        .unwrap();

    let results: Vec<_> = outcome
        .alerts
        .iter()
        .map(|(alert, result)| (alert.notification_type, result.clone()))
        .collect();
    assert_eq!(
        results,
        vec![
            (NotificationType::TemperatureCritical, DispatchOutcome::RateLimited),
            (NotificationType::ThrottlingChange, DispatchOutcome::Sent),
        ]
    );
    assert_eq!(sink.notifications.lock().len(), 2);
}

#[tokio::test]
async fn test_failed_delivery_is_retried_on_next_snapshot() {
    let (pipeline, sink) = pipeline();
    let hot = Snapshot {
        cpu_temp: 91,
        ..calm()
    };

    sink.set_failing(true);
    let outcome = pipeline.submit(hot.clone()).await.unwrap();
    assert!(matches!(outcome.alerts[0].1, DispatchOutcome::Failed(_)));

    sink.set_failing(false);
    let outcome = pipeline.submit(hot).await.unwrap();
    assert_eq!(outcome.alerts[0].1, DispatchOutcome::Sent);
    assert_eq!(sink.notifications.lock().len(), 1);
}

#[tokio::test]
async fn test_disabled_types_still_update_hysteresis() {
    let mut config = Config::default();
    config
        .notifications
        .enabled_types
        .remove(&NotificationType::FanStateChange);
    let (pipeline, sink) = pipeline_with(config);

    pipeline
        .submit(Snapshot {
            fan_active: true,
            ..calm()
        })
        .await
        .unwrap();

    assert!(sink.notifications.lock().is_empty());
    assert!(pipeline.tracker().state().fan_active);
}

#[tokio::test]
async fn test_zero_filled_snapshot_publishes_all_sensors() {
    let (pipeline, sink) = pipeline();
    let snapshot = Snapshot::from_json_slice(b"{}").unwrap();

    let outcome = pipeline.submit(snapshot).await.unwrap();
    assert_eq!(outcome.sensors_published, 6);

    let sensors = sink.sensors.lock();
    let fan = sensors
        .iter()
        .find(|(name, _)| name == "nucbox_fan_active")
        .unwrap();
    assert_eq!(fan.1, serde_json::json!(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_keep_record_consistent() {
    let (pipeline, sink) = pipeline();

    let tasks: Vec<_> = (0..2)
        .map(|producer| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                let mut fan_alerts = 0;
                for _ in 0..50 {
                    let fan_active = producer == 0;
                    let outcome = pipeline
                        .submit(Snapshot {
                            fan_active,
                            ..calm()
                        })
                        .await
                        .unwrap();
                    fan_alerts += outcome.alerts.len();
                }
                fan_alerts
            })
        })
        .collect();

    let mut total = 0;
    for task in tasks {
        total += task.await.unwrap();
    }

    // Every flip of the record yields exactly one alert; the final state
    // follows from the parity of the flips.
    assert_eq!(total % 2 == 1, pipeline.tracker().state().fan_active);
    assert!(sink.notifications.lock().len() <= 1);
}
