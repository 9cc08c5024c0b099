use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use thermal_hub::core::thermal::AlertTracker;
use thermal_hub::core::thermal::Snapshot;
use thermal_hub::core::{Config, ConfigStore};
use thermal_hub::HubError;

use super::support::VALID_CONFIG;

#[test]
fn test_load_valid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, VALID_CONFIG).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.homeassistant.url, "http://homeassistant.local:8123");
    assert_eq!(config.thresholds.cpu_temp.critical, 90);
    assert_eq!(config.monitoring.http_port, 8080);
    assert_eq!(config.notifications.rate_limit.critical, 300);
    assert_eq!(config.sensors.entity_prefix, "nucbox");
}

#[test]
fn test_missing_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::load_from(&temp_dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, HubError::Config(_)));
}

#[test]
fn test_missing_section_names_the_key() {
    let data = VALID_CONFIG.replace("\"sensors\"", "\"sensorz\"");
    let err = Config::from_json_str(&data).unwrap_err();
    assert!(err.to_string().contains("sensors"));
}

#[test]
fn test_partial_temperature_levels_rejected() {
    let data = VALID_CONFIG.replace(
        "\"cpu_temp\": {\"warning\": 80, \"critical\": 90}",
        "\"cpu_temp\": {\"critical\": 95}",
    );
    assert_ne!(data, VALID_CONFIG);
    assert!(matches!(
        Config::from_json_str(&data),
        Err(HubError::Config(_))
    ));
}

#[test]
fn test_omitted_temperature_section_keeps_cool_cpu_quiet() {
    let data = VALID_CONFIG.replace("\"cpu_temp\": {\"warning\": 80, \"critical\": 90},", "");
    assert_ne!(data, VALID_CONFIG);
    let config = Config::from_json_str(&data).unwrap();
    assert_eq!(config.thresholds.cpu_temp.warning, 80);
    assert_eq!(config.thresholds.cpu_temp.critical, 90);

    let tracker = AlertTracker::new(Arc::new(ConfigStore::new(config)));
    let cool = Snapshot {
        cpu_temp: 35,
        socket_temp: 30,
        cpu_freq: 3400,
        ..Default::default()
    };
    assert!(tracker.process(&cool).is_empty());
}

#[test]
fn test_zero_connect_retry_rejected() {
    let data = VALID_CONFIG.replace("\"http_port\": 8080", "\"http_port\": 8080, \"connect_retry_secs\": 0");
    assert!(matches!(
        Config::from_json_str(&data),
        Err(HubError::Config(_))
    ));
}

#[test]
fn test_inverted_thresholds_rejected() {
    let data = VALID_CONFIG.replace("\"warning\": 80, \"critical\": 90", "\"warning\": 95, \"critical\": 90");
    assert!(matches!(
        Config::from_json_str(&data),
        Err(HubError::Config(_))
    ));
}

#[test]
fn test_bad_bind_address_rejected() {
    let data = VALID_CONFIG.replace("\"http_port\": 8080", "\"http_port\": 8080, \"bind_address\": \"nowhere\"");
    assert!(Config::from_json_str(&data).is_err());
}

#[test]
fn test_reload_changes_thresholds_seen_by_tracker() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, VALID_CONFIG).unwrap();

    let store = Arc::new(ConfigStore::with_path(
        Config::load_from(&path).unwrap(),
        path.clone(),
    ));
    let tracker = AlertTracker::new(Arc::clone(&store));
    let warm = Snapshot {
        cpu_temp: 75,
        cpu_freq: 3400,
        ..Default::default()
    };
    assert!(tracker.process(&warm).is_empty());

    fs::write(
        &path,
        VALID_CONFIG.replace("\"warning\": 80, \"critical\": 90", "\"warning\": 72, \"critical\": 90"),
    )
    .unwrap();
    store.reload().unwrap();

    assert_eq!(tracker.process(&warm).len(), 1);
}

#[test]
fn test_invalid_reload_keeps_previous_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, VALID_CONFIG).unwrap();

    let store = ConfigStore::with_path(Config::load_from(&path).unwrap(), path.clone());
    fs::write(&path, "{ broken").unwrap();

    assert!(store.reload().is_err());
    assert_eq!(store.current().thresholds.cpu_temp.warning, 80);
}
