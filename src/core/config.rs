use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::thermal::{CompletionText, NotificationType, Priority, ThresholdSet};
use crate::error::{HubError, Result};

/// Top-level sections that must be present in the config file
pub const REQUIRED_SECTIONS: [&str; 4] = ["homeassistant", "thresholds", "monitoring", "sensors"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub homeassistant: SinkConfig,
    pub thresholds: ThresholdSet,
    pub monitoring: MonitoringConfig,
    pub sensors: SensorConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Home Assistant connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    pub url: String,
    pub token: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Service under `notify.` used for notifications
    #[serde(default = "default_notify_service")]
    pub notify_service: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            url: "http://homeassistant.local:8123".to_string(),
            token: String::new(),
            timeout: default_timeout(),
            notify_service: default_notify_service(),
        }
    }
}

impl SinkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Poll interval for the data file, in seconds
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_true")]
    pub enable_file_monitor: bool,
    #[serde(default = "default_true")]
    pub enable_http_server: bool,
    /// Delay between sink connection attempts at startup, in seconds
    #[serde(default = "default_connect_retry")]
    pub connect_retry_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            interval: default_interval(),
            http_port: default_http_port(),
            bind_address: default_bind_address(),
            enable_file_monitor: true,
            enable_http_server: true,
            connect_retry_secs: default_connect_retry(),
        }
    }
}

impl MonitoringConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn connect_retry(&self) -> Duration {
        Duration::from_secs(self.connect_retry_secs)
    }

    /// Socket address of the push listener
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind_address.parse().map_err(|e| {
            HubError::config(format!(
                "monitoring.bind_address '{}' is invalid: {}",
                self.bind_address, e
            ))
        })?;
        Ok(SocketAddr::new(ip, self.http_port))
    }
}

/// Where the local metrics source reads from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
    #[serde(default)]
    pub thermal_zone_socket: u32,
    #[serde(default = "default_cpu_zone")]
    pub thermal_zone_cpu: u32,
    #[serde(default = "default_cooling_devices")]
    pub cooling_devices: Vec<u32>,
    /// Prefix of the published sensor entity ids
    #[serde(default = "default_entity_prefix")]
    pub entity_prefix: String,
    /// Device label used in sensor friendly names
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            sysfs_root: default_sysfs_root(),
            thermal_zone_socket: 0,
            thermal_zone_cpu: default_cpu_zone(),
            cooling_devices: default_cooling_devices(),
            entity_prefix: default_entity_prefix(),
            device_name: default_device_name(),
        }
    }
}

/// Rate-limit windows per priority, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    #[serde(default = "default_critical_window")]
    pub critical: u64,
    #[serde(default = "default_high_window")]
    pub high: u64,
    #[serde(default = "default_normal_window")]
    pub normal: u64,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            critical: default_critical_window(),
            high: default_high_window(),
            normal: default_normal_window(),
        }
    }
}

impl RateLimits {
    pub fn window(&self, priority: Priority) -> Duration {
        let secs = match priority {
            Priority::Critical => self.critical,
            Priority::High => self.high,
            Priority::Normal => self.normal,
        };
        Duration::from_secs(secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub rate_limit: RateLimits,
    #[serde(default = "default_enabled_types")]
    pub enabled_types: HashSet<NotificationType>,
    #[serde(default)]
    pub workload_complete: CompletionText,
    /// Tag attached to every notification payload
    #[serde(default = "default_tag")]
    pub tag: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimits::default(),
            enabled_types: default_enabled_types(),
            workload_complete: CompletionText::default(),
            tag: default_tag(),
        }
    }
}

impl NotificationConfig {
    pub fn is_enabled(&self, notification_type: NotificationType) -> bool {
        self.enabled_types.contains(&notification_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional file that receives log lines instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub console: bool,
    /// Size at which the log file rolls over, e.g. `10MB`
    #[serde(default = "default_log_max_size")]
    pub max_size: String,
    /// Rolled files kept next to the active one; 0 disables rotation
    #[serde(default = "default_log_backup_count")]
    pub backup_count: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            console: true,
            max_size: default_log_max_size(),
            backup_count: default_log_backup_count(),
        }
    }
}

impl LoggingConfig {
    pub fn max_bytes(&self) -> Result<u64> {
        parse_size(&self.max_size)
    }
}

/// Parse a size such as `10MB`, `512kb`, `1.5GB` or a bare byte count.
pub fn parse_size(text: &str) -> Result<u64> {
    const UNITS: [(&str, f64); 4] = [
        ("GB", 1024.0 * 1024.0 * 1024.0),
        ("MB", 1024.0 * 1024.0),
        ("KB", 1024.0),
        ("B", 1.0),
    ];

    let upper = text.trim().to_ascii_uppercase();
    let (number, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, multiplier)| {
            upper
                .strip_suffix(suffix)
                .map(|number| (number.trim(), *multiplier))
        })
        .unwrap_or((upper.as_str(), 1.0));

    let value: f64 = number
        .parse()
        .map_err(|_| HubError::config(format!("logging.max_size '{}' is not a size", text)))?;
    let bytes = (value * multiplier) as u64;
    if !value.is_finite() || bytes == 0 {
        return Err(HubError::config(format!(
            "logging.max_size '{}' must be greater than 0",
            text
        )));
    }
    Ok(bytes)
}

impl Config {
    /// Load and validate the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HubError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let data = fs::read_to_string(path).map_err(|e| {
            HubError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(data)
            .map_err(|e| HubError::config(format!("Invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| HubError::config("Configuration root must be a JSON object"))?;

        let missing: Vec<&str> = REQUIRED_SECTIONS
            .iter()
            .copied()
            .filter(|key| !object.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(HubError::config(format!(
                "Missing configuration keys: {:?}",
                missing
            )));
        }

        let config: Config =
            serde_json::from_value(value).map_err(|e| HubError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let sink = &self.homeassistant;
        url::Url::parse(&sink.url)
            .map_err(|e| HubError::config(format!("homeassistant.url is invalid: {}", e)))?;
        if sink.token.trim().is_empty() {
            return Err(HubError::config("homeassistant.token must not be empty"));
        }
        if sink.timeout == 0 {
            return Err(HubError::config("homeassistant.timeout must be greater than 0"));
        }
        if self.monitoring.interval == 0 {
            return Err(HubError::config("monitoring.interval must be greater than 0"));
        }
        if self.monitoring.connect_retry_secs == 0 {
            return Err(HubError::config(
                "monitoring.connect_retry_secs must be greater than 0",
            ));
        }
        self.monitoring.listen_addr()?;
        self.logging.max_bytes()?;

        self.thresholds.validate()
    }

    /// Resolve the config file location: explicit path or the user config dir.
    pub fn resolve_path(explicit: Option<&str>) -> anyhow::Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(PathBuf::from(path));
        }

        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("thermal-hub").join("config.json"))
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    10
}

fn default_notify_service() -> String {
    "notify".to_string()
}

fn default_data_file() -> PathBuf {
    PathBuf::from("/tmp/nucbox-thermal.json")
}

fn default_interval() -> u64 {
    30
}

fn default_http_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_connect_retry() -> u64 {
    30
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from("/sys/class/thermal")
}

fn default_cpu_zone() -> u32 {
    1
}

fn default_cooling_devices() -> Vec<u32> {
    vec![0, 1, 2, 3, 4]
}

fn default_entity_prefix() -> String {
    "nucbox".to_string()
}

fn default_device_name() -> String {
    "NucBox".to_string()
}

fn default_critical_window() -> u64 {
    300
}

fn default_high_window() -> u64 {
    600
}

fn default_normal_window() -> u64 {
    900
}

fn default_enabled_types() -> HashSet<NotificationType> {
    HashSet::from([
        NotificationType::TemperatureCritical,
        NotificationType::TemperatureWarning,
        NotificationType::FanStateChange,
        NotificationType::ThrottlingChange,
        NotificationType::WorkloadComplete,
    ])
}

fn default_tag() -> String {
    "nucbox-thermal".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_max_size() -> String {
    "10MB".to_string()
}

fn default_log_backup_count() -> usize {
    5
}
