//! Local metrics source backed by the thermal sysfs tree and sysinfo.
//!
//! Temperatures come from `thermal_zone<N>/temp` (millidegrees), fan state from
//! `cooling_device<N>/cur_state`. CPU frequency and the 1-minute load average
//! go through sysinfo. Anything unreadable is logged and zero-filled.

use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::{CpuRefreshKind, RefreshKind, System};

use crate::core::config::SensorConfig;
use crate::core::thermal::Snapshot;
use crate::error::{HubError, Result};

/// Produces a snapshot on demand
pub trait MetricsSource: Send {
    fn read(&mut self) -> Snapshot;
}

pub struct SysfsMetricsSource {
    root: PathBuf,
    socket_zone: u32,
    cpu_zone: u32,
    cooling_devices: Vec<u32>,
    system: System,
}

impl SysfsMetricsSource {
    pub fn new(config: &SensorConfig) -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing().with_frequency()),
        );

        Self {
            root: config.sysfs_root.clone(),
            socket_zone: config.thermal_zone_socket,
            cpu_zone: config.thermal_zone_cpu,
            cooling_devices: config.cooling_devices.clone(),
            system,
        }
    }

    fn read_temperature(&self, zone: u32) -> i64 {
        let path = self.root.join(format!("thermal_zone{}", zone)).join("temp");
        match read_integer(&path) {
            Ok(millidegrees) => millidegrees / 1000,
            Err(e) => {
                log::warn!("Temperature unavailable for zone {}: {}", zone, e);
                0
            }
        }
    }

    /// Per-device codes concatenated, plus whether any device is active
    fn read_fan_states(&self) -> (String, bool) {
        let mut states = String::new();
        let mut active = false;

        for device in &self.cooling_devices {
            let path = self
                .root
                .join(format!("cooling_device{}", device))
                .join("cur_state");
            let state = read_integer(&path).unwrap_or_else(|e| {
                log::warn!("Cooling device {} unavailable: {}", device, e);
                0
            });
            active |= state > 0;
            states.push_str(&state.to_string());
        }

        (states, active)
    }

    fn read_cpu_frequency(&mut self) -> i64 {
        self.system
            .refresh_cpu_specifics(CpuRefreshKind::nothing().with_frequency());
        match self.system.cpus().first() {
            Some(cpu) => cpu.frequency() as i64,
            None => {
                log::warn!("CPU frequency unavailable");
                0
            }
        }
    }
}

impl MetricsSource for SysfsMetricsSource {
    fn read(&mut self) -> Snapshot {
        let (fan_states, fan_active) = self.read_fan_states();

        Snapshot {
            timestamp: chrono::Utc::now().timestamp(),
            socket_temp: self.read_temperature(self.socket_zone),
            cpu_temp: self.read_temperature(self.cpu_zone),
            fan_active,
            fan_states,
            cpu_freq: self.read_cpu_frequency(),
            load_avg: System::load_average().one,
        }
    }
}

fn read_integer(path: &Path) -> Result<i64> {
    let text = fs::read_to_string(path)?;
    text.trim()
        .parse()
        .map_err(|e| HubError::other(format!("{}: {}", path.display(), e)))
}
