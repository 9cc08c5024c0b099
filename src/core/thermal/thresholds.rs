//! Alert thresholds, loaded with the configuration and never mutated in place.

use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};

/// Warning and critical boundaries for a temperature (°C). When the section
/// is present both levels must be given; an omitted section uses the
/// per-sensor defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureLevels {
    pub warning: i64,
    pub critical: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyLevels {
    /// Below this frequency (MHz) the CPU counts as throttling
    #[serde(default = "default_throttling_threshold")]
    pub throttling_threshold: i64,
}

impl Default for FrequencyLevels {
    fn default() -> Self {
        Self {
            throttling_threshold: default_throttling_threshold(),
        }
    }
}

/// Load average bands. Entering `high` is silent; dropping under `normal`
/// after a high period raises the completion alert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadLevels {
    #[serde(default = "default_load_high")]
    pub high: f64,
    #[serde(default = "default_load_normal")]
    pub normal: f64,
}

impl Default for LoadLevels {
    fn default() -> Self {
        Self {
            high: default_load_high(),
            normal: default_load_normal(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    #[serde(default = "default_cpu_temp")]
    pub cpu_temp: TemperatureLevels,
    #[serde(default = "default_socket_temp")]
    pub socket_temp: TemperatureLevels,
    #[serde(default)]
    pub cpu_freq: FrequencyLevels,
    #[serde(default)]
    pub load_avg: LoadLevels,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            cpu_temp: default_cpu_temp(),
            socket_temp: default_socket_temp(),
            cpu_freq: FrequencyLevels::default(),
            load_avg: LoadLevels::default(),
        }
    }
}

impl ThresholdSet {
    pub fn validate(&self) -> Result<()> {
        for (name, levels) in [("cpu_temp", &self.cpu_temp), ("socket_temp", &self.socket_temp)] {
            if levels.warning > levels.critical {
                return Err(HubError::config(format!(
                    "thresholds.{name}.warning ({}) must not exceed critical ({})",
                    levels.warning, levels.critical
                )));
            }
        }

        if self.cpu_freq.throttling_threshold < 0 {
            return Err(HubError::config(
                "thresholds.cpu_freq.throttling_threshold must be non-negative",
            ));
        }

        let load = &self.load_avg;
        if !load.high.is_finite() || !load.normal.is_finite() {
            return Err(HubError::config("thresholds.load_avg values must be finite"));
        }
        if load.normal > load.high {
            return Err(HubError::config(format!(
                "thresholds.load_avg.normal ({}) must not exceed high ({})",
                load.normal, load.high
            )));
        }

        Ok(())
    }
}

fn default_cpu_temp() -> TemperatureLevels {
    TemperatureLevels {
        warning: 80,
        critical: 90,
    }
}

fn default_socket_temp() -> TemperatureLevels {
    TemperatureLevels {
        warning: 70,
        critical: 85,
    }
}

fn default_throttling_threshold() -> i64 {
    3000
}

fn default_load_high() -> f64 {
    3.0
}

fn default_load_normal() -> f64 {
    1.0
}
