//! TOML configuration for the CraneGuard daemon.
//!
//! Layered model: explicit `--config` path, then the `CRANEGUARD_CONFIG`
//! environment variable, then `/etc/craneguard/craneguard.toml`, then
//! compiled-in defaults. Per-sensor thresholds can also be changed at runtime
//! through the validated [`SensorConfigSet::update`] operation without a
//! restart.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::telemetry::history::DEFAULT_CAPACITY;
use crate::telemetry::source::{
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_TELEMETRY_URL, DEFAULT_TIMEOUT_SECS,
};
use crate::telemetry::SensorKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} threshold for {sensor} must be a finite number")]
    NonFiniteThreshold {
        sensor: SensorKind,
        field: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Per-sensor alerting config
// ---------------------------------------------------------------------------

/// Warning/fault limits for one sensor.
///
/// `inverted` marks sensors where lower readings are worse (proximity and
/// fuel); it is fixed per sensor kind and not externally settable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    pub warning: f64,
    pub fault: f64,
    pub enabled: bool,
    pub inverted: bool,
}

/// Runtime update to a sensor's alerting config. Omitted fields are kept.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SensorUpdate {
    pub warning: Option<f64>,
    pub fault: Option<f64>,
    pub enabled: Option<bool>,
}

/// The full per-sensor threshold table for one monitored unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SensorConfigSet {
    inner: BTreeMap<SensorKind, SensorConfig>,
}

impl Default for SensorConfigSet {
    fn default() -> Self {
        let mut inner = BTreeMap::new();
        for kind in SensorKind::ALL {
            inner.insert(kind, default_sensor_config(kind));
        }
        Self { inner }
    }
}

/// Factory default limits for each sensor.
fn default_sensor_config(kind: SensorKind) -> SensorConfig {
    let (warning, fault, inverted) = match kind {
        SensorKind::Load => (6.0, 8.0, false),
        SensorKind::Vibration => (500.0, 700.0, false),
        SensorKind::Temperature => (35.0, 40.0, false),
        SensorKind::Power => (12.0, 15.0, false),
        SensorKind::Proximity => (15.0, 10.0, true),
        SensorKind::Sound => (40.0, 50.0, false),
        SensorKind::Fuel => (20.0, 10.0, true),
    };
    SensorConfig {
        warning,
        fault,
        enabled: true,
        inverted,
    }
}

impl SensorConfigSet {
    pub fn get(&self, kind: SensorKind) -> SensorConfig {
        self.inner
            .get(&kind)
            .copied()
            .unwrap_or_else(|| default_sensor_config(kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SensorKind, SensorConfig)> + '_ {
        self.inner.iter().map(|(k, c)| (*k, *c))
    }

    /// Apply a validated runtime update. A rejected update leaves the set
    /// untouched.
    pub fn update(
        &mut self,
        kind: SensorKind,
        update: SensorUpdate,
    ) -> Result<SensorConfig, ConfigError> {
        if let Some(warning) = update.warning {
            if !warning.is_finite() {
                return Err(ConfigError::NonFiniteThreshold {
                    sensor: kind,
                    field: "warning",
                });
            }
        }
        if let Some(fault) = update.fault {
            if !fault.is_finite() {
                return Err(ConfigError::NonFiniteThreshold {
                    sensor: kind,
                    field: "fault",
                });
            }
        }

        let entry = self
            .inner
            .entry(kind)
            .or_insert_with(|| default_sensor_config(kind));
        if let Some(warning) = update.warning {
            entry.warning = warning;
        }
        if let Some(fault) = update.fault {
            entry.fault = fault;
        }
        if let Some(enabled) = update.enabled {
            entry.enabled = enabled;
        }
        Ok(*entry)
    }
}

// ---------------------------------------------------------------------------
// Top-level daemon config
// ---------------------------------------------------------------------------

/// Root configuration for the monitoring daemon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub unit: UnitConfig,
    pub telemetry: TelemetryConfig,
    pub history: HistoryConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
    /// Per-sensor overrides of the factory default thresholds.
    pub sensors: BTreeMap<SensorKind, SensorOverride>,
}

/// Identity of the monitored unit this pipeline instance is attached to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    pub id: String,
    pub name: String,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            id: "C-001".to_string(),
            name: "XCMG Truck Crane".to_string(),
        }
    }
}

/// Ingestion endpoint and cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub url: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TELEMETRY_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Tunables for the scoring and maintenance stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Anomaly score above which a reading is flagged as anomalous.
    pub anomaly_cutoff: f64,
    /// Service interval for the maintenance-due check, in operating hours.
    pub maintenance_interval_hours: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            anomaly_cutoff: 50.0,
            maintenance_interval_hours: 500.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// File-level override for one sensor. Fields not present keep the default.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorOverride {
    pub warning: Option<f64>,
    pub fault: Option<f64>,
    pub enabled: Option<bool>,
}

impl MonitorConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded monitor configuration");
        Ok(config)
    }

    /// Resolve configuration from, in order: an explicit path, the
    /// `CRANEGUARD_CONFIG` environment variable, the standard system
    /// location, and finally compiled-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(env_path) = std::env::var("CRANEGUARD_CONFIG") {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "CRANEGUARD_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let system_path = Path::new("/etc/craneguard/craneguard.toml");
        if system_path.exists() {
            match Self::load(system_path) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %system_path.display(),
                        error = %e,
                        "system config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Ok(Self::default())
    }

    /// Build the effective per-sensor threshold table: factory defaults with
    /// the file-level overrides applied. Non-finite overrides are rejected.
    pub fn sensor_configs(&self) -> Result<SensorConfigSet, ConfigError> {
        let mut set = SensorConfigSet::default();
        for (kind, over) in &self.sensors {
            set.update(
                *kind,
                SensorUpdate {
                    warning: over.warning,
                    fault: over.fault,
                    enabled: over.enabled,
                },
            )?;
        }
        Ok(set)
    }
}
