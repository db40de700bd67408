//! Telemetry model -- sensor kinds, snapshots, history, and ingestion sources.

pub mod history;
pub mod source;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of sensors fitted to a monitored unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Load,
    Vibration,
    Temperature,
    Power,
    Proximity,
    Sound,
    Fuel,
}

impl SensorKind {
    pub const ALL: [SensorKind; 7] = [
        SensorKind::Load,
        SensorKind::Vibration,
        SensorKind::Temperature,
        SensorKind::Power,
        SensorKind::Proximity,
        SensorKind::Sound,
        SensorKind::Fuel,
    ];

    /// Human-readable sensor name for messages and listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            SensorKind::Load => "Load",
            SensorKind::Vibration => "Vibration",
            SensorKind::Temperature => "Temperature",
            SensorKind::Power => "Power",
            SensorKind::Proximity => "Proximity",
            SensorKind::Sound => "Sound Level",
            SensorKind::Fuel => "Fuel Level",
        }
    }

    /// Measurement unit as reported by the field hardware.
    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Load => "kg",
            SensorKind::Vibration => "Hz",
            SensorKind::Temperature => "\u{b0}C",
            SensorKind::Power => "V",
            SensorKind::Proximity => "cm",
            SensorKind::Sound => "dB",
            SensorKind::Fuel => "L",
        }
    }

    /// Parse the snake_case identifier used in config files and API paths.
    pub fn parse(s: &str) -> Option<SensorKind> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Load => "load",
            SensorKind::Vibration => "vibration",
            SensorKind::Temperature => "temperature",
            SensorKind::Power => "power",
            SensorKind::Proximity => "proximity",
            SensorKind::Sound => "sound",
            SensorKind::Fuel => "fuel",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped set of readings for a monitored unit.
///
/// Snapshots are immutable once recorded; the ingestion boundary fills any
/// missing field with 0 (see [`source`]), so every field is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub vibration: f64,
    pub load: f64,
    pub power: f64,
    pub proximity: f64,
    pub sound: f64,
    pub fuel: f64,
    /// Cumulative operating hours for the unit, monotonically increasing.
    pub operating_hours: f64,
}

impl SensorSnapshot {
    pub fn value(&self, kind: SensorKind) -> f64 {
        match kind {
            SensorKind::Load => self.load,
            SensorKind::Vibration => self.vibration,
            SensorKind::Temperature => self.temperature,
            SensorKind::Power => self.power,
            SensorKind::Proximity => self.proximity,
            SensorKind::Sound => self.sound,
            SensorKind::Fuel => self.fuel,
        }
    }
}
