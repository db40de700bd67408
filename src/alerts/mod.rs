//! Alert model, threshold evaluation, trend detection, and lifecycle.

pub mod manager;
pub mod threshold;
pub mod trend;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::telemetry::SensorKind;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("unknown alert id: {0}")]
    Unknown(Uuid),
}

/// Alert severity. Declaration order is the listing order: Critical ranks
/// before Warning, Warning before Maintenance, Maintenance before Info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Critical,
    Warning,
    Maintenance,
    Info,
}

impl Severity {
    /// Case-insensitive parse for the operator-facing boundary.
    pub fn parse(s: &str) -> Option<Severity> {
        [
            Severity::Critical,
            Severity::Warning,
            Severity::Maintenance,
            Severity::Info,
        ]
        .into_iter()
        .find(|sev| sev.as_str().eq_ignore_ascii_case(s))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Warning => "Warning",
            Severity::Maintenance => "Maintenance",
            Severity::Info => "Info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-facing lifecycle of an alert. Transitions are forward-only and
/// Resolved is terminal. Declaration order is the listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AlertStatus {
    New,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::New => "New",
            AlertStatus::Acknowledged => "Acknowledged",
            AlertStatus::Resolved => "Resolved",
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pipeline stage raised the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AlertSource {
    Threshold,
    Trend,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

/// Slope evidence attached to trend-sourced alerts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendInfo {
    pub slope: f64,
    pub direction: TrendDirection,
}

/// One alert raised against a monitored unit.
///
/// Identity is assigned at creation and stable for the alert's lifetime.
/// Only the lifecycle manager mutates `status`.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: Uuid,
    /// `None` for unit-wide alerts (the maintenance-due notification).
    pub sensor: Option<SensorKind>,
    /// Monitored unit this pipeline instance is attached to, e.g. `C-001`.
    pub unit: String,
    /// Implicated subsystem, e.g. `Hydraulic System`.
    pub component: String,
    pub value: f64,
    pub threshold: f64,
    pub severity: Severity,
    pub status: AlertStatus,
    pub source: AlertSource,
    pub message: String,
    pub recommendation: String,
    pub created_at: DateTime<Utc>,
    pub trend: Option<TrendInfo>,
}

impl Alert {
    /// Merge key: one active alert per (sensor, source, severity).
    pub(crate) fn merge_key(&self) -> (Option<SensorKind>, AlertSource, Severity) {
        (self.sensor, self.source, self.severity)
    }
}

/// Counts of non-Resolved alerts by severity. Pure derived view, recomputed
/// whenever the alert set changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertStatistics {
    pub critical: usize,
    pub warning: usize,
    pub maintenance: usize,
    pub info: usize,
}

impl AlertStatistics {
    pub fn total(&self) -> usize {
        self.critical + self.warning + self.maintenance + self.info
    }
}

/// Subsystem implicated by each sensor kind, per the fleet equipment sheet.
pub(crate) fn implicated_component(kind: SensorKind) -> &'static str {
    match kind {
        SensorKind::Load => "Boom",
        SensorKind::Vibration => "Mast (Tower)",
        SensorKind::Temperature => "Hydraulic System",
        SensorKind::Power => "Hydraulic System",
        SensorKind::Proximity => "Chassis & Suspension",
        SensorKind::Sound => "Operator Cabin",
        SensorKind::Fuel => "Fuel System",
    }
}
