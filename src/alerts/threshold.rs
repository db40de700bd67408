//! Threshold alert engine: static warning/fault limits plus the
//! maintenance-interval check.

use chrono::Utc;
use uuid::Uuid;

use crate::config::{SensorConfig, SensorConfigSet};
use crate::telemetry::{SensorKind, SensorSnapshot};

use super::{implicated_component, Alert, AlertSource, AlertStatus, Severity};

/// Which limit a reading breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Breach {
    Fault,
    Warning,
}

/// Evaluates one snapshot against the per-sensor limits and tracks the
/// operating-hours counter for the maintenance-due check.
pub struct ThresholdEngine {
    unit: String,
    maintenance_interval: f64,
    last_hours: Option<f64>,
}

impl ThresholdEngine {
    pub fn new(unit: impl Into<String>, maintenance_interval: f64) -> Self {
        Self {
            unit: unit.into(),
            maintenance_interval,
            last_hours: None,
        }
    }

    /// Compare each enabled sensor against its limits. At most one alert per
    /// sensor per evaluation: the fault check takes priority over warning.
    pub fn evaluate(&mut self, snapshot: &SensorSnapshot, configs: &SensorConfigSet) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for (kind, cfg) in configs.iter() {
            if !cfg.enabled {
                continue;
            }
            let value = snapshot.value(kind);
            if let Some(breach) = check_breach(value, &cfg) {
                alerts.push(self.build_alert(kind, value, &cfg, breach));
            }
        }

        if let Some(alert) = self.maintenance_due(snapshot.operating_hours) {
            alerts.push(alert);
        }

        alerts
    }

    fn build_alert(&self, kind: SensorKind, value: f64, cfg: &SensorConfig, breach: Breach) -> Alert {
        let (severity, threshold) = match breach {
            Breach::Fault => (Severity::Critical, cfg.fault),
            Breach::Warning => (Severity::Warning, cfg.warning),
        };
        let (message, recommendation) = breach_text(kind, breach);
        Alert {
            id: Uuid::new_v4(),
            sensor: Some(kind),
            unit: self.unit.clone(),
            component: implicated_component(kind).to_string(),
            value,
            threshold,
            severity,
            status: AlertStatus::New,
            source: AlertSource::Threshold,
            message: message.to_string(),
            recommendation: recommendation.to_string(),
            created_at: Utc::now(),
            trend: None,
        }
    }

    /// Emit one Maintenance alert when the operating-hours counter crosses a
    /// multiple of the service interval between consecutive evaluations. The
    /// first evaluation only records the counter, so a restart mid-interval
    /// does not re-raise old notifications.
    fn maintenance_due(&mut self, hours: f64) -> Option<Alert> {
        let previous = self.last_hours.replace(hours);
        let previous = previous?;
        if self.maintenance_interval <= 0.0 {
            return None;
        }

        let crossed =
            (hours / self.maintenance_interval).floor() > (previous / self.maintenance_interval).floor();
        if !crossed {
            return None;
        }

        let due_at = (hours / self.maintenance_interval).floor() * self.maintenance_interval;
        Some(Alert {
            id: Uuid::new_v4(),
            sensor: None,
            unit: self.unit.clone(),
            component: "All Systems".to_string(),
            value: hours,
            threshold: due_at,
            severity: Severity::Maintenance,
            status: AlertStatus::New,
            source: AlertSource::Maintenance,
            message: "Scheduled maintenance required".to_string(),
            recommendation: format!(
                "Schedule {:.0}-hour maintenance check",
                self.maintenance_interval
            ),
            created_at: Utc::now(),
            trend: None,
        })
    }
}

fn check_breach(value: f64, cfg: &SensorConfig) -> Option<Breach> {
    if cfg.inverted {
        // Lower readings are worse (proximity, fuel).
        if value <= cfg.fault {
            Some(Breach::Fault)
        } else if value <= cfg.warning {
            Some(Breach::Warning)
        } else {
            None
        }
    } else if value >= cfg.fault {
        Some(Breach::Fault)
    } else if value >= cfg.warning {
        Some(Breach::Warning)
    } else {
        None
    }
}

fn breach_text(kind: SensorKind, breach: Breach) -> (&'static str, &'static str) {
    match (kind, breach) {
        (SensorKind::Temperature, Breach::Fault) => (
            "Temperature exceeds critical threshold",
            "Shut down system and check cooling system immediately",
        ),
        (SensorKind::Temperature, Breach::Warning) => (
            "Temperature approaching critical level",
            "Check cooling system and reduce load",
        ),
        (SensorKind::Vibration, Breach::Fault) => (
            "Excessive vibration detected",
            "Stop operation immediately and inspect for structural issues",
        ),
        (SensorKind::Vibration, Breach::Warning) => (
            "Vibration above normal range",
            "Check motor mounts and balance rotating parts",
        ),
        (SensorKind::Load, Breach::Fault) => (
            "Load exceeds maximum capacity",
            "Reduce load immediately to prevent structural damage",
        ),
        (SensorKind::Load, Breach::Warning) => (
            "Load approaching maximum capacity",
            "Reduce load to prevent structural damage",
        ),
        (SensorKind::Power, Breach::Fault) => (
            "Voltage exceeds safe operating limit",
            "Inspect power supply and voltage regulators",
        ),
        (SensorKind::Power, Breach::Warning) => (
            "Voltage above normal range",
            "Monitor power supply for fluctuations",
        ),
        (SensorKind::Proximity, Breach::Fault) => (
            "Object dangerously close",
            "Ensure safe distance to avoid collisions",
        ),
        (SensorKind::Proximity, Breach::Warning) => (
            "Object within warning distance",
            "Verify clearance around the equipment",
        ),
        (SensorKind::Sound, Breach::Fault) => (
            "Sound level exceeds critical threshold",
            "Lubricate moving parts and inspect for loose components",
        ),
        (SensorKind::Sound, Breach::Warning) => (
            "Sound level above normal range",
            "Inspect for loose or worn components",
        ),
        (SensorKind::Fuel, Breach::Fault) => (
            "Fuel level critically low",
            "Refuel immediately to prevent system shutdown",
        ),
        (SensorKind::Fuel, Breach::Warning) => (
            "Fuel level low",
            "Schedule refueling before next shift",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot() -> SensorSnapshot {
        // Everything nominal with the default thresholds.
        SensorSnapshot {
            timestamp: Utc::now(),
            temperature: 25.0,
            vibration: 300.0,
            load: 4.0,
            power: 10.0,
            proximity: 20.0,
            sound: 30.0,
            fuel: 50.0,
            operating_hours: 100.0,
        }
    }

    fn engine() -> ThresholdEngine {
        ThresholdEngine::new("C-001", 500.0)
    }

    #[test]
    fn test_nominal_snapshot_raises_nothing() {
        let alerts = engine().evaluate(&snapshot(), &SensorConfigSet::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_single_critical_for_temperature_fault() {
        let mut s = snapshot();
        s.temperature = 42.0;
        let alerts = engine().evaluate(&s, &SensorConfigSet::default());

        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.sensor, Some(SensorKind::Temperature));
        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.status, AlertStatus::New);
        assert_eq!(alert.source, AlertSource::Threshold);
        assert_eq!(alert.value, 42.0);
        assert_eq!(alert.threshold, 40.0);
        assert_eq!(alert.component, "Hydraulic System");
    }

    #[test]
    fn test_fault_takes_priority_over_warning() {
        let mut s = snapshot();
        s.vibration = 750.0; // above both 500 and 700
        let alerts = engine().evaluate(&s, &SensorConfigSet::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Critical);
    }

    #[test]
    fn test_boundary_value_is_inclusive() {
        let mut s = snapshot();
        s.temperature = 40.0;
        let alerts = engine().evaluate(&s, &SensorConfigSet::default());
        assert_eq!(alerts[0].severity, Severity::Critical);

        let mut s = snapshot();
        s.temperature = 35.0;
        let alerts = engine().evaluate(&s, &SensorConfigSet::default());
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_inverted_sensor_comparison() {
        let mut s = snapshot();
        s.proximity = 9.0; // <= fault (10)
        let alerts = engine().evaluate(&s, &SensorConfigSet::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].sensor, Some(SensorKind::Proximity));
        assert_eq!(alerts[0].severity, Severity::Critical);

        let mut s = snapshot();
        s.fuel = 15.0; // between fault (10) and warning (20)
        let alerts = engine().evaluate(&s, &SensorConfigSet::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].sensor, Some(SensorKind::Fuel));
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_disabled_sensor_is_skipped() {
        let mut configs = SensorConfigSet::default();
        configs
            .update(
                SensorKind::Temperature,
                crate::config::SensorUpdate {
                    enabled: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        let mut s = snapshot();
        s.temperature = 42.0;
        let alerts = engine().evaluate(&s, &configs);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_maintenance_fires_on_interval_crossing() {
        let mut engine = engine();
        let configs = SensorConfigSet::default();

        let mut s = snapshot();
        s.operating_hours = 498.0;
        assert!(engine.evaluate(&s, &configs).is_empty());

        s.operating_hours = 502.0;
        let alerts = engine.evaluate(&s, &configs);
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.severity, Severity::Maintenance);
        assert_eq!(alert.source, AlertSource::Maintenance);
        assert_eq!(alert.sensor, None);
        assert_eq!(alert.threshold, 500.0);

        // Does not fire twice for the same service point.
        s.operating_hours = 503.0;
        assert!(engine.evaluate(&s, &configs).is_empty());
    }

    #[test]
    fn test_maintenance_not_missed_when_window_skipped() {
        let mut engine = engine();
        let configs = SensorConfigSet::default();

        // Counter jumps clear across the 500 h mark between ticks.
        let mut s = snapshot();
        s.operating_hours = 490.0;
        engine.evaluate(&s, &configs);
        s.operating_hours = 540.0;
        let alerts = engine.evaluate(&s, &configs);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Maintenance);
    }

    #[test]
    fn test_maintenance_silent_on_first_evaluation() {
        let mut engine = engine();
        let mut s = snapshot();
        s.operating_hours = 1507.0;
        assert!(engine.evaluate(&s, &SensorConfigSet::default()).is_empty());
    }
}
