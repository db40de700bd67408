//! Alert lifecycle and statistics.

use tracing::debug;
use uuid::Uuid;

use super::{Alert, AlertError, AlertStatistics, AlertStatus, Severity};

/// Owns the alert set for one monitored unit.
///
/// Candidates from the threshold and trend stages are merged in; status moves
/// strictly forward (New -> Acknowledged -> Resolved) and Resolved is
/// terminal. Alerts are never physically deleted: `resolve_all` is the
/// operator-facing "clear" and only transitions status.
#[derive(Debug, Default)]
pub struct AlertManager {
    alerts: Vec<Alert>,
}

impl AlertManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge candidate alerts into the set. A candidate is dropped when an
    /// active (non-Resolved) alert with the same sensor, source, and severity
    /// already exists, so a persistently-bad reading does not flood the set
    /// on every tick. Returns the number of alerts admitted.
    pub fn merge(&mut self, candidates: Vec<Alert>) -> usize {
        let mut admitted = 0;
        for candidate in candidates {
            let duplicate = self.alerts.iter().any(|existing| {
                existing.status != AlertStatus::Resolved
                    && existing.merge_key() == candidate.merge_key()
            });
            if duplicate {
                continue;
            }
            debug!(
                id = %candidate.id,
                severity = %candidate.severity,
                message = %candidate.message,
                "alert raised"
            );
            self.alerts.push(candidate);
            admitted += 1;
        }
        admitted
    }

    /// Mark an alert Acknowledged. Acknowledging a Resolved (or already
    /// Acknowledged) alert is an idempotent no-op.
    pub fn acknowledge(&mut self, id: Uuid) -> Result<Alert, AlertError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AlertError::Unknown(id))?;
        if alert.status == AlertStatus::New {
            alert.status = AlertStatus::Acknowledged;
        }
        Ok(alert.clone())
    }

    /// Mark an alert Resolved. Resolving a Resolved alert is an idempotent
    /// no-op.
    pub fn resolve(&mut self, id: Uuid) -> Result<Alert, AlertError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AlertError::Unknown(id))?;
        if alert.status != AlertStatus::Resolved {
            alert.status = AlertStatus::Resolved;
        }
        Ok(alert.clone())
    }

    /// Resolve every active alert. Returns how many changed status.
    pub fn resolve_all(&mut self) -> usize {
        let mut changed = 0;
        for alert in &mut self.alerts {
            if alert.status != AlertStatus::Resolved {
                alert.status = AlertStatus::Resolved;
                changed += 1;
            }
        }
        changed
    }

    /// Per-severity counts of non-Resolved alerts.
    pub fn statistics(&self) -> AlertStatistics {
        let mut stats = AlertStatistics::default();
        for alert in &self.alerts {
            if alert.status == AlertStatus::Resolved {
                continue;
            }
            match alert.severity {
                Severity::Critical => stats.critical += 1,
                Severity::Warning => stats.warning += 1,
                Severity::Maintenance => stats.maintenance += 1,
                Severity::Info => stats.info += 1,
            }
        }
        stats
    }

    /// The alert set in listing order: status, then severity, then newest
    /// first.
    pub fn ordered(&self) -> Vec<Alert> {
        let mut list = self.alerts.clone();
        list.sort_by(|a, b| {
            a.status
                .cmp(&b.status)
                .then(a.severity.cmp(&b.severity))
                .then(b.created_at.cmp(&a.created_at))
        });
        list
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertSource;
    use crate::telemetry::SensorKind;
    use chrono::{Duration, Utc};

    fn alert(severity: Severity, sensor: SensorKind) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            sensor: Some(sensor),
            unit: "C-001".to_string(),
            component: "Boom".to_string(),
            value: 9.0,
            threshold: 8.0,
            severity,
            status: AlertStatus::New,
            source: AlertSource::Threshold,
            message: "test".to_string(),
            recommendation: "test".to_string(),
            created_at: Utc::now(),
            trend: None,
        }
    }

    #[test]
    fn test_merge_deduplicates_active_alerts() {
        let mut manager = AlertManager::new();
        assert_eq!(
            manager.merge(vec![alert(Severity::Critical, SensorKind::Load)]),
            1
        );
        // Same sensor/source/severity while still active: dropped.
        assert_eq!(
            manager.merge(vec![alert(Severity::Critical, SensorKind::Load)]),
            0
        );
        // Different severity for the same sensor is a new alert.
        assert_eq!(
            manager.merge(vec![alert(Severity::Warning, SensorKind::Load)]),
            1
        );
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_merge_readmits_after_resolution() {
        let mut manager = AlertManager::new();
        manager.merge(vec![alert(Severity::Critical, SensorKind::Load)]);
        let id = manager.ordered()[0].id;
        manager.resolve(id).unwrap();
        assert_eq!(
            manager.merge(vec![alert(Severity::Critical, SensorKind::Load)]),
            1
        );
    }

    #[test]
    fn test_lifecycle_is_forward_only() {
        let mut manager = AlertManager::new();
        manager.merge(vec![alert(Severity::Warning, SensorKind::Sound)]);
        let id = manager.ordered()[0].id;

        let acked = manager.acknowledge(id).unwrap();
        assert_eq!(acked.status, AlertStatus::Acknowledged);

        let resolved = manager.resolve(id).unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);

        // Resolved is terminal: further transitions are no-ops.
        let still = manager.acknowledge(id).unwrap();
        assert_eq!(still.status, AlertStatus::Resolved);
        let still = manager.resolve(id).unwrap();
        assert_eq!(still.status, AlertStatus::Resolved);
    }

    #[test]
    fn test_acknowledge_may_be_skipped() {
        let mut manager = AlertManager::new();
        manager.merge(vec![alert(Severity::Warning, SensorKind::Sound)]);
        let id = manager.ordered()[0].id;
        let resolved = manager.resolve(id).unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let mut manager = AlertManager::new();
        let missing = Uuid::new_v4();
        assert!(matches!(
            manager.acknowledge(missing),
            Err(AlertError::Unknown(id)) if id == missing
        ));
        assert!(manager.resolve(missing).is_err());
    }

    #[test]
    fn test_statistics_exclude_resolved() {
        let mut manager = AlertManager::new();
        manager.merge(vec![
            alert(Severity::Critical, SensorKind::Load),
            alert(Severity::Warning, SensorKind::Sound),
            alert(Severity::Info, SensorKind::Fuel),
        ]);

        let stats = manager.statistics();
        assert_eq!((stats.critical, stats.warning, stats.info), (1, 1, 1));
        assert_eq!(stats.total(), 3);

        let id = manager
            .ordered()
            .iter()
            .find(|a| a.severity == Severity::Critical)
            .unwrap()
            .id;
        manager.resolve(id).unwrap();

        let stats = manager.statistics();
        assert_eq!(stats.critical, 0);
        assert_eq!(stats.total(), 2);
    }

    #[test]
    fn test_resolve_all_clears_active_only_once() {
        let mut manager = AlertManager::new();
        manager.merge(vec![
            alert(Severity::Critical, SensorKind::Load),
            alert(Severity::Warning, SensorKind::Sound),
        ]);
        assert_eq!(manager.resolve_all(), 2);
        assert_eq!(manager.resolve_all(), 0);
        assert_eq!(manager.statistics().total(), 0);
        // Alerts are transitioned, not deleted.
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_listing_order() {
        let mut manager = AlertManager::new();

        let mut resolved_critical = alert(Severity::Critical, SensorKind::Load);
        resolved_critical.status = AlertStatus::Resolved;
        let mut old_warning = alert(Severity::Warning, SensorKind::Sound);
        old_warning.created_at = Utc::now() - Duration::minutes(10);
        let new_warning = alert(Severity::Warning, SensorKind::Vibration);
        let info = alert(Severity::Info, SensorKind::Fuel);

        manager.merge(vec![
            info.clone(),
            resolved_critical.clone(),
            old_warning.clone(),
            new_warning.clone(),
        ]);

        let listed = manager.ordered();
        // New before Resolved; within New, Warning before Info; within the
        // Warnings, newest first.
        assert_eq!(listed[0].id, new_warning.id);
        assert_eq!(listed[1].id, old_warning.id);
        assert_eq!(listed[2].id, info.id);
        assert_eq!(listed[3].id, resolved_critical.id);
    }
}
