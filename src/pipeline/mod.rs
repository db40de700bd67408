//! The per-unit analytics pipeline.
//!
//! One [`Monitor`] instance owns all mutable state for a monitored unit: the
//! history window, the alert set, the sensor config table, and maintenance
//! bookkeeping. It is constructed per unit and passed around by handle, never
//! reached through global state. Within a tick the stages run strictly in
//! sequence: history append, threshold evaluation, trend detection, scoring,
//! RUL estimation.

pub mod ticker;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::alerts::manager::AlertManager;
use crate::alerts::threshold::ThresholdEngine;
use crate::alerts::trend::TrendDetector;
use crate::alerts::{Alert, AlertError, AlertStatistics};
use crate::analysis::health::{AnomalyReport, Scorer};
use crate::analysis::rul::{RulEstimate, RulEstimator};
use crate::config::{ConfigError, MonitorConfig, SensorConfig, SensorConfigSet, SensorUpdate};
use crate::telemetry::history::HistoryWindow;
use crate::telemetry::{SensorKind, SensorSnapshot};

/// Everything the presentation layer needs from one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub unit: String,
    pub snapshot: SensorSnapshot,
    pub history: Vec<SensorSnapshot>,
    pub alerts: Vec<Alert>,
    pub statistics: AlertStatistics,
    pub health: f64,
    pub anomaly: AnomalyReport,
    pub rul: RulEstimate,
}

pub struct Monitor {
    unit: String,
    history: HistoryWindow,
    configs: SensorConfigSet,
    thresholds: ThresholdEngine,
    trends: TrendDetector,
    scorer: Scorer,
    rul: RulEstimator,
    manager: AlertManager,
    last_report: Option<TickReport>,
}

impl Monitor {
    pub fn new(config: &MonitorConfig) -> Result<Self, ConfigError> {
        let unit = config.unit.id.clone();
        let scorer = Scorer::new(config.analysis.anomaly_cutoff);
        Ok(Self {
            configs: config.sensor_configs()?,
            history: HistoryWindow::new(config.history.capacity),
            thresholds: ThresholdEngine::new(unit.as_str(), config.analysis.maintenance_interval_hours),
            trends: TrendDetector::new(unit.as_str()),
            scorer,
            rul: RulEstimator::new(scorer),
            manager: AlertManager::new(),
            last_report: None,
            unit,
        })
    }

    /// Run one full pipeline pass over a freshly ingested snapshot.
    pub fn observe(&mut self, snapshot: SensorSnapshot) -> TickReport {
        self.history.append(snapshot.clone());

        let mut candidates = self.thresholds.evaluate(&snapshot, &self.configs);
        candidates.extend(self.trends.detect(&self.history, &self.configs));
        let admitted = self.manager.merge(candidates);

        let scores = self.scorer.score(&snapshot);
        let statistics = self.manager.statistics();
        let rul = self.rul.estimate(&self.history, statistics.total());

        debug!(
            unit = %self.unit,
            health = scores.health,
            anomaly = scores.anomaly.score,
            rul_hours = rul.hours,
            new_alerts = admitted,
            "tick complete"
        );

        let report = TickReport {
            unit: self.unit.clone(),
            snapshot,
            history: self.history.snapshot_vec(),
            alerts: self.manager.ordered(),
            statistics,
            health: scores.health,
            anomaly: scores.anomaly,
            rul,
        };
        self.last_report = Some(report.clone());
        report
    }

    /// Last known operating-hours counter, for ingestion fallbacks.
    pub fn previous_hours(&self) -> f64 {
        self.history.latest().map_or(0.0, |s| s.operating_hours)
    }

    pub fn latest_report(&self) -> Option<&TickReport> {
        self.last_report.as_ref()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.manager.ordered()
    }

    pub fn statistics(&self) -> AlertStatistics {
        self.manager.statistics()
    }

    pub fn acknowledge(&mut self, id: Uuid) -> Result<Alert, AlertError> {
        self.manager.acknowledge(id)
    }

    pub fn resolve(&mut self, id: Uuid) -> Result<Alert, AlertError> {
        self.manager.resolve(id)
    }

    pub fn resolve_all(&mut self) -> usize {
        self.manager.resolve_all()
    }

    pub fn sensor_configs(&self) -> &SensorConfigSet {
        &self.configs
    }

    /// Runtime threshold update; a rejected update changes nothing.
    pub fn update_sensor(
        &mut self,
        kind: SensorKind,
        update: SensorUpdate,
    ) -> Result<SensorConfig, ConfigError> {
        self.configs.update(kind, update)
    }
}

/// Cheaply cloneable handle to a [`Monitor`].
///
/// The ticker task is the only per-tick writer; presentation consumers take
/// short locks and receive cloned snapshots, so nothing downstream can hold
/// the pipeline up.
#[derive(Clone)]
pub struct MonitorHandle {
    inner: Arc<RwLock<Monitor>>,
}

impl MonitorHandle {
    pub fn new(monitor: Monitor) -> Self {
        Self {
            inner: Arc::new(RwLock::new(monitor)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Monitor> {
        self.inner.read().expect("monitor lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Monitor> {
        self.inner.write().expect("monitor lock poisoned")
    }

    pub fn observe(&self, snapshot: SensorSnapshot) -> TickReport {
        self.write().observe(snapshot)
    }

    pub fn previous_hours(&self) -> f64 {
        self.read().previous_hours()
    }

    pub fn latest_report(&self) -> Option<TickReport> {
        self.read().latest_report().cloned()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.read().alerts()
    }

    pub fn statistics(&self) -> AlertStatistics {
        self.read().statistics()
    }

    pub fn acknowledge(&self, id: Uuid) -> Result<Alert, AlertError> {
        self.write().acknowledge(id)
    }

    pub fn resolve(&self, id: Uuid) -> Result<Alert, AlertError> {
        self.write().resolve(id)
    }

    pub fn resolve_all(&self) -> usize {
        self.write().resolve_all()
    }

    pub fn sensor_configs(&self) -> SensorConfigSet {
        self.read().sensor_configs().clone()
    }

    pub fn update_sensor(
        &self,
        kind: SensorKind,
        update: SensorUpdate,
    ) -> Result<SensorConfig, ConfigError> {
        self.write().update_sensor(kind, update)
    }
}
