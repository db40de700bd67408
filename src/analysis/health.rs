//! Composite health and anomaly scoring.
//!
//! Both scores measure deviation from each sensor's nominal operating value
//! with fixed per-metric weights. The two weight sets differ on purpose:
//! anomaly weighting emphasizes vibration and temperature, while health
//! weighting spreads more evenly and folds in fuel and proximity.

use serde::Serialize;

use crate::telemetry::SensorSnapshot;

/// Anomaly score above which a reading is flagged as anomalous.
pub const DEFAULT_ANOMALY_CUTOFF: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyReport {
    /// Composite deviation score in [0, 100]; higher is worse.
    pub score: f64,
    pub is_anomaly: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreReport {
    /// Composite health score in [0, 100]; higher is healthier.
    pub health: f64,
    pub anomaly: AnomalyReport,
}

#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    anomaly_cutoff: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            anomaly_cutoff: DEFAULT_ANOMALY_CUTOFF,
        }
    }
}

impl Scorer {
    pub fn new(anomaly_cutoff: f64) -> Self {
        Self { anomaly_cutoff }
    }

    pub fn score(&self, snapshot: &SensorSnapshot) -> ScoreReport {
        ScoreReport {
            health: self.health_score(snapshot),
            anomaly: self.anomaly(snapshot),
        }
    }

    /// Weighted sum of per-sensor health factors, scaled to [0, 100].
    ///
    /// Each factor is `max(0, 1 - |value - nominal| / spread)`; fuel and
    /// proximity use direct level factors since "more" is simply better.
    /// Weights sum to 1.0.
    pub fn health_score(&self, s: &SensorSnapshot) -> f64 {
        let temperature = (1.0 - (s.temperature - 25.0).abs() / 25.0).max(0.0);
        let vibration = (1.0 - (s.vibration - 300.0).abs() / 700.0).max(0.0);
        let sound = (1.0 - (s.sound - 30.0).abs() / 50.0).max(0.0);
        let load = (1.0 - (s.load - 5.0).abs() / 10.0).max(0.0);
        let power = (1.0 - (s.power - 10.0).abs() / 15.0).max(0.0);
        let fuel = (s.fuel / 100.0).clamp(0.0, 1.0);
        let proximity = (s.proximity / 30.0).clamp(0.0, 1.0);

        let weighted = temperature * 0.20
            + vibration * 0.25
            + sound * 0.15
            + load * 0.15
            + power * 0.10
            + fuel * 0.05
            + proximity * 0.10;

        (weighted * 100.0).clamp(0.0, 100.0)
    }

    /// Weighted sum of per-sensor deviation ratios, scaled to [0, 100].
    /// Weights sum to 1.0.
    pub fn anomaly(&self, s: &SensorSnapshot) -> AnomalyReport {
        let temperature = (s.temperature - 25.0).abs() / 15.0;
        let vibration = (s.vibration - 300.0).abs() / 400.0;
        let sound = (s.sound - 30.0).abs() / 20.0;
        let load = (s.load - 5.0).abs() / 5.0;
        let power = (s.power - 10.0).abs() / 5.0;

        let weighted = temperature * 0.25
            + vibration * 0.30
            + sound * 0.15
            + load * 0.20
            + power * 0.10;

        let score = (weighted * 100.0).clamp(0.0, 100.0);
        AnomalyReport {
            score,
            is_anomaly: score > self.anomaly_cutoff,
        }
    }
}
