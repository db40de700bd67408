//! Remaining-useful-life estimation.
//!
//! A smooth heuristic over the recent health trend and alert pressure, not a
//! physical model: the contract is the formula, monotone in its inputs.

use serde::Serialize;

use crate::telemetry::history::HistoryWindow;

use super::health::Scorer;
use super::least_squares_slope;

/// Baseline horizon when nothing is known to be wrong: 180 days.
const BASELINE_HOURS: f64 = 4320.0;

/// Floor applied when the health trend is collapsing.
const MIN_HOURS: f64 = 24.0;

/// Health slope below which the baseline starts shrinking.
const DECLINE_THRESHOLD: f64 = -0.5;

/// Health samples used for the trend fit.
const TREND_SAMPLES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RulEstimate {
    pub hours: f64,
    pub days: u32,
}

impl RulEstimate {
    fn from_hours(hours: f64) -> Self {
        let hours = hours.max(0.0);
        Self {
            hours,
            days: (hours / 24.0).round() as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RulEstimator {
    scorer: Scorer,
}

impl RulEstimator {
    pub fn new(scorer: Scorer) -> Self {
        Self { scorer }
    }

    /// Project remaining operating hours from the recent health trend and the
    /// number of active alerts.
    pub fn estimate(&self, window: &HistoryWindow, active_alerts: usize) -> RulEstimate {
        if window.len() < TREND_SAMPLES {
            return RulEstimate::from_hours(BASELINE_HOURS);
        }

        let skip = window.len() - TREND_SAMPLES;
        let healths: Vec<f64> = window
            .iter()
            .skip(skip)
            .map(|s| self.scorer.health_score(s))
            .collect();
        let slope = least_squares_slope(&healths);
        let current_health = *healths.last().unwrap_or(&0.0);

        let mut hours = BASELINE_HOURS;
        if slope < DECLINE_THRESHOLD {
            hours = (BASELINE_HOURS * (1.0 + slope)).max(MIN_HOURS);
        }

        hours *= current_health / 100.0;
        hours *= (1.0 - active_alerts as f64 * 0.05).max(0.5);

        RulEstimate::from_hours(hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::SensorSnapshot;
    use chrono::Utc;

    fn nominal() -> SensorSnapshot {
        SensorSnapshot {
            timestamp: Utc::now(),
            temperature: 25.0,
            vibration: 300.0,
            load: 5.0,
            power: 10.0,
            proximity: 30.0,
            sound: 30.0,
            fuel: 100.0,
            operating_hours: 0.0,
        }
    }

    #[test]
    fn test_short_history_returns_default_horizon() {
        let mut window = HistoryWindow::new(20);
        for _ in 0..4 {
            window.append(nominal());
        }
        let estimate = RulEstimator::default().estimate(&window, 0);
        assert_eq!(estimate.hours, 4320.0);
        assert_eq!(estimate.days, 180);
    }

    #[test]
    fn test_steady_full_health_keeps_baseline() {
        let mut window = HistoryWindow::new(20);
        for _ in 0..5 {
            window.append(nominal());
        }
        let estimate = RulEstimator::default().estimate(&window, 0);
        assert!((estimate.hours - 4320.0).abs() < 1e-9);
        assert_eq!(estimate.days, 180);
    }

    #[test]
    fn test_declining_health_shrinks_horizon() {
        let mut window = HistoryWindow::new(20);
        // Temperature ramps hard enough that health drops > 0.5/reading.
        for temperature in [25.0, 30.0, 35.0, 40.0, 45.0] {
            let mut s = nominal();
            s.temperature = temperature;
            window.append(s);
        }
        let declining = RulEstimator::default().estimate(&window, 0);

        let mut steady = HistoryWindow::new(20);
        for _ in 0..5 {
            steady.append(nominal());
        }
        let baseline = RulEstimator::default().estimate(&steady, 0);

        assert!(declining.hours < baseline.hours);
    }

    #[test]
    fn test_alert_pressure_scales_down_with_floor() {
        let mut window = HistoryWindow::new(20);
        for _ in 0..5 {
            window.append(nominal());
        }
        let estimator = RulEstimator::default();

        let none = estimator.estimate(&window, 0);
        let some = estimator.estimate(&window, 4);
        assert!((some.hours - none.hours * 0.8).abs() < 1e-6);

        // 20+ active alerts bottom out at the 0.5 floor.
        let many = estimator.estimate(&window, 50);
        assert!((many.hours - none.hours * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_estimate_is_never_negative_and_days_track_hours() {
        let mut window = HistoryWindow::new(20);
        // Worst-case garbage readings: health 0 across the board.
        for _ in 0..5 {
            let mut s = nominal();
            s.temperature = 1e6;
            s.vibration = 1e6;
            s.load = 1e6;
            s.power = 1e6;
            s.sound = 1e6;
            s.fuel = 0.0;
            s.proximity = 0.0;
            window.append(s);
        }
        let estimate = RulEstimator::default().estimate(&window, 30);
        assert!(estimate.hours >= 0.0);
        assert_eq!(estimate.days, (estimate.hours / 24.0).round() as u32);
    }
}
