//! Trend detection: early warnings from sustained slopes in recent readings.

use chrono::Utc;
use uuid::Uuid;

use crate::analysis::least_squares_slope;
use crate::config::SensorConfigSet;
use crate::telemetry::history::HistoryWindow;
use crate::telemetry::SensorKind;

use super::{implicated_component, Alert, AlertSource, AlertStatus, Severity, TrendDirection, TrendInfo};

/// Readings required before a trend fit is attempted.
pub const TREND_WINDOW: usize = 5;

/// Slope threshold and expected-bad direction for one tracked metric.
#[derive(Debug, Clone, Copy)]
pub struct TrendRule {
    pub kind: SensorKind,
    pub direction: TrendDirection,
    /// Slope magnitude per reading; negative for decreasing-is-bad metrics.
    pub threshold: f64,
}

/// Per-metric slope limits, in sensor units per reading.
pub const TREND_RULES: [TrendRule; 7] = [
    TrendRule {
        kind: SensorKind::Temperature,
        direction: TrendDirection::Increasing,
        threshold: 0.5,
    },
    TrendRule {
        kind: SensorKind::Vibration,
        direction: TrendDirection::Increasing,
        threshold: 20.0,
    },
    TrendRule {
        kind: SensorKind::Sound,
        direction: TrendDirection::Increasing,
        threshold: 2.0,
    },
    TrendRule {
        kind: SensorKind::Load,
        direction: TrendDirection::Increasing,
        threshold: 0.2,
    },
    TrendRule {
        kind: SensorKind::Power,
        direction: TrendDirection::Increasing,
        threshold: 0.3,
    },
    TrendRule {
        kind: SensorKind::Fuel,
        direction: TrendDirection::Decreasing,
        threshold: -0.5,
    },
    TrendRule {
        kind: SensorKind::Proximity,
        direction: TrendDirection::Decreasing,
        threshold: -0.5,
    },
];

pub struct TrendDetector {
    unit: String,
}

impl TrendDetector {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }

    /// Fit a line to the last five readings of each tracked metric and raise
    /// an alert for slopes past the metric's limit. Empty until the window
    /// holds at least five snapshots.
    ///
    /// Severity comparisons are strict: a slope exactly at twice the limit
    /// stays Info.
    pub fn detect(&self, window: &HistoryWindow, configs: &SensorConfigSet) -> Vec<Alert> {
        if window.len() < TREND_WINDOW {
            return Vec::new();
        }

        let mut alerts = Vec::new();
        for rule in TREND_RULES {
            if !configs.get(rule.kind).enabled {
                continue;
            }

            let values = window.recent_values(rule.kind, TREND_WINDOW);
            let slope = least_squares_slope(&values);

            let (breached, severe) = match rule.direction {
                TrendDirection::Increasing => {
                    (slope > rule.threshold, slope > rule.threshold * 2.0)
                }
                TrendDirection::Decreasing => {
                    (slope < rule.threshold, slope < rule.threshold * 2.0)
                }
            };
            if !breached {
                continue;
            }

            alerts.push(self.build_alert(rule, slope, values[values.len() - 1], severe));
        }
        alerts
    }

    fn build_alert(&self, rule: TrendRule, slope: f64, latest: f64, severe: bool) -> Alert {
        let name = rule.kind.display_name();
        let (message, recommendation) = match rule.direction {
            TrendDirection::Increasing => (
                format!("{name} increasing trend detected"),
                format!(
                    "Monitor {} system for potential issues",
                    name.to_lowercase()
                ),
            ),
            TrendDirection::Decreasing => (
                format!("{name} decreasing trend detected"),
                format!("Check {} system for potential issues", name.to_lowercase()),
            ),
        };

        Alert {
            id: Uuid::new_v4(),
            sensor: Some(rule.kind),
            unit: self.unit.clone(),
            component: implicated_component(rule.kind).to_string(),
            value: latest,
            threshold: rule.threshold,
            severity: if severe {
                Severity::Warning
            } else {
                Severity::Info
            },
            status: AlertStatus::New,
            source: AlertSource::Trend,
            message,
            recommendation,
            created_at: Utc::now(),
            trend: Some(TrendInfo {
                slope,
                direction: rule.direction,
            }),
        }
    }
}
