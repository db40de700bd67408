//! Telemetry ingestion sources.
//!
//! The production source polls an HTTP endpoint that returns the gateway's
//! `{"sensorData": {...}}` JSON. Missing numeric fields default to 0 and a
//! missing operating-hours counter continues from the previous value, so a
//! partial payload is never rejected. Transport failures are recovered by the
//! caller with a synthesized snapshot (see [`synthesize_snapshot`]).

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::SensorSnapshot;

/// Default telemetry endpoint of the field gateway.
pub const DEFAULT_TELEMETRY_URL: &str = "http://localhost:5000/get-sensor";

/// Default request timeout and poll interval, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Increment applied to the operating-hours counter when the gateway omits it.
const HOURS_FALLBACK_INCREMENT: f64 = 0.01;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("telemetry request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A source of timestamped sensor snapshots.
///
/// Fetching is the only suspending operation in a pipeline tick; every
/// implementation must be bounded by a timeout.
#[async_trait::async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch the next snapshot. `previous_hours` is the last known value of
    /// the cumulative operating-hours counter, used when the payload omits it.
    async fn fetch(&self, previous_hours: f64) -> Result<SensorSnapshot, SourceError>;
}

/// Production source: polls the gateway's JSON endpoint.
pub struct HttpTelemetrySource {
    client: Client,
    url: String,
}

impl HttpTelemetrySource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl TelemetrySource for HttpTelemetrySource {
    async fn fetch(&self, previous_hours: f64) -> Result<SensorSnapshot, SourceError> {
        let payload: RawPayload = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(payload.sensor_data.into_snapshot(previous_hours))
    }
}

/// Test/demo source: always synthesizes a snapshot within normal bands.
pub struct SyntheticSource;

#[async_trait::async_trait]
impl TelemetrySource for SyntheticSource {
    async fn fetch(&self, previous_hours: f64) -> Result<SensorSnapshot, SourceError> {
        Ok(synthesize_snapshot(previous_hours))
    }
}

/// Gateway wire format. Extra fields (e.g. pre-existing alerts) are ignored.
#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    #[serde(rename = "sensorData", default)]
    sensor_data: RawSensorData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSensorData {
    temperature: Option<f64>,
    weight: Option<f64>,
    distance: Option<f64>,
    voltage: Option<f64>,
    #[serde(rename = "soundLevel")]
    sound_level: Option<f64>,
    vibration: Option<f64>,
    fuel: Option<f64>,
    #[serde(rename = "totalOperatingHours")]
    total_operating_hours: Option<f64>,
    #[serde(rename = "lastUpdated")]
    last_updated: Option<String>,
}

impl RawSensorData {
    fn into_snapshot(self, previous_hours: f64) -> SensorSnapshot {
        let timestamp = self
            .last_updated
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        SensorSnapshot {
            timestamp,
            temperature: self.temperature.unwrap_or(0.0),
            vibration: self.vibration.unwrap_or(0.0),
            load: self.weight.unwrap_or(0.0),
            power: self.voltage.unwrap_or(0.0),
            proximity: self.distance.unwrap_or(0.0),
            sound: self.sound_level.unwrap_or(0.0),
            fuel: self.fuel.unwrap_or(0.0),
            operating_hours: self
                .total_operating_hours
                .unwrap_or(previous_hours + HOURS_FALLBACK_INCREMENT),
        }
    }
}

/// Build a plausible snapshot with each reading drawn uniformly from the
/// sensor's normal operating band. Used when the gateway is unreachable so
/// downstream stages always run.
pub fn synthesize_snapshot(previous_hours: f64) -> SensorSnapshot {
    let mut rng = rand::thread_rng();
    SensorSnapshot {
        timestamp: Utc::now(),
        temperature: rng.gen_range(10.0..50.0),
        vibration: rng.gen_range(100.0..900.0),
        load: rng.gen_range(0.0..10.0),
        power: rng.gen_range(5.0..20.0),
        proximity: rng.gen_range(5.0..35.0),
        sound: rng.gen_range(10.0..70.0),
        fuel: rng.gen_range(0.0..100.0),
        operating_hours: previous_hours + HOURS_FALLBACK_INCREMENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_payload_decodes() {
        let body = r#"{
            "sensorData": {
                "temperature": 32.5,
                "weight": 4.2,
                "distance": 18.0,
                "voltage": 11.1,
                "soundLevel": 35.0,
                "vibration": 420.0,
                "fuel": 61.0,
                "totalOperatingHours": 123.45,
                "lastUpdated": "2024-05-01T10:00:00Z"
            },
            "alerts": []
        }"#;

        let payload: RawPayload = serde_json::from_str(body).unwrap();
        let snapshot = payload.sensor_data.into_snapshot(0.0);
        assert_eq!(snapshot.temperature, 32.5);
        assert_eq!(snapshot.load, 4.2);
        assert_eq!(snapshot.proximity, 18.0);
        assert_eq!(snapshot.power, 11.1);
        assert_eq!(snapshot.sound, 35.0);
        assert_eq!(snapshot.operating_hours, 123.45);
        assert_eq!(snapshot.timestamp.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let body = r#"{ "sensorData": { "temperature": 30.0 } }"#;
        let payload: RawPayload = serde_json::from_str(body).unwrap();
        let snapshot = payload.sensor_data.into_snapshot(500.0);

        assert_eq!(snapshot.temperature, 30.0);
        assert_eq!(snapshot.vibration, 0.0);
        assert_eq!(snapshot.load, 0.0);
        assert_eq!(snapshot.fuel, 0.0);
        // Missing hours continue from the previous value.
        assert!((snapshot.operating_hours - 500.01).abs() < 1e-9);
    }

    #[test]
    fn test_empty_payload_is_tolerated() {
        let payload: RawPayload = serde_json::from_str("{}").unwrap();
        let snapshot = payload.sensor_data.into_snapshot(1.0);
        assert_eq!(snapshot.temperature, 0.0);
        assert!((snapshot.operating_hours - 1.01).abs() < 1e-9);
    }

    #[test]
    fn test_synthesized_snapshot_within_bands() {
        for _ in 0..100 {
            let s = synthesize_snapshot(10.0);
            assert!((10.0..50.0).contains(&s.temperature));
            assert!((100.0..900.0).contains(&s.vibration));
            assert!((0.0..10.0).contains(&s.load));
            assert!((5.0..20.0).contains(&s.power));
            assert!((5.0..35.0).contains(&s.proximity));
            assert!((10.0..70.0).contains(&s.sound));
            assert!((0.0..100.0).contains(&s.fuel));
            assert!((s.operating_hours - 10.01).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_synthetic_source_always_succeeds() {
        let source = SyntheticSource;
        let snapshot = source.fetch(0.0).await.unwrap();
        assert!(snapshot.operating_hours > 0.0);
    }
}
