//! CraneGuard -- telemetry analytics and alerting core for heavy-equipment
//! monitoring.
//!
//! This crate turns periodic sensor snapshots (load, vibration, temperature,
//! power, proximity, sound, fuel) into actionable signal: threshold alerts,
//! trend-based early warnings, a composite health score, an anomaly score,
//! and a remaining-useful-life estimate.

pub mod alerts;
pub mod analysis;
pub mod api;
pub mod config;
pub mod pipeline;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::api::state::AppState;
use crate::config::MonitorConfig;
use crate::pipeline::{Monitor, MonitorHandle};
use crate::telemetry::source::HttpTelemetrySource;

/// Start the CraneGuard daemon: ingestion ticker + presentation API.
pub async fn serve(bind: &str, config: MonitorConfig) -> Result<()> {
    let monitor = Monitor::new(&config)?;
    let handle = MonitorHandle::new(monitor);

    let source = Arc::new(HttpTelemetrySource::new(
        config.telemetry.url.as_str(),
        Duration::from_secs(config.telemetry.request_timeout_secs),
    )?);

    let token = CancellationToken::new();
    let ticker = tokio::spawn(pipeline::ticker::run_ticker(
        handle.clone(),
        source,
        Duration::from_secs(config.telemetry.poll_interval_secs),
        token.clone(),
    ));

    let app = api::router(AppState {
        monitor: handle.clone(),
    });

    let addr: std::net::SocketAddr = bind.parse()?;
    tracing::info!(%addr, unit = %config.unit.id, url = %config.telemetry.url, "CraneGuard listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(token.clone()))
        .await?;

    token.cancel();
    ticker.await?;

    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown requested");
    token.cancel();
}
