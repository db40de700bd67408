//! The ingestion ticker driving the pipeline.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::telemetry::source::{synthesize_snapshot, TelemetrySource};

use super::MonitorHandle;

/// Drive the pipeline on a fixed interval until the token is cancelled.
///
/// Fetching the snapshot is the only suspension point per tick. A transport
/// failure never aborts the tick: a synthesized snapshot is substituted so
/// every downstream stage still runs and consumers always have a current
/// health/alert view.
pub async fn run_ticker(
    handle: MonitorHandle,
    source: Arc<dyn TelemetrySource>,
    interval: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("ticker cancelled, stopping ingestion");
                break;
            }
            _ = ticker.tick() => {
                let previous_hours = handle.previous_hours();
                let snapshot = match source.fetch(previous_hours).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!(error = %e, "telemetry fetch failed, synthesizing snapshot");
                        synthesize_snapshot(previous_hours)
                    }
                };
                handle.observe(snapshot);
            }
        }
    }
}
