//! API route definitions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::alerts::{AlertError, Severity};
use crate::config::SensorUpdate;
use crate::telemetry::SensorKind;

use super::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/overview", get(overview))
        .route("/alerts", get(list_alerts))
        .route("/alerts/resolve-all", post(resolve_all))
        .route("/alerts/{id}/acknowledge", post(acknowledge))
        .route("/alerts/{id}/resolve", post(resolve))
        .route("/config/sensors", get(sensor_configs))
        .route("/config/sensors/{kind}", put(update_sensor))
}

fn meta() -> Value {
    json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    })
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": { "status": "ok", "version": env!("CARGO_PKG_VERSION") },
        "meta": meta()
    }))
}

/// Latest full tick report, or null before the first tick completes.
async fn overview(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.monitor.latest_report(), "meta": meta() }))
}

#[derive(Debug, Default, Deserialize)]
struct AlertsQuery {
    /// Optional severity filter, matched case-insensitively.
    severity: Option<String>,
}

async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let severity = match query.severity.as_deref() {
        Some(s) => Some(Severity::parse(s).ok_or_else(|| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": format!("unknown severity: {s}") })),
            )
        })?),
        None => None,
    };

    let mut alerts = state.monitor.alerts();
    if let Some(severity) = severity {
        alerts.retain(|a| a.severity == severity);
    }
    let statistics = state.monitor.statistics();
    Ok(Json(json!({
        "data": { "alerts": alerts, "statistics": statistics },
        "meta": { "total": statistics.total() }
    })))
}

async fn acknowledge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.monitor.acknowledge(id) {
        Ok(alert) => Ok(Json(json!({ "data": alert, "meta": meta() }))),
        Err(e @ AlertError::Unknown(_)) => Err(not_found(e)),
    }
}

async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.monitor.resolve(id) {
        Ok(alert) => Ok(Json(json!({ "data": alert, "meta": meta() }))),
        Err(e @ AlertError::Unknown(_)) => Err(not_found(e)),
    }
}

async fn resolve_all(State(state): State<AppState>) -> Json<Value> {
    let resolved = state.monitor.resolve_all();
    Json(json!({ "data": { "resolved": resolved }, "meta": meta() }))
}

async fn sensor_configs(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.monitor.sensor_configs(), "meta": meta() }))
}

/// Runtime threshold update. Rejected updates leave the running analytics
/// untouched.
async fn update_sensor(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(update): Json<SensorUpdate>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let kind = SensorKind::parse(&kind).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown sensor kind: {kind}") })),
        )
    })?;

    match state.monitor.update_sensor(kind, update) {
        Ok(config) => Ok(Json(json!({ "data": config, "meta": meta() }))),
        Err(e) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}

fn not_found(e: AlertError) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": e.to_string() })),
    )
}
