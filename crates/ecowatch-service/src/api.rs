//! REST API endpoints for the ecowatch-service.
//!
//! # Concurrency and Lock Acquisition
//!
//! `state.store` is a `RwLock`. Read endpoints take the read side and clone
//! what they return. The collector takes the write side for a whole tick, so
//! a response never mixes a new reading with stale alerts or colors.
//!
//! `GET /api/sensors/{id}/conditions` takes the read side as well: its noise
//! is seeded per call and never advances the tick series.
//!
//! ## Error Handling
//!
//! All endpoints return structured JSON errors via [`AppError`]. Unknown
//! sensors are 404 (including ids that are not numbers), invalid filters are
//! 400, any other store failure is 500.
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use ecowatch_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use ecowatch_core::ConditionsSnapshot;
use ecowatch_store::{AlertCounts, AlertQuery, AnalyticsQuery, FeatureProvider};
use ecowatch_types::{AlertLevel, AlertView, AnalyticsData, DashboardStats, Sensor, Zone};

use crate::geojson;
use crate::prometheus::{self, PROMETHEUS_CONTENT_TYPE};
use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // Health and status
        .route("/api/health", get(health))
        .route("/api/status", get(get_status))
        // Prometheus metrics
        .route("/metrics", get(prometheus_metrics))
        // Dashboard data
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route("/api/sensors", get(list_sensors))
        .route("/api/sensors/{id}", get(get_sensor))
        .route("/api/sensors/{id}/conditions", get(get_conditions))
        .route("/api/alerts", get(list_alerts))
        .route("/api/zones", get(list_zones))
        .route("/api/analytics/{id}", get(get_analytics))
        .route("/api/map", get(map_features))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Prometheus metrics endpoint.
///
/// Returns 404 when `prometheus.enabled` is false.
async fn prometheus_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    if !state.config.prometheus.enabled {
        return Err(AppError::NotFound(
            "Prometheus metrics endpoint is disabled".to_string(),
        ));
    }

    let output = {
        let store = state.store.read().await;
        prometheus::render(&store, &state.collector, OffsetDateTime::now_utc())
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        output,
    ))
}

// ==========================================================================
// Service Status
// ==========================================================================

/// Service status response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Service version.
    pub version: &'static str,
    /// Current timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Collector status.
    pub collector: CollectorStatus,
    /// Loaded sensors.
    pub sensors: usize,
    /// Alerts raised since initialization.
    pub alerts: AlertCounts,
}

/// Collector status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorStatus {
    /// Whether the collector is running.
    pub running: bool,
    /// When the collector was started (if running).
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    /// How long the collector has been running (in seconds).
    pub uptime_seconds: Option<u64>,
    pub tick_interval_secs: u64,
    /// Completed ticks.
    pub ticks: u64,
    /// Failed ticks.
    pub failures: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_tick_at: Option<OffsetDateTime>,
}

/// Get service status including collector state.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let now = OffsetDateTime::now_utc();
    let started_at = state.collector.started_at();
    let uptime_seconds = started_at.map(|s| (now - s).whole_seconds().max(0) as u64);

    let (sensors, alerts) = {
        let store = state.store.read().await;
        (store.sensor_count(), store.alert_counts())
    };

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        timestamp: now,
        collector: CollectorStatus {
            running: state.collector.is_running(),
            started_at,
            uptime_seconds,
            tick_interval_secs: state.config.simulation.tick_interval_secs,
            ticks: state.collector.ticks(),
            failures: state.collector.failures(),
            last_tick_at: state.collector.last_tick_at(),
        },
        sensors,
        alerts,
    })
}

// ==========================================================================
// Dashboard Data
// ==========================================================================

/// Averages over each sensor's newest reading.
async fn dashboard_stats(State(state): State<Arc<AppState>>) -> Json<DashboardStats> {
    let store = state.store.read().await;
    Json(store.dashboard_stats())
}

async fn list_sensors(State(state): State<Arc<AppState>>) -> Json<Vec<Sensor>> {
    let store = state.store.read().await;
    Json(store.sensors().cloned().collect())
}

/// Parse a path id. Anything that is not a sensor id maps to "not found".
fn parse_sensor_id(raw: &str) -> Result<u32, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Sensor not found: {}", raw)))
}

async fn get_sensor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Sensor>, AppError> {
    let id = parse_sensor_id(&id)?;
    let store = state.store.read().await;
    store
        .sensor(id)
        .cloned()
        .map(Json)
        .ok_or(AppError::Store(ecowatch_store::Error::SensorNotFound(id)))
}

/// Every documentary field of every domain for one sensor, right now.
async fn get_conditions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ConditionsSnapshot>, AppError> {
    let id = parse_sensor_id(&id)?;
    let store = state.store.read().await;
    store
        .conditions(id, OffsetDateTime::now_utc())
        .map(Json)
        .ok_or(AppError::Store(ecowatch_store::Error::SensorNotFound(id)))
}

/// Query parameters for `GET /api/alerts`.
#[derive(Debug, Default, Deserialize)]
pub struct AlertsParams {
    /// `warning` or `critical`.
    pub level: Option<String>,
    /// Sensor id.
    pub sensor: Option<String>,
}

impl AlertsParams {
    /// Validate the parameters and build a store query.
    pub fn to_query(&self) -> Result<AlertQuery, AppError> {
        let mut query = AlertQuery::new();
        if let Some(level) = &self.level {
            let level: AlertLevel = level
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid level: {}", e)))?;
            query = query.level(level);
        }
        if let Some(sensor) = &self.sensor {
            let sensor: u32 = sensor
                .parse()
                .map_err(|_| AppError::BadRequest(format!("Invalid sensor id: {}", sensor)))?;
            query = query.sensor(sensor);
        }
        Ok(query)
    }
}

/// Most recent alerts, newest first, optionally filtered.
async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertsParams>,
) -> Result<Json<Vec<AlertView>>, AppError> {
    let query = params.to_query()?;
    let store = state.store.read().await;
    Ok(Json(store.alerts(&query)))
}

async fn list_zones(State(state): State<Arc<AppState>>) -> Json<Vec<Zone>> {
    let store = state.store.read().await;
    Json(store.zones().to_vec())
}

/// Query parameters for `GET /api/analytics/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    /// Keep only the newest N rows.
    pub limit: Option<usize>,
}

/// Chart rows for one sensor, oldest first.
///
/// Unknown and non-numeric ids yield an empty list.
async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<AnalyticsParams>,
) -> Json<Vec<AnalyticsData>> {
    let Ok(id) = id.parse::<u32>() else {
        return Json(Vec::new());
    };
    let mut query = AnalyticsQuery::new(id);
    if let Some(limit) = params.limit {
        query = query.limit(limit);
    }
    let store = state.store.read().await;
    Json(store.analytics(&query))
}

/// Sensors, zones and hotspots as a GeoJSON `FeatureCollection`.
async fn map_features(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let features = {
        let store = state.store.read().await;
        store.map_features()
    };
    Json(geojson::feature_collection(&features))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Store(ecowatch_store::Error),
}

impl From<ecowatch_store::Error> for AppError {
    fn from(e: ecowatch_store::Error) -> Self {
        AppError::Store(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Store(e @ ecowatch_store::Error::SensorNotFound(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            AppError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
