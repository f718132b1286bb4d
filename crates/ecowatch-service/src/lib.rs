//! Background tick driver and HTTP REST API for the EcoWatch simulator.
//!
//! This crate provides a service that:
//! - Loads the fixed sensor network and backfills its history
//! - Ticks every sensor on a schedule, raising threshold alerts
//! - Exposes a REST API for the dashboard, map and analytics views
//! - Streams every tick to WebSocket clients
//!
//! # REST API Endpoints
//!
//! - `GET /api/health` - Service health check
//! - `GET /api/status` - Collector and store counters
//! - `GET /api/dashboard/stats` - Fleet-wide averages and green index
//! - `GET /api/sensors` - All sensors with their histories
//! - `GET /api/sensors/{id}` - One sensor
//! - `GET /api/sensors/{id}/conditions` - Live conditions for every domain
//! - `GET /api/alerts?level=&sensor=` - Most recent alerts, newest first
//! - `GET /api/zones` - Zone polygons with their average readings
//! - `GET /api/analytics/{id}?limit=` - Chart rows for one sensor
//! - `GET /api/map` - GeoJSON of zones, hotspots and sensors
//! - `GET /metrics` - Prometheus text format
//! - `WS /api/ws` - Real-time tick stream
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/ecowatch/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [simulation]
//! tick_interval_secs = 5
//! mobility = true
//! seed = 42
//!
//! [thresholds.aqi]
//! warning = 100.0
//! critical = 150.0
//! ```

pub mod api;
pub mod collector;
pub mod config;
pub mod geojson;
pub mod prometheus;
pub mod state;
pub mod ws;

pub use collector::{Collector, CollectorError};
pub use config::{
    Config, ConfigError, PrometheusConfig, ServerConfig, SimulationConfig, ValidationError,
};
pub use state::{AppState, CollectorState, TickEvent};
