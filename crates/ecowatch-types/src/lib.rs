//! Shared data types for the EcoWatch environmental monitoring simulator.
//!
//! This crate holds the plain data exchanged between the simulation core
//! (ecowatch-core), the in-memory store (ecowatch-store) and the HTTP
//! service (ecowatch-service).
//!
//! # Features
//!
//! - Sensor, reading, alert and zone records
//! - Fleet statistics and analytics rows
//! - Metric and alert-level enums with text parsing
//! - camelCase JSON through the optional `serde` feature (on by default)
//!
//! # Example
//!
//! ```
//! use ecowatch_types::{Indicator, Metric};
//!
//! assert_eq!(Indicator::from_aqi(156).color(), "#f97316");
//! assert_eq!("co2".parse::<Metric>().unwrap(), Metric::Co2);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{
    Alert, AlertLevel, AlertView, AnalyticsData, COLOR_GOOD, COLOR_MODERATE, COLOR_UNHEALTHY,
    DashboardStats, GeoPoint, HealthStatus, Indicator, Metric, Reading, Sensor, SensorKind, Zone,
};
