//! In-memory sensor store for the EcoWatch simulator.
//!
//! This crate owns the live state of the simulation: the sensors loaded
//! from the fixed location table, their bounded reading histories, the
//! alert lists and the derived fleet statistics.
//!
//! # Features
//!
//! - Bounded per-sensor history with FIFO eviction
//! - Newest-first alert lists per sensor and globally
//! - Dashboard statistics with a composite green index
//! - Analytics rows and alert filters via query builders
//! - Map features (points and polygons) through [`FeatureProvider`]
//!
//! # Example
//!
//! ```
//! use ecowatch_core::GeneratorSet;
//! use ecowatch_store::{AnalyticsQuery, SensorStore, StoreOptions};
//!
//! let mut store = SensorStore::seeded(StoreOptions::default(), GeneratorSet::standard(), 42);
//! store.initialize()?;
//!
//! let rows = store.analytics(&AnalyticsQuery::new(1).limit(10));
//! assert_eq!(rows.len(), 10);
//!
//! let stats = store.dashboard_stats();
//! println!("{}: CGI {:.1}", stats.campus_health_status, stats.campus_green_index);
//! # Ok::<(), ecowatch_store::Error>(())
//! ```

mod alerts;
mod error;
mod map;
mod queries;
mod stats;
mod store;

pub use alerts::{AlertCounts, AlertEngine};
pub use error::{Error, Result};
pub use map::{FeatureKind, FeatureProvider, Geometry, MapFeature, hotspot_features};
pub use queries::{AlertQuery, AnalyticsQuery};
pub use stats::{compute_stats, green_index, health_status};
pub use store::{Retention, SensorStore, StoreOptions, TickOutcome};
