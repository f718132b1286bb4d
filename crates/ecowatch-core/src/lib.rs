//! Simulation core for the EcoWatch environmental monitoring dashboard.
//!
//! This crate produces plausible pseudo-sensor values for a fixed set of
//! city locations and turns those values into alert levels. It has no I/O
//! and no shared state; the store crate drives it on a timer.
//!
//! # Features
//!
//! - **Domain generators**: air quality, weather, water/CO2, crowd and traffic
//! - **Threshold evaluation**: warning/critical cutoffs per metric
//! - **Location tables**: the Nashik sensors, zones and hotspots
//! - **Live conditions**: every documentary field for one location
//!
//! # Quick Start
//!
//! ```
//! use ecowatch_core::{GeneratorSet, Thresholds, fixtures};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use time::macros::datetime;
//!
//! let generators = GeneratorSet::standard();
//! let thresholds = Thresholds::default();
//! let mut rng = StdRng::seed_from_u64(1);
//!
//! let location = &fixtures::SENSOR_LOCATIONS[0];
//! let at = datetime!(2025-03-01 10:00 +05:30);
//! let reading = generators
//!     .generate(location.name, at, &mut rng)
//!     .into_reading(location.id, at);
//!
//! for (metric, value, evaluation) in thresholds.breaches(&reading) {
//!     println!("{metric} = {value}: {:?}", evaluation.level);
//! }
//! ```

pub mod conditions;
pub mod fixtures;
pub mod generators;
pub mod thresholds;

pub use conditions::ConditionsSnapshot;
pub use fixtures::{HotspotKind, SensorLocation, ZoneSeed};
pub use generators::{Domain, DomainGenerator, DomainReading, GeneratorSet, ReadingDraft};
pub use thresholds::{Band, Evaluation, HumidityBand, ThresholdConfig, Thresholds};

// Re-export the data types so downstream crates need only one import.
pub use ecowatch_types;
