//! Synthetic per-domain sensor generators.
//!
//! Each environmental domain (air quality, weather, water/CO2, crowd,
//! traffic) has a generator that maps a location name and a timestamp to a
//! plausible reading: a base value, a time-of-day modifier, a keyword-based
//! location modifier and bounded uniform noise.
//!
//! All generators implement [`DomainGenerator`] so the store can iterate a
//! registered [`GeneratorSet`] uniformly and fold every [`DomainReading`]
//! into one [`ReadingDraft`].
//!
//! The hour of day is read from the timestamp as given. Callers convert to
//! the local offset of the monitored site before generating.
//!
//! # Example
//!
//! ```
//! use ecowatch_core::generators::{GeneratorSet, ReadingDraft};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use time::macros::datetime;
//!
//! let generators = GeneratorSet::standard();
//! let mut rng = StdRng::seed_from_u64(7);
//! let draft = generators.generate("CIDCO Central", datetime!(2025-03-01 14:00 +05:30), &mut rng);
//! assert!(draft.co2 >= 300);
//! ```

mod air;
mod crowd;
mod traffic;
mod water;
mod weather;

use core::fmt;

use rand::{Rng, RngCore};
use time::OffsetDateTime;
use tracing::trace;

use ecowatch_types::Reading;

pub use air::{AirQualityData, AirQualityGenerator, air_quality};
pub use crowd::{CrowdData, CrowdGenerator, crowd};
pub use traffic::{TrafficData, TrafficGenerator, traffic};
pub use water::{WaterData, WaterGenerator, water};
pub use weather::{WeatherData, WeatherGenerator, weather};

/// The environmental domains that can be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    AirQuality,
    Weather,
    Water,
    Crowd,
    Traffic,
}

/// Output of one domain generator.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainReading {
    AirQuality(AirQualityData),
    Weather(WeatherData),
    Water(WaterData),
    Crowd(CrowdData),
    Traffic(TrafficData),
}

impl DomainReading {
    /// Domain this reading came from.
    pub fn domain(&self) -> Domain {
        match self {
            DomainReading::AirQuality(_) => Domain::AirQuality,
            DomainReading::Weather(_) => Domain::Weather,
            DomainReading::Water(_) => Domain::Water,
            DomainReading::Crowd(_) => Domain::Crowd,
            DomainReading::Traffic(_) => Domain::Traffic,
        }
    }

    /// Copy the alertable fields of this reading into `draft`.
    pub fn apply(&self, draft: &mut ReadingDraft) {
        match self {
            DomainReading::AirQuality(air) => draft.aqi = air.aqi,
            DomainReading::Weather(weather) => {
                draft.temperature = weather.temperature;
                draft.humidity = weather.humidity;
            }
            DomainReading::Water(water) => draft.co2 = water.co2,
            DomainReading::Crowd(crowd) => draft.crowd_density = Some(crowd.crowd_density),
            DomainReading::Traffic(traffic) => {
                draft.traffic_congestion = Some(traffic.congestion_level)
            }
        }
    }
}

/// A generator for one environmental domain.
///
/// Implementations must be total: any location name and any timestamp
/// produce a reading.
pub trait DomainGenerator: Send + Sync + fmt::Debug {
    /// Domain produced by this generator.
    fn domain(&self) -> Domain;

    /// Produce a reading for `location` at `at`, drawing noise from `rng`.
    fn generate(&self, location: &str, at: OffsetDateTime, rng: &mut dyn RngCore)
    -> DomainReading;
}

/// Alertable values collected from all registered generators for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingDraft {
    pub temperature: f64,
    pub humidity: f64,
    pub aqi: u32,
    pub co2: u32,
    pub crowd_density: Option<u32>,
    pub traffic_congestion: Option<u32>,
}

impl ReadingDraft {
    /// Finish the draft as an immutable reading.
    pub fn into_reading(self, sensor_id: u32, timestamp: OffsetDateTime) -> Reading {
        Reading {
            sensor_id,
            timestamp,
            temperature: self.temperature,
            humidity: self.humidity,
            aqi: self.aqi,
            co2: self.co2,
            crowd_density: self.crowd_density,
            traffic_congestion: self.traffic_congestion,
        }
    }
}

/// An ordered list of registered generators.
#[derive(Debug)]
pub struct GeneratorSet {
    generators: Vec<Box<dyn DomainGenerator>>,
}

impl GeneratorSet {
    /// An empty set. Readings produced by it carry only zero values.
    pub fn empty() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    /// Air quality, weather and water: the alerting pipeline.
    pub fn standard() -> Self {
        Self::empty()
            .with(AirQualityGenerator)
            .with(WeatherGenerator)
            .with(WaterGenerator)
    }

    /// The standard set plus the crowd and traffic generators.
    pub fn with_mobility() -> Self {
        Self::standard().with(CrowdGenerator).with(TrafficGenerator)
    }

    /// Register another generator after the existing ones.
    pub fn with<G: DomainGenerator + 'static>(mut self, generator: G) -> Self {
        self.generators.push(Box::new(generator));
        self
    }

    /// Registered domains, in order.
    pub fn domains(&self) -> Vec<Domain> {
        self.generators.iter().map(|g| g.domain()).collect()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Run every generator in order and fold the results into a draft.
    pub fn generate(
        &self,
        location: &str,
        at: OffsetDateTime,
        rng: &mut dyn RngCore,
    ) -> ReadingDraft {
        trace!(location, generators = self.generators.len(), "Generating reading");
        let mut draft = ReadingDraft::default();
        for generator in &self.generators {
            generator.generate(location, at, rng).apply(&mut draft);
        }
        draft
    }
}

impl Default for GeneratorSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Uniform sample in `[low, high)`; tolerates `low > high`.
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + rng.random::<f64>() * (high - low)
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 06:00 through 18:59.
pub(crate) fn is_daytime(hour: u8) -> bool {
    (6..=18).contains(&hour)
}
