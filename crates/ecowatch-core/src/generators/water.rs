//! Water quality and CO2 generator.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Domain, DomainGenerator, DomainReading, is_daytime, round1, uniform};

const BASE_CO2: f64 = 500.0;
const MIN_CO2: f64 = 300.0;

/// Water and CO2 values for one location.
///
/// Only `co2` feeds alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterData {
    /// ppm, never below 300.
    pub co2: u32,
    /// 0-100 score.
    pub water_quality: u32,
    pub ph: f64,
}

fn location_modifier<R: Rng + ?Sized>(location: &str, rng: &mut R) -> f64 {
    if location.contains("Canteen") || location.contains("Building") {
        // Indoors
        uniform(rng, 50.0, 150.0)
    } else if location.contains("Ground") || location.contains("Residential") {
        uniform(rng, -50.0, 0.0)
    } else {
        0.0
    }
}

/// Generate water/CO2 values for `location` at `at`.
pub fn water<R: Rng + ?Sized>(location: &str, at: OffsetDateTime, rng: &mut R) -> WaterData {
    let time_modifier = if is_daytime(at.hour()) {
        uniform(rng, 0.0, 100.0)
    } else {
        uniform(rng, 0.0, 50.0)
    };
    let co2 = BASE_CO2 + time_modifier + location_modifier(location, rng);

    WaterData {
        co2: co2.max(MIN_CO2).round() as u32,
        water_quality: uniform(rng, 75.0, 95.0).round() as u32,
        ph: round1(uniform(rng, 6.5, 8.5)),
    }
}

/// [`DomainGenerator`] for water quality and CO2.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterGenerator;

impl DomainGenerator for WaterGenerator {
    fn domain(&self) -> Domain {
        Domain::Water
    }

    fn generate(&self, location: &str, at: OffsetDateTime, rng: &mut dyn RngCore) -> DomainReading {
        DomainReading::Water(water(location, at, rng))
    }
}
