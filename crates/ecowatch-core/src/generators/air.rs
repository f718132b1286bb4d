//! Air quality generator.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Domain, DomainGenerator, DomainReading, is_daytime, uniform};

const BASE_AQI: f64 = 70.0;
const TIME_VARIATION: f64 = 10.0;
const NOISE: f64 = 5.0;

/// Location keywords that shift the AQI baseline. First match wins.
const LOCATION_FACTORS: [(&str, f64); 5] = [
    ("Main Gate", 5.0),
    ("Highway Entrance", 15.0),
    ("Industrial Zone", 25.0),
    ("Residential Area", -5.0),
    ("Nearby Road", 10.0),
];

/// Air quality values for one location.
///
/// Only `aqi` feeds alerts; the pollutant fields are fixed fractions of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityData {
    pub aqi: u32,
    pub pm25: u32,
    pub pm10: u32,
    pub no2: u32,
    pub so2: u32,
}

impl AirQualityData {
    /// Derive the pollutant breakdown from an AQI value.
    pub fn from_aqi(aqi: u32) -> Self {
        Self::from_raw(f64::from(aqi))
    }

    fn from_raw(aqi: f64) -> Self {
        Self {
            aqi: aqi.round() as u32,
            pm25: (aqi * 0.4).round() as u32,
            pm10: (aqi * 0.6).round() as u32,
            no2: (aqi * 0.3).round() as u32,
            so2: (aqi * 0.2).round() as u32,
        }
    }
}

fn location_modifier(location: &str) -> f64 {
    LOCATION_FACTORS
        .iter()
        .find(|(keyword, _)| location.contains(keyword))
        .map_or(0.0, |(_, offset)| *offset)
}

/// Generate air quality for `location` at `at`.
pub fn air_quality<R: Rng + ?Sized>(location: &str, at: OffsetDateTime, rng: &mut R) -> AirQualityData {
    // Traffic raises pollution during the day.
    let time_modifier = if is_daytime(at.hour()) {
        TIME_VARIATION
    } else {
        -TIME_VARIATION / 2.0
    };
    let noise = uniform(rng, -NOISE, NOISE);
    let aqi = (BASE_AQI + time_modifier + location_modifier(location) + noise).max(0.0);
    AirQualityData::from_raw(aqi)
}

/// [`DomainGenerator`] for air quality.
#[derive(Debug, Clone, Copy, Default)]
pub struct AirQualityGenerator;

impl DomainGenerator for AirQualityGenerator {
    fn domain(&self) -> Domain {
        Domain::AirQuality
    }

    fn generate(&self, location: &str, at: OffsetDateTime, rng: &mut dyn RngCore) -> DomainReading {
        DomainReading::AirQuality(air_quality(location, at, rng))
    }
}
