//! Traffic congestion generator.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Domain, DomainGenerator, DomainReading, uniform};

const BASE_CONGESTION: f64 = 20.0;

/// Traffic values for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficData {
    /// 0-100.
    pub congestion_level: u32,
    pub vehicle_count: u32,
    /// km/h.
    pub average_speed: u32,
    /// `Light`, `Moderate` or `Heavy`.
    pub status: String,
}

fn status(congestion: f64) -> &'static str {
    if congestion > 70.0 {
        "Heavy"
    } else if congestion > 40.0 {
        "Moderate"
    } else {
        "Light"
    }
}

/// Generate traffic congestion for `location` at `at`.
pub fn traffic<R: Rng + ?Sized>(_location: &str, at: OffsetDateTime, rng: &mut R) -> TrafficData {
    let congestion = match at.hour() {
        8..=10 | 17..=19 => BASE_CONGESTION + uniform(rng, 30.0, 70.0),
        22..=23 | 0..=5 => uniform(rng, 0.0, 15.0),
        _ => BASE_CONGESTION + uniform(rng, 0.0, 30.0),
    }
    .clamp(0.0, 100.0);

    TrafficData {
        congestion_level: congestion.round() as u32,
        vehicle_count: (congestion * 5.0 + uniform(rng, 0.0, 50.0)).round() as u32,
        average_speed: (60.0 - congestion * 0.5).round() as u32,
        status: status(congestion).to_string(),
    }
}

/// [`DomainGenerator`] for traffic congestion.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrafficGenerator;

impl DomainGenerator for TrafficGenerator {
    fn domain(&self) -> Domain {
        Domain::Traffic
    }

    fn generate(&self, location: &str, at: OffsetDateTime, rng: &mut dyn RngCore) -> DomainReading {
        DomainReading::Traffic(traffic(location, at, rng))
    }
}
