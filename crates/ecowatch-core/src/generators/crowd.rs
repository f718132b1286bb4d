//! Crowd density generator (camera people counting).

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Domain, DomainGenerator, DomainReading, uniform};

const BASE_DENSITY: f64 = 20.0;

/// Crowd values for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrowdData {
    /// 0-100.
    pub crowd_density: u32,
    pub people_count: u32,
    /// `Low`, `Medium` or `High`.
    pub status: String,
}

fn status(density: f64) -> &'static str {
    if density > 70.0 {
        "High"
    } else if density > 40.0 {
        "Medium"
    } else {
        "Low"
    }
}

/// Generate crowd density for `location` at `at`.
pub fn crowd<R: Rng + ?Sized>(_location: &str, at: OffsetDateTime, rng: &mut R) -> CrowdData {
    let density = match at.hour() {
        9..=12 => BASE_DENSITY + uniform(rng, 20.0, 60.0),
        16..=20 => BASE_DENSITY + uniform(rng, 30.0, 80.0),
        22..=23 | 0..=6 => uniform(rng, 0.0, 10.0),
        _ => BASE_DENSITY + uniform(rng, 0.0, 25.0),
    }
    .clamp(0.0, 100.0);

    CrowdData {
        crowd_density: density.round() as u32,
        people_count: (density * 3.0 + uniform(rng, 0.0, 20.0)).round() as u32,
        status: status(density).to_string(),
    }
}

/// [`DomainGenerator`] for crowd density.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrowdGenerator;

impl DomainGenerator for CrowdGenerator {
    fn domain(&self) -> Domain {
        Domain::Crowd
    }

    fn generate(&self, location: &str, at: OffsetDateTime, rng: &mut dyn RngCore) -> DomainReading {
        DomainReading::Crowd(crowd(location, at, rng))
    }
}
