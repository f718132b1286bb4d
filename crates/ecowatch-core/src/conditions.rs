//! Full live conditions for one location.
//!
//! Unlike [`GeneratorSet`](crate::generators::GeneratorSet), which keeps only
//! the alertable values, a snapshot carries every documentary field of all
//! five domains (PM values, wind, pH, vehicle counts and so on).

use rand::RngCore;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::generators::{
    AirQualityData, CrowdData, TrafficData, WaterData, WeatherData, air_quality, crowd, traffic,
    water, weather,
};

/// Output of every domain generator for one location and instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionsSnapshot {
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub air_quality: AirQualityData,
    pub weather: WeatherData,
    pub water: WaterData,
    pub crowd: CrowdData,
    pub traffic: TrafficData,
}

impl ConditionsSnapshot {
    /// Run all five generators for `location` at `at`.
    pub fn generate(location: &str, at: OffsetDateTime, rng: &mut dyn RngCore) -> Self {
        Self {
            location: location.to_string(),
            timestamp: at,
            air_quality: air_quality(location, at, rng),
            weather: weather(location, at, rng),
            water: water(location, at, rng),
            crowd: crowd(location, at, rng),
            traffic: traffic(location, at, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_util::{at_hour, rng};

    #[test]
    fn test_snapshot_fills_every_domain() {
        let mut rng = rng();
        let at = at_hour(18);
        let snapshot = ConditionsSnapshot::generate("Trimbak Road", at, &mut rng);
        assert_eq!(snapshot.location, "Trimbak Road");
        assert_eq!(snapshot.timestamp, at);
        assert!(snapshot.water.co2 >= 300);
        assert!(snapshot.traffic.congestion_level >= 50);
        assert!(snapshot.crowd.crowd_density >= 50);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut rng = rng();
        let snapshot = ConditionsSnapshot::generate("College Road", at_hour(9), &mut rng);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["airQuality"]["pm25"].is_u64());
        assert!(json["weather"]["windSpeed"].is_f64());
        assert!(json["traffic"]["averageSpeed"].is_u64());
        assert!(json["crowd"]["peopleCount"].is_u64());
        assert!(json["timestamp"].as_str().unwrap().ends_with("+05:30"));
    }
}
