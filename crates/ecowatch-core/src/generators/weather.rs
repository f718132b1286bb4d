//! Weather generator: temperature, humidity, wind and rain.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Domain, DomainGenerator, DomainReading, round1, uniform};

const BASE_TEMP: f64 = 28.0;
const BASE_HUMIDITY: f64 = 55.0;
const RAIN_PROBABILITY: f64 = 0.1;

/// Weather values for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    /// Degrees Celsius, one decimal.
    pub temperature: f64,
    /// Relative humidity percentage in [0, 100], one decimal.
    pub humidity: f64,
    /// km/h.
    pub wind_speed: f64,
    /// mm.
    pub rainfall: f64,
    pub condition: String,
}

fn temperature_modifier<R: Rng + ?Sized>(hour: u8, rng: &mut R) -> f64 {
    match hour {
        12..=16 => uniform(rng, 2.0, 7.0),
        0..=5 => uniform(rng, -4.0, -1.0),
        _ => uniform(rng, -1.0, 1.0),
    }
}

fn condition(rainfall: f64, humidity: f64) -> &'static str {
    if rainfall > 5.0 {
        "Heavy Rain"
    } else if rainfall > 0.0 {
        "Light Rain"
    } else if humidity > 70.0 {
        "Cloudy"
    } else {
        "Clear"
    }
}

/// Generate weather for `location` at `at`.
///
/// The location does not influence weather; all points share the city climate.
pub fn weather<R: Rng + ?Sized>(_location: &str, at: OffsetDateTime, rng: &mut R) -> WeatherData {
    let temperature = BASE_TEMP + temperature_modifier(at.hour(), rng);
    let humidity = BASE_HUMIDITY + uniform(rng, -5.0, 5.0);
    let wind_speed = uniform(rng, 5.0, 20.0);
    let rainfall = if rng.random::<f64>() < RAIN_PROBABILITY {
        uniform(rng, 0.0, 10.0)
    } else {
        0.0
    };

    WeatherData {
        temperature: round1(temperature),
        humidity: round1(humidity.clamp(0.0, 100.0)),
        wind_speed: round1(wind_speed),
        rainfall: round1(rainfall),
        condition: condition(rainfall, humidity).to_string(),
    }
}

/// [`DomainGenerator`] for weather.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherGenerator;

impl DomainGenerator for WeatherGenerator {
    fn domain(&self) -> Domain {
        Domain::Weather
    }

    fn generate(&self, location: &str, at: OffsetDateTime, rng: &mut dyn RngCore) -> DomainReading {
        DomainReading::Weather(weather(location, at, rng))
    }
}
