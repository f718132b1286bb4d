//! Core types for EcoWatch sensor data.

use core::fmt;
use core::str::FromStr;
use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ParseError;

/// Display color for a sensor with healthy air (AQI <= 50).
pub const COLOR_GOOD: &str = "#10b981";
/// Display color for a sensor with moderate air (50 < AQI <= 100).
pub const COLOR_MODERATE: &str = "#facc15";
/// Display color for a sensor with unhealthy air (AQI > 100).
pub const COLOR_UNHEALTHY: &str = "#f97316";

/// Category of a sensor location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SensorKind {
    /// A sensor inside the monitored campus.
    Campus,
    /// A sensor just outside the campus (highways, arterial roads).
    Nearby,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Campus => write!(f, "Campus"),
            SensorKind::Nearby => write!(f, "Nearby"),
        }
    }
}

impl FromStr for SensorKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "campus" => Ok(SensorKind::Campus),
            "nearby" => Ok(SensorKind::Nearby),
            _ => Err(ParseError::UnknownSensorKind(s.to_string())),
        }
    }
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a new point.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Severity of a threshold breach.
///
/// Levels are ordered by severity: `Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AlertLevel {
    /// The value crossed the warning cutoff.
    Warning,
    /// The value crossed the critical cutoff.
    Critical,
}

impl AlertLevel {
    /// Lowercase name used on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warning" => Ok(AlertLevel::Warning),
            "critical" => Ok(AlertLevel::Critical),
            _ => Err(ParseError::UnknownAlertLevel(s.to_string())),
        }
    }
}

/// A measured quantity that can raise alerts.
///
/// Serialized using its display label (`"AQI"`, `"CO2"`, ...), which is also
/// the `parameter` field of an [`Alert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Metric {
    /// Air quality index.
    #[cfg_attr(feature = "serde", serde(rename = "AQI"))]
    Aqi,
    /// Air temperature in degrees Celsius.
    Temperature,
    /// Relative humidity percentage.
    Humidity,
    /// CO2 concentration in ppm.
    #[cfg_attr(feature = "serde", serde(rename = "CO2"))]
    Co2,
    /// Crowd density on a 0-100 scale.
    #[cfg_attr(feature = "serde", serde(rename = "Crowd Density"))]
    CrowdDensity,
    /// Traffic congestion on a 0-100 scale.
    #[cfg_attr(feature = "serde", serde(rename = "Traffic Congestion"))]
    TrafficCongestion,
}

impl Metric {
    /// Every metric, in evaluation order.
    pub const ALL: [Metric; 6] = [
        Metric::Aqi,
        Metric::Temperature,
        Metric::Humidity,
        Metric::Co2,
        Metric::CrowdDensity,
        Metric::TrafficCongestion,
    ];

    /// Human-readable label, also used as the alert parameter name.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Aqi => "AQI",
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::Co2 => "CO2",
            Metric::CrowdDensity => "Crowd Density",
            Metric::TrafficCongestion => "Traffic Congestion",
        }
    }

    /// Unit suffix for display.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Aqi => "",
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
            Metric::Co2 => "ppm",
            Metric::CrowdDensity | Metric::TrafficCongestion => "%",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = ParseError;

    /// Parse a metric from its label or a snake_case name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "aqi" => Ok(Metric::Aqi),
            "temperature" | "temp" => Ok(Metric::Temperature),
            "humidity" => Ok(Metric::Humidity),
            "co2" => Ok(Metric::Co2),
            "crowd_density" | "crowd" => Ok(Metric::CrowdDensity),
            "traffic_congestion" | "traffic" => Ok(Metric::TrafficCongestion),
            _ => Err(ParseError::UnknownMetric(s.to_string())),
        }
    }
}

/// A single synthetic reading for one sensor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Reading {
    /// Owning sensor.
    pub sensor_id: u32,
    /// When the reading was taken.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Temperature in Celsius, one decimal.
    pub temperature: f64,
    /// Relative humidity percentage, one decimal.
    pub humidity: f64,
    /// Air quality index.
    pub aqi: u32,
    /// CO2 concentration in ppm.
    pub co2: u32,
    /// Crowd density (0-100) when the crowd generator is registered.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub crowd_density: Option<u32>,
    /// Traffic congestion (0-100) when the traffic generator is registered.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub traffic_congestion: Option<u32>,
}

impl Reading {
    /// Value of the given metric, if this reading carries it.
    #[must_use]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Aqi => Some(f64::from(self.aqi)),
            Metric::Temperature => Some(self.temperature),
            Metric::Humidity => Some(self.humidity),
            Metric::Co2 => Some(f64::from(self.co2)),
            Metric::CrowdDensity => self.crowd_density.map(f64::from),
            Metric::TrafficCongestion => self.traffic_congestion.map(f64::from),
        }
    }
}

/// A threshold breach raised for one reading.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Alert {
    /// Unique alert identifier.
    pub id: Uuid,
    /// Sensor that produced the reading.
    pub sensor_id: u32,
    /// Which metric breached.
    pub parameter: Metric,
    /// The offending value, stringified.
    pub value: String,
    /// The cutoff that was crossed, stringified.
    pub threshold: String,
    /// Severity.
    pub level: AlertLevel,
    /// Timestamp of the reading that raised the alert.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
}

/// An alert joined with the current display name of its sensor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AlertView {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub alert: Alert,
    /// Display name of the sensor, resolved when the alert is read.
    pub sensor_name: String,
}

/// AQI-derived display state of a sensor marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// AQI <= 50.
    Good,
    /// 50 < AQI <= 100.
    Moderate,
    /// AQI > 100.
    Unhealthy,
}

impl Indicator {
    /// Classify an AQI value.
    #[must_use]
    pub fn from_aqi(aqi: u32) -> Self {
        if aqi > 100 {
            Indicator::Unhealthy
        } else if aqi > 50 {
            Indicator::Moderate
        } else {
            Indicator::Good
        }
    }

    /// Marker color.
    #[must_use]
    pub fn color(&self) -> &'static str {
        match self {
            Indicator::Good => COLOR_GOOD,
            Indicator::Moderate => COLOR_MODERATE,
            Indicator::Unhealthy => COLOR_UNHEALTHY,
        }
    }

    /// Whether the marker should pulse.
    #[must_use]
    pub fn is_glowing(&self) -> bool {
        matches!(self, Indicator::Unhealthy)
    }
}

/// A sensor point with its bounded history.
///
/// `readings` is ordered oldest to newest; `alerts` newest first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Sensor {
    /// Sensor identifier from the location table.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Location category.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: SensorKind,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Marker color derived from the latest AQI.
    pub color: String,
    /// Whether the marker pulses (AQI > 100).
    pub is_glowing: bool,
    /// Reading history, oldest first.
    pub readings: VecDeque<Reading>,
    /// Recent alerts for this sensor, newest first.
    pub alerts: VecDeque<Alert>,
    /// AQI of the newest reading (0 before any reading).
    pub predicted_aqi: u32,
    /// Temperature of the newest reading (0 before any reading).
    pub predicted_temp: f64,
}

impl Sensor {
    /// Create a sensor with empty history and the default indicator.
    pub fn new(id: u32, name: impl Into<String>, kind: SensorKind, position: GeoPoint) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            lat: position.lat,
            lng: position.lng,
            color: COLOR_GOOD.to_string(),
            is_glowing: false,
            readings: VecDeque::new(),
            alerts: VecDeque::new(),
            predicted_aqi: 0,
            predicted_temp: 0.0,
        }
    }

    /// Position of the sensor.
    #[must_use]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Newest reading, if any.
    #[must_use]
    pub fn latest_reading(&self) -> Option<&Reading> {
        self.readings.back()
    }
}

/// A static geographic region grouping several sensors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Zone {
    /// Zone identifier (slug).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Outline, in order. Not closed: the first point is not repeated.
    pub polygon: Vec<GeoPoint>,
    /// Member sensor ids.
    pub sensors: Vec<u32>,
    /// Seed average AQI.
    pub avg_aqi: u32,
    /// Seed average temperature.
    pub avg_temp: f64,
    /// Fill color.
    pub color: String,
}

/// Qualitative health of the whole sensor fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HealthStatus {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Excellent => write!(f, "Excellent"),
            HealthStatus::Good => write!(f, "Good"),
            HealthStatus::Moderate => write!(f, "Moderate"),
            HealthStatus::Poor => write!(f, "Poor"),
        }
    }
}

/// Fleet-wide statistics computed from each sensor's latest reading.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DashboardStats {
    pub avg_temp: f64,
    pub avg_humidity: f64,
    pub avg_aqi: f64,
    pub avg_co2: f64,
    /// Composite Campus Green Index in [0, 100].
    pub campus_green_index: f64,
    pub campus_health_status: HealthStatus,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub last_updated: OffsetDateTime,
}

/// One chart row for the analytics view.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalyticsData {
    /// Local wall-clock time, e.g. `2:05:09 PM`.
    pub timestamp: String,
    pub aqi: u32,
    pub temperature: f64,
    pub humidity: f64,
    pub co2: u32,
}
