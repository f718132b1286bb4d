//! Fleet-wide aggregation over each sensor's newest reading.

use time::OffsetDateTime;

use ecowatch_types::{DashboardStats, HealthStatus, Sensor};

/// Composite green index in [0, 100] from average AQI and CO2.
pub fn green_index(avg_aqi: f64, avg_co2: f64) -> f64 {
    let aqi_score = (100.0 - avg_aqi).max(0.0);
    let co2_score = (100.0 - avg_co2 / 15.0).max(0.0);
    (aqi_score + co2_score) / 2.0
}

/// Qualitative status from average AQI and green index.
pub fn health_status(avg_aqi: f64, green_index: f64) -> HealthStatus {
    if avg_aqi > 100.0 || green_index < 50.0 {
        HealthStatus::Poor
    } else if avg_aqi > 50.0 || green_index < 70.0 {
        HealthStatus::Moderate
    } else if avg_aqi <= 30.0 && green_index >= 85.0 {
        HealthStatus::Excellent
    } else {
        HealthStatus::Good
    }
}

#[derive(Debug, Default)]
struct Totals {
    temperature: f64,
    humidity: f64,
    aqi: f64,
    co2: f64,
    count: u32,
}

impl Totals {
    fn mean(&self, sum: f64) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            sum / f64::from(self.count)
        }
    }
}

/// Compute dashboard statistics at `now`.
///
/// Sensors without readings are skipped. With no readings at all every
/// average is zero.
pub fn compute_stats<'a>(
    sensors: impl IntoIterator<Item = &'a Sensor>,
    now: OffsetDateTime,
) -> DashboardStats {
    let totals = sensors
        .into_iter()
        .filter_map(Sensor::latest_reading)
        .fold(Totals::default(), |mut acc, reading| {
            acc.temperature += reading.temperature;
            acc.humidity += reading.humidity;
            acc.aqi += f64::from(reading.aqi);
            acc.co2 += f64::from(reading.co2);
            acc.count += 1;
            acc
        });

    let avg_aqi = totals.mean(totals.aqi);
    let avg_co2 = totals.mean(totals.co2);
    let campus_green_index = green_index(avg_aqi, avg_co2);

    DashboardStats {
        avg_temp: totals.mean(totals.temperature),
        avg_humidity: totals.mean(totals.humidity),
        avg_aqi,
        avg_co2,
        campus_green_index,
        campus_health_status: health_status(avg_aqi, campus_green_index),
        last_updated: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecowatch_types::{GeoPoint, Reading, SensorKind};
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-03-01 12:00 UTC);

    fn sensor_with(id: u32, aqi: u32, co2: u32) -> Sensor {
        let mut sensor = Sensor::new(id, format!("S{id}"), SensorKind::Campus, GeoPoint::new(0.0, 0.0));
        sensor.readings.push_back(Reading {
            sensor_id: id,
            timestamp: NOW,
            temperature: 28.0,
            humidity: 50.0,
            aqi,
            co2,
            crowd_density: None,
            traffic_congestion: None,
        });
        sensor
    }

    #[test]
    fn test_two_sensor_average() {
        let sensors = [sensor_with(1, 40, 400), sensor_with(2, 60, 800)];
        let stats = compute_stats(&sensors, NOW);
        assert_eq!(stats.avg_aqi, 50.0);
        assert_eq!(stats.avg_co2, 600.0);
        assert_eq!(stats.campus_green_index, 55.0);
        assert_eq!(stats.campus_health_status, HealthStatus::Moderate);
        assert_eq!(stats.last_updated, NOW);
    }

    #[test]
    fn test_no_readings_yields_zero_averages() {
        let empty = Sensor::new(1, "Empty", SensorKind::Nearby, GeoPoint::new(0.0, 0.0));
        let stats = compute_stats([&empty], NOW);
        assert_eq!(stats.avg_temp, 0.0);
        assert_eq!(stats.avg_humidity, 0.0);
        assert_eq!(stats.avg_aqi, 0.0);
        assert_eq!(stats.avg_co2, 0.0);
        assert_eq!(stats.campus_green_index, 100.0);
        assert!(!stats.avg_aqi.is_nan());
    }

    #[test]
    fn test_sensors_without_readings_are_skipped() {
        let empty = Sensor::new(9, "Empty", SensorKind::Nearby, GeoPoint::new(0.0, 0.0));
        let full = sensor_with(1, 80, 600);
        let stats = compute_stats([&empty, &full], NOW);
        assert_eq!(stats.avg_aqi, 80.0);
    }

    #[test]
    fn test_green_index_floors_at_zero() {
        assert_eq!(green_index(250.0, 3000.0), 0.0);
        assert_eq!(green_index(0.0, 0.0), 100.0);
    }

    #[test]
    fn test_status_tiers() {
        assert_eq!(health_status(101.0, 90.0), HealthStatus::Poor);
        assert_eq!(health_status(40.0, 49.0), HealthStatus::Poor);
        assert_eq!(health_status(51.0, 90.0), HealthStatus::Moderate);
        assert_eq!(health_status(40.0, 69.0), HealthStatus::Moderate);
        assert_eq!(health_status(30.0, 85.0), HealthStatus::Excellent);
        assert_eq!(health_status(31.0, 85.0), HealthStatus::Good);
        assert_eq!(health_status(20.0, 80.0), HealthStatus::Good);
    }
}
