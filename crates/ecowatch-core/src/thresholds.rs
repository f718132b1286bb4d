//! Threshold evaluation for sensor metrics.
//!
//! Each metric has a warning and a critical cutoff. A value at or above the
//! cutoff triggers that level; critical takes precedence. Humidity is
//! two-sided: too dry and too damp both trigger.
//!
//! # Example
//!
//! ```
//! use ecowatch_core::{Thresholds, Evaluation};
//! use ecowatch_types::{AlertLevel, Metric};
//!
//! let thresholds = Thresholds::default();
//!
//! let result = thresholds.evaluate(Metric::Aqi, 156.0);
//! assert_eq!(result.level, Some(AlertLevel::Critical));
//! assert_eq!(result.threshold, 150.0);
//!
//! assert_eq!(thresholds.evaluate(Metric::Co2, 450.0), Evaluation::NONE);
//! ```

use serde::{Deserialize, Serialize};

use ecowatch_types::{AlertLevel, Metric, Reading};

/// Result of evaluating one value against its cutoffs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Triggered level, or `None` when the value is within limits.
    pub level: Option<AlertLevel>,
    /// The cutoff that was crossed (0 when nothing triggered).
    pub threshold: f64,
}

impl Evaluation {
    /// Value within limits.
    pub const NONE: Evaluation = Evaluation {
        level: None,
        threshold: 0.0,
    };

    fn warning(threshold: f64) -> Self {
        Self {
            level: Some(AlertLevel::Warning),
            threshold,
        }
    }

    fn critical(threshold: f64) -> Self {
        Self {
            level: Some(AlertLevel::Critical),
            threshold,
        }
    }

    /// Whether any level triggered.
    pub fn is_breach(&self) -> bool {
        self.level.is_some()
    }
}

/// One-sided cutoffs: high values are bad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub warning: f64,
    pub critical: f64,
}

impl Band {
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }

    /// Evaluate a value. NaN never triggers.
    pub fn evaluate(&self, value: f64) -> Evaluation {
        if value >= self.critical {
            Evaluation::critical(self.critical)
        } else if value >= self.warning {
            Evaluation::warning(self.warning)
        } else {
            Evaluation::NONE
        }
    }
}

/// Two-sided cutoffs for relative humidity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HumidityBand {
    pub warning_high: f64,
    pub critical_high: f64,
    pub warning_low: f64,
    pub critical_low: f64,
}

impl HumidityBand {
    /// Evaluate a value, reporting the side that triggered.
    pub fn evaluate(&self, value: f64) -> Evaluation {
        if value >= self.critical_high {
            Evaluation::critical(self.critical_high)
        } else if value <= self.critical_low {
            Evaluation::critical(self.critical_low)
        } else if value >= self.warning_high {
            Evaluation::warning(self.warning_high)
        } else if value <= self.warning_low {
            Evaluation::warning(self.warning_low)
        } else {
            Evaluation::NONE
        }
    }
}

impl Default for HumidityBand {
    fn default() -> Self {
        Self {
            warning_high: 75.0,
            critical_high: 85.0,
            warning_low: 25.0,
            critical_low: 15.0,
        }
    }
}

/// Cutoffs for every metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub aqi: Band,
    /// Degrees Celsius.
    pub temperature: Band,
    pub humidity: HumidityBand,
    /// ppm.
    pub co2: Band,
    pub crowd: Band,
    pub traffic: Band,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            aqi: Band::new(100.0, 150.0),
            temperature: Band::new(33.0, 37.0),
            humidity: HumidityBand::default(),
            co2: Band::new(900.0, 1200.0),
            crowd: Band::new(70.0, 85.0),
            traffic: Band::new(60.0, 80.0),
        }
    }
}

/// Threshold evaluator for sensor readings.
#[derive(Debug, Clone, Default)]
pub struct Thresholds {
    config: ThresholdConfig,
}

impl Thresholds {
    /// Create a new threshold evaluator with the given configuration.
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Evaluate one metric value.
    pub fn evaluate(&self, metric: Metric, value: f64) -> Evaluation {
        match metric {
            Metric::Aqi => self.config.aqi.evaluate(value),
            Metric::Temperature => self.config.temperature.evaluate(value),
            Metric::Humidity => self.config.humidity.evaluate(value),
            Metric::Co2 => self.config.co2.evaluate(value),
            Metric::CrowdDensity => self.config.crowd.evaluate(value),
            Metric::TrafficCongestion => self.config.traffic.evaluate(value),
        }
    }

    /// Evaluate every metric the reading carries, in [`Metric::ALL`] order,
    /// returning only breaches.
    pub fn breaches(&self, reading: &Reading) -> Vec<(Metric, f64, Evaluation)> {
        Metric::ALL
            .iter()
            .filter_map(|&metric| {
                let value = reading.value(metric)?;
                let evaluation = self.evaluate(metric, value);
                evaluation.is_breach().then_some((metric, value, evaluation))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn level(metric: Metric, value: f64) -> Option<AlertLevel> {
        Thresholds::default().evaluate(metric, value).level
    }

    #[test]
    fn test_aqi_table() {
        assert_eq!(level(Metric::Aqi, 99.0), None);
        assert_eq!(level(Metric::Aqi, 100.0), Some(AlertLevel::Warning));
        assert_eq!(level(Metric::Aqi, 149.0), Some(AlertLevel::Warning));
        assert_eq!(level(Metric::Aqi, 150.0), Some(AlertLevel::Critical));
    }

    #[test]
    fn test_temperature_table() {
        assert_eq!(level(Metric::Temperature, 32.9), None);
        assert_eq!(level(Metric::Temperature, 33.0), Some(AlertLevel::Warning));
        assert_eq!(level(Metric::Temperature, 36.9), Some(AlertLevel::Warning));
        assert_eq!(level(Metric::Temperature, 37.0), Some(AlertLevel::Critical));
    }

    #[test]
    fn test_co2_table() {
        assert_eq!(level(Metric::Co2, 899.0), None);
        assert_eq!(level(Metric::Co2, 900.0), Some(AlertLevel::Warning));
        assert_eq!(level(Metric::Co2, 1200.0), Some(AlertLevel::Critical));
    }

    #[test]
    fn test_crowd_and_traffic_tables() {
        assert_eq!(level(Metric::CrowdDensity, 69.0), None);
        assert_eq!(level(Metric::CrowdDensity, 70.0), Some(AlertLevel::Warning));
        assert_eq!(level(Metric::CrowdDensity, 85.0), Some(AlertLevel::Critical));
        assert_eq!(level(Metric::TrafficCongestion, 59.0), None);
        assert_eq!(level(Metric::TrafficCongestion, 60.0), Some(AlertLevel::Warning));
        assert_eq!(level(Metric::TrafficCongestion, 80.0), Some(AlertLevel::Critical));
    }

    #[test]
    fn test_humidity_is_two_sided() {
        let t = Thresholds::default();
        assert_eq!(t.evaluate(Metric::Humidity, 55.0), Evaluation::NONE);
        assert_eq!(t.evaluate(Metric::Humidity, 75.0), Evaluation::warning(75.0));
        assert_eq!(t.evaluate(Metric::Humidity, 85.0), Evaluation::critical(85.0));
        assert_eq!(t.evaluate(Metric::Humidity, 25.0), Evaluation::warning(25.0));
        assert_eq!(t.evaluate(Metric::Humidity, 15.0), Evaluation::critical(15.0));
        assert_eq!(t.evaluate(Metric::Humidity, 25.1), Evaluation::NONE);
    }

    #[test]
    fn test_threshold_reported() {
        let t = Thresholds::default();
        assert_eq!(t.evaluate(Metric::Aqi, 120.0).threshold, 100.0);
        assert_eq!(t.evaluate(Metric::Aqi, 156.0).threshold, 150.0);
        assert_eq!(t.evaluate(Metric::Aqi, 12.0).threshold, 0.0);
    }

    #[test]
    fn test_out_of_range_values() {
        let t = Thresholds::default();
        assert_eq!(t.evaluate(Metric::Aqi, -40.0), Evaluation::NONE);
        assert_eq!(t.evaluate(Metric::Co2, f64::INFINITY).level, Some(AlertLevel::Critical));
        assert_eq!(t.evaluate(Metric::Humidity, f64::NEG_INFINITY).level, Some(AlertLevel::Critical));
        assert_eq!(t.evaluate(Metric::Temperature, f64::NAN), Evaluation::NONE);
        assert_eq!(t.evaluate(Metric::Humidity, f64::NAN), Evaluation::NONE);
    }

    #[test]
    fn test_breaches_for_reading() {
        let reading = Reading {
            sensor_id: 1,
            timestamp: datetime!(2025-03-01 13:00 UTC),
            temperature: 34.2,
            humidity: 55.0,
            aqi: 156,
            co2: 610,
            crowd_density: Some(90),
            traffic_congestion: Some(10),
        };
        let breaches = Thresholds::default().breaches(&reading);
        let metrics: Vec<_> = breaches.iter().map(|(m, _, _)| *m).collect();
        assert_eq!(
            metrics,
            vec![Metric::Aqi, Metric::Temperature, Metric::CrowdDensity]
        );
        assert_eq!(breaches[0].1, 156.0);
        assert_eq!(breaches[0].2, Evaluation::critical(150.0));
    }

    #[test]
    fn test_custom_config() {
        let config = ThresholdConfig {
            aqi: Band::new(50.0, 80.0),
            ..ThresholdConfig::default()
        };
        let t = Thresholds::new(config);
        assert_eq!(t.evaluate(Metric::Aqi, 60.0).level, Some(AlertLevel::Warning));
        assert_eq!(t.config().aqi.critical, 80.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn evaluate_is_deterministic(value in proptest::num::f64::ANY, idx in 0usize..6) {
            let t = Thresholds::default();
            let metric = Metric::ALL[idx];
            prop_assert_eq!(t.evaluate(metric, value), t.evaluate(metric, value));
        }

        #[test]
        fn aqi_levels_match_cutoffs(value in -1000.0f64..1000.0) {
            let expected = if value >= 150.0 {
                Some(AlertLevel::Critical)
            } else if value >= 100.0 {
                Some(AlertLevel::Warning)
            } else {
                None
            };
            prop_assert_eq!(Thresholds::default().evaluate(Metric::Aqi, value).level, expected);
        }

        #[test]
        fn humidity_levels_match_cutoffs(value in -50.0f64..150.0) {
            let expected = if value >= 85.0 || value <= 15.0 {
                Some(AlertLevel::Critical)
            } else if value >= 75.0 || value <= 25.0 {
                Some(AlertLevel::Warning)
            } else {
                None
            };
            prop_assert_eq!(Thresholds::default().evaluate(Metric::Humidity, value).level, expected);
        }
    }
}
