//! Alert engine: turns threshold breaches into bounded alert lists.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use ecowatch_core::Thresholds;
use ecowatch_types::{Alert, AlertLevel, Reading, Sensor};

use crate::store::Retention;

/// Running totals of raised alerts, by level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub warning: u64,
    pub critical: u64,
}

impl AlertCounts {
    pub fn total(&self) -> u64 {
        self.warning + self.critical
    }

    fn record(&mut self, level: AlertLevel) {
        match level {
            AlertLevel::Warning => self.warning += 1,
            AlertLevel::Critical => self.critical += 1,
        }
    }
}

/// Evaluates fresh readings and keeps the global alert list.
///
/// Both the global list and each sensor's list are newest first. When a
/// list grows past its cap the oldest entries are dropped.
#[derive(Debug, Clone)]
pub struct AlertEngine {
    thresholds: Thresholds,
    global: VecDeque<Alert>,
    per_sensor_cap: usize,
    global_cap: usize,
    exposed: usize,
    counts: AlertCounts,
}

impl AlertEngine {
    pub fn new(thresholds: Thresholds, retention: &Retention) -> Self {
        Self {
            thresholds,
            global: VecDeque::with_capacity(retention.global_alerts + 1),
            per_sensor_cap: retention.alerts_per_sensor,
            global_cap: retention.global_alerts,
            exposed: retention.exposed_alerts,
            counts: AlertCounts::default(),
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Evaluate `reading` and record an alert for every breached metric.
    ///
    /// Returns the new alerts in evaluation order. No deduplication: a
    /// metric that stays out of range raises an alert on every reading.
    pub fn on_new_reading(&mut self, sensor: &mut Sensor, reading: &Reading) -> Vec<Alert> {
        let raised: Vec<Alert> = self
            .thresholds
            .breaches(reading)
            .into_iter()
            .filter_map(|(metric, value, evaluation)| {
                let level = evaluation.level?;
                Some(Alert {
                    id: Uuid::new_v4(),
                    sensor_id: sensor.id,
                    parameter: metric,
                    value: value.to_string(),
                    threshold: evaluation.threshold.to_string(),
                    level,
                    timestamp: reading.timestamp,
                })
            })
            .collect();

        for alert in &raised {
            debug!(
                sensor = sensor.id,
                parameter = %alert.parameter,
                value = %alert.value,
                level = %alert.level,
                "Alert raised"
            );
            self.counts.record(alert.level);

            sensor.alerts.push_front(alert.clone());
            sensor.alerts.truncate(self.per_sensor_cap);

            self.global.push_front(alert.clone());
            self.global.truncate(self.global_cap);
        }

        raised
    }

    /// The most recent alerts visible to clients, newest first.
    pub fn recent(&self) -> impl Iterator<Item = &Alert> {
        self.global.iter().take(self.exposed)
    }

    /// Every retained alert, newest first.
    pub fn retained(&self) -> &VecDeque<Alert> {
        &self.global
    }

    /// Totals since the last [`clear`](Self::clear).
    pub fn counts(&self) -> AlertCounts {
        self.counts
    }

    pub fn clear(&mut self) {
        self.global.clear();
        self.counts = AlertCounts::default();
    }
}
