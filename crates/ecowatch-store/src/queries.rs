//! Query builders for analytics rows and alerts.
//!
//! Both builders follow the same fluent pattern: start from `new()`, chain
//! optional filters, hand the query to the store.
//!
//! # Example
//!
//! ```
//! use ecowatch_store::{AlertQuery, AnalyticsQuery};
//! use ecowatch_types::AlertLevel;
//!
//! // Newest 10 chart rows for sensor 3
//! let analytics = AnalyticsQuery::new(3).limit(10);
//!
//! // Critical alerts from sensor 3 only
//! let alerts = AlertQuery::new().level(AlertLevel::Critical).sensor(3);
//! # let _ = (analytics, alerts);
//! ```

use ecowatch_types::{Alert, AlertLevel};

/// Query for a sensor's chart rows.
///
/// Rows are always chronological (oldest first). `limit` keeps the newest
/// N of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsQuery {
    /// Sensor to read.
    pub sensor_id: u32,
    /// Keep only the newest N rows.
    pub limit: Option<usize>,
}

impl AnalyticsQuery {
    /// Query every retained row of `sensor_id`.
    pub fn new(sensor_id: u32) -> Self {
        Self {
            sensor_id,
            limit: None,
        }
    }

    /// Keep only the newest `limit` rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Index of the first row to return out of `total`.
    pub(crate) fn skip(&self, total: usize) -> usize {
        self.limit.map_or(0, |limit| total.saturating_sub(limit))
    }
}

/// Filter over the exposed alert window.
///
/// Filters narrow the most recent alerts; they never reach further back
/// than what clients can see unfiltered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AlertQuery {
    /// Keep only this level.
    pub level: Option<AlertLevel>,
    /// Keep only alerts from this sensor.
    pub sensor_id: Option<u32>,
}

impl AlertQuery {
    /// Match every exposed alert.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: AlertLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn sensor(mut self, sensor_id: u32) -> Self {
        self.sensor_id = Some(sensor_id);
        self
    }

    pub(crate) fn matches(&self, alert: &Alert) -> bool {
        self.level.is_none_or(|level| alert.level == level)
            && self.sensor_id.is_none_or(|id| alert.sensor_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecowatch_types::Metric;
    use time::macros::datetime;
    use uuid::Uuid;

    fn alert(sensor_id: u32, level: AlertLevel) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            sensor_id,
            parameter: Metric::Aqi,
            value: "120".to_string(),
            threshold: "100".to_string(),
            level,
            timestamp: datetime!(2025-03-01 10:00 UTC),
        }
    }

    // ==================== AnalyticsQuery Tests ====================

    #[test]
    fn test_analytics_query_defaults() {
        let query = AnalyticsQuery::new(4);
        assert_eq!(query.sensor_id, 4);
        assert!(query.limit.is_none());
        assert_eq!(query.skip(20), 0);
    }

    #[test]
    fn test_analytics_query_limit_keeps_newest() {
        let query = AnalyticsQuery::new(4).limit(5);
        assert_eq!(query.skip(20), 15);
    }

    #[test]
    fn test_analytics_query_limit_larger_than_history() {
        let query = AnalyticsQuery::new(4).limit(500);
        assert_eq!(query.skip(20), 0);
    }

    #[test]
    fn test_analytics_query_limit_zero() {
        let query = AnalyticsQuery::new(4).limit(0);
        assert_eq!(query.skip(20), 20);
    }

    // ==================== AlertQuery Tests ====================

    #[test]
    fn test_alert_query_matches_all_by_default() {
        let query = AlertQuery::new();
        assert!(query.matches(&alert(1, AlertLevel::Warning)));
        assert!(query.matches(&alert(8, AlertLevel::Critical)));
    }

    #[test]
    fn test_alert_query_level_filter() {
        let query = AlertQuery::new().level(AlertLevel::Critical);
        assert!(query.matches(&alert(1, AlertLevel::Critical)));
        assert!(!query.matches(&alert(1, AlertLevel::Warning)));
    }

    #[test]
    fn test_alert_query_chaining() {
        let query = AlertQuery::new().level(AlertLevel::Warning).sensor(3);
        assert_eq!(query.level, Some(AlertLevel::Warning));
        assert_eq!(query.sensor_id, Some(3));
        assert!(query.matches(&alert(3, AlertLevel::Warning)));
        assert!(!query.matches(&alert(2, AlertLevel::Warning)));
        assert!(!query.matches(&alert(3, AlertLevel::Critical)));
    }
}
