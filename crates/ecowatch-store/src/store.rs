//! Main store implementation.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use time::macros::{format_description, offset};
use time::{Duration, OffsetDateTime, UtcOffset};
use tracing::{debug, info};

use ecowatch_core::{ConditionsSnapshot, GeneratorSet, ThresholdConfig, Thresholds, fixtures};
use ecowatch_types::{
    Alert, AlertView, AnalyticsData, DashboardStats, Indicator, Reading, Sensor, Zone,
};

use crate::alerts::{AlertCounts, AlertEngine};
use crate::error::{Error, Result};
use crate::map::{FeatureKind, FeatureProvider, Geometry, MapFeature, hotspot_features};
use crate::queries::{AlertQuery, AnalyticsQuery};
use crate::stats;

const CONDITIONS_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Capacity of each bounded list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Retention {
    /// Readings kept per sensor, oldest evicted first.
    pub readings_per_sensor: usize,
    /// Alerts kept per sensor.
    pub alerts_per_sensor: usize,
    /// Alerts kept in the global list.
    pub global_alerts: usize,
    /// Global alerts visible to clients.
    pub exposed_alerts: usize,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            readings_per_sensor: 100,
            alerts_per_sensor: 10,
            global_alerts: 50,
            exposed_alerts: 20,
        }
    }
}

/// Settings for a [`SensorStore`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub retention: Retention,
    /// Readings generated per sensor by [`SensorStore::initialize`].
    pub backfill_count: u32,
    /// Spacing between backfilled readings.
    pub backfill_spacing: Duration,
    /// Local offset of the monitored site; generators and chart labels use it.
    pub utc_offset: UtcOffset,
    pub thresholds: ThresholdConfig,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            retention: Retention::default(),
            backfill_count: 20,
            backfill_spacing: Duration::minutes(5),
            utc_offset: offset!(+5:30),
            thresholds: ThresholdConfig::default(),
        }
    }
}

/// Result of one tick for one sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub reading: Reading,
    /// Alerts raised by this reading, in evaluation order.
    pub alerts: Vec<Alert>,
}

/// In-memory store of sensors, their bounded histories and alerts.
///
/// The store is plain data: callers that share it across tasks wrap it in a
/// lock and hold the write side for the whole of [`tick`](Self::tick).
pub struct SensorStore {
    options: StoreOptions,
    generators: GeneratorSet,
    rng: StdRng,
    /// Base seed for conditions snapshots, kept apart from `rng` so reading
    /// them never shifts the tick series.
    conditions_seed: u64,
    sensors: BTreeMap<u32, Sensor>,
    zones: Vec<Zone>,
    alerts: AlertEngine,
}

impl SensorStore {
    /// Create an empty store drawing noise from the OS random source.
    pub fn new(options: StoreOptions, generators: GeneratorSet) -> Self {
        let mut rng = StdRng::from_os_rng();
        let conditions_seed = rng.random();
        Self::with_rng(options, generators, rng, conditions_seed)
    }

    /// Create an empty store with a deterministic random source.
    pub fn seeded(options: StoreOptions, generators: GeneratorSet, seed: u64) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        Self::with_rng(options, generators, rng, seed ^ CONDITIONS_SEED_SALT)
    }

    fn with_rng(
        options: StoreOptions,
        generators: GeneratorSet,
        rng: StdRng,
        conditions_seed: u64,
    ) -> Self {
        let alerts = AlertEngine::new(
            Thresholds::new(options.thresholds.clone()),
            &options.retention,
        );
        Self {
            options,
            generators,
            rng,
            conditions_seed,
            sensors: BTreeMap::new(),
            zones: Vec::new(),
            alerts,
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Load the fixed tables and backfill history ending five minutes ago.
    pub fn initialize(&mut self) -> Result<()> {
        self.initialize_at(OffsetDateTime::now_utc())
    }

    /// Load the fixed tables and backfill history relative to `now`.
    ///
    /// Each sensor gets `backfill_count` readings spaced `backfill_spacing`
    /// apart, the newest one spacing before `now`. Backfill runs step by
    /// step across all sensors so the global alert list stays in time
    /// order; backfilled readings go through the alert engine like live ones.
    ///
    /// Fails without touching the store when the oldest backfilled reading
    /// would fall outside the range `OffsetDateTime` can represent.
    pub fn initialize_at(&mut self, now: OffsetDateTime) -> Result<()> {
        let count = self.options.backfill_count;
        let spacing = self.options.backfill_spacing;
        let out_of_range = Error::BackfillOutOfRange {
            count,
            spacing_secs: spacing.whole_seconds(),
        };
        if backfill_time(now, spacing, count).is_none() {
            return Err(out_of_range);
        }

        self.reset();
        self.sensors = fixtures::sensors().into_iter().map(|s| (s.id, s)).collect();
        self.zones = fixtures::zones();

        let ids: Vec<u32> = self.sensors.keys().copied().collect();
        for step in (1..=count).rev() {
            let at = backfill_time(now, spacing, step).ok_or_else(|| out_of_range.clone())?;
            for &id in &ids {
                self.tick(id, at)?;
            }
        }

        info!(
            sensors = self.sensors.len(),
            zones = self.zones.len(),
            backfill = count,
            alerts = self.alerts.retained().len(),
            "Store initialized"
        );
        Ok(())
    }

    /// Drop every sensor, zone and alert.
    pub fn reset(&mut self) {
        self.sensors.clear();
        self.zones.clear();
        self.alerts.clear();
    }

    /// Generate, retain and evaluate one reading for `sensor_id` at `at`.
    ///
    /// All values are generated before the sensor is touched.
    pub fn tick(&mut self, sensor_id: u32, at: OffsetDateTime) -> Result<TickOutcome> {
        let sensor = self
            .sensors
            .get_mut(&sensor_id)
            .ok_or(Error::SensorNotFound(sensor_id))?;

        let local = at.to_offset(self.options.utc_offset);
        let reading = self
            .generators
            .generate(&sensor.name, local, &mut self.rng)
            .into_reading(sensor_id, at);

        sensor.readings.push_back(reading.clone());
        while sensor.readings.len() > self.options.retention.readings_per_sensor {
            sensor.readings.pop_front();
        }

        sensor.predicted_aqi = reading.aqi;
        sensor.predicted_temp = reading.temperature;
        let indicator = Indicator::from_aqi(reading.aqi);
        sensor.color = indicator.color().to_string();
        sensor.is_glowing = indicator.is_glowing();

        let alerts = self.alerts.on_new_reading(sensor, &reading);
        debug!(
            sensor = sensor_id,
            aqi = reading.aqi,
            temperature = reading.temperature,
            co2 = reading.co2,
            alerts = alerts.len(),
            "Tick"
        );

        Ok(TickOutcome { reading, alerts })
    }

    /// Tick every sensor at `at`, in id order.
    pub fn tick_all(&mut self, at: OffsetDateTime) -> Result<Vec<TickOutcome>> {
        let ids: Vec<u32> = self.sensors.keys().copied().collect();
        ids.into_iter().map(|id| self.tick(id, at)).collect()
    }

    /// Every sensor, in id order.
    pub fn sensors(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.values()
    }

    pub fn sensor(&self, id: u32) -> Option<&Sensor> {
        self.sensors.get(&id)
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Chart rows for a sensor, oldest first. Empty for an unknown sensor.
    pub fn analytics(&self, query: &AnalyticsQuery) -> Vec<AnalyticsData> {
        let Some(sensor) = self.sensors.get(&query.sensor_id) else {
            return Vec::new();
        };
        let skip = query.skip(sensor.readings.len());
        sensor
            .readings
            .iter()
            .skip(skip)
            .map(|reading| AnalyticsData {
                timestamp: time_label(reading.timestamp, self.options.utc_offset),
                aqi: reading.aqi,
                temperature: reading.temperature,
                humidity: reading.humidity,
                co2: reading.co2,
            })
            .collect()
    }

    /// Recent alerts matching `query`, newest first, with sensor names.
    pub fn alerts(&self, query: &AlertQuery) -> Vec<AlertView> {
        self.alerts
            .recent()
            .filter(|alert| query.matches(alert))
            .map(|alert| AlertView {
                alert: alert.clone(),
                sensor_name: self
                    .sensors
                    .get(&alert.sensor_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Alert totals by level.
    pub fn alert_counts(&self) -> AlertCounts {
        self.alerts.counts()
    }

    /// Fleet statistics as of now.
    pub fn dashboard_stats(&self) -> DashboardStats {
        self.dashboard_stats_at(OffsetDateTime::now_utc())
    }

    pub fn dashboard_stats_at(&self, now: OffsetDateTime) -> DashboardStats {
        stats::compute_stats(self.sensors.values(), now)
    }

    /// Every documentary field of every domain for a sensor at `at`.
    ///
    /// Does not touch the sensor's history or the tick random source: the
    /// noise is seeded from the store's conditions seed, the sensor and the
    /// second of `at`, so repeated calls within one second agree.
    pub fn conditions(&self, sensor_id: u32, at: OffsetDateTime) -> Option<ConditionsSnapshot> {
        let sensor = self.sensors.get(&sensor_id)?;
        let local = at.to_offset(self.options.utc_offset);
        let seed = self.conditions_seed
            ^ (u64::from(sensor_id) << 48)
            ^ at.unix_timestamp() as u64;
        let mut rng = StdRng::seed_from_u64(seed);
        Some(ConditionsSnapshot::generate(&sensor.name, local, &mut rng))
    }
}

impl FeatureProvider for SensorStore {
    fn map_features(&self) -> Vec<MapFeature> {
        let zones = self.zones.iter().map(|zone| MapFeature {
            geometry: Geometry::Polygon(zone.polygon.clone()),
            kind: FeatureKind::Zone {
                id: zone.id.clone(),
                name: zone.name.clone(),
                color: zone.color.clone(),
                avg_aqi: zone.avg_aqi,
            },
        });
        let sensors = self.sensors.values().map(|sensor| MapFeature {
            geometry: Geometry::Point(sensor.position()),
            kind: FeatureKind::Sensor {
                id: sensor.id,
                name: sensor.name.clone(),
                color: sensor.color.clone(),
                glowing: sensor.is_glowing,
                aqi: sensor.latest_reading().map(|r| r.aqi),
            },
        });
        zones.chain(hotspot_features()).chain(sensors).collect()
    }
}

/// Local wall-clock label such as `2:05:09 PM`.
/// Timestamp of backfill step `step`, `step` spacings before `now`.
fn backfill_time(now: OffsetDateTime, spacing: Duration, step: u32) -> Option<OffsetDateTime> {
    let step = i32::try_from(step).ok()?;
    now.checked_sub(spacing.checked_mul(step)?)
}

fn time_label(timestamp: OffsetDateTime, offset: UtcOffset) -> String {
    let format = format_description!("[hour repr:12 padding:none]:[minute]:[second] [period]");
    timestamp.to_offset(offset).format(format).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecowatch_core::{Domain, DomainGenerator, DomainReading};
    use ecowatch_core::generators::AirQualityData;
    use ecowatch_types::{AlertLevel, COLOR_GOOD, COLOR_UNHEALTHY, Metric};
    use rand::RngCore;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-03-01 08:30 UTC);

    #[derive(Debug)]
    struct FixedAqi(u32);

    impl DomainGenerator for FixedAqi {
        fn domain(&self) -> Domain {
            Domain::AirQuality
        }

        fn generate(&self, _: &str, _: OffsetDateTime, _: &mut dyn RngCore) -> DomainReading {
            DomainReading::AirQuality(AirQualityData::from_aqi(self.0))
        }
    }

    fn store() -> SensorStore {
        let mut store = SensorStore::seeded(StoreOptions::default(), GeneratorSet::standard(), 7);
        store.initialize_at(NOW).unwrap();
        store
    }

    #[test]
    fn test_initialize_backfills_every_sensor() {
        let store = store();
        assert_eq!(store.sensor_count(), 8);
        assert_eq!(store.zones().len(), 4);
        for sensor in store.sensors() {
            assert_eq!(sensor.readings.len(), 20);
            let first = sensor.readings.front().unwrap();
            let last = sensor.readings.back().unwrap();
            assert_eq!(first.timestamp, NOW - Duration::minutes(100));
            assert_eq!(last.timestamp, NOW - Duration::minutes(5));
            assert_eq!(sensor.predicted_aqi, last.aqi);
            assert_eq!(sensor.predicted_temp, last.temperature);
        }
    }

    #[test]
    fn test_sensors_in_id_order() {
        let store = store();
        let ids: Vec<u32> = store.sensors().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_tick_unknown_sensor() {
        let mut store = store();
        assert_eq!(store.tick(99, NOW), Err(Error::SensorNotFound(99)));
    }

    #[test]
    fn test_unknown_sensor_is_absent() {
        let store = store();
        assert!(store.sensor(0).is_none());
        assert!(store.analytics(&AnalyticsQuery::new(42)).is_empty());
    }

    #[test]
    fn test_critical_aqi_updates_indicator() {
        let generators = GeneratorSet::standard().with(FixedAqi(156));
        let mut store = SensorStore::seeded(StoreOptions::default(), generators, 1);
        store.initialize_at(NOW).unwrap();
        let outcome = store.tick(3, NOW).unwrap();

        let aqi_alerts: Vec<_> = outcome
            .alerts
            .iter()
            .filter(|a| a.parameter == Metric::Aqi)
            .collect();
        assert_eq!(aqi_alerts.len(), 1);
        assert_eq!(aqi_alerts[0].level, AlertLevel::Critical);
        assert_eq!(aqi_alerts[0].threshold, "150");
        assert_eq!(aqi_alerts[0].value, "156");

        let sensor = store.sensor(3).unwrap();
        assert_eq!(sensor.color, COLOR_UNHEALTHY);
        assert!(sensor.is_glowing);
        assert_eq!(sensor.predicted_aqi, 156);
    }

    #[test]
    fn test_good_aqi_clears_glow() {
        let generators = GeneratorSet::standard().with(FixedAqi(30));
        let mut store = SensorStore::seeded(StoreOptions::default(), generators, 1);
        store.initialize_at(NOW).unwrap();
        let sensor = store.sensor(1).unwrap();
        assert_eq!(sensor.color, COLOR_GOOD);
        assert!(!sensor.is_glowing);
    }

    #[test]
    fn test_analytics_labels_use_local_offset() {
        let store = store();
        let rows = store.analytics(&AnalyticsQuery::new(1));
        assert_eq!(rows.len(), 20);
        // 08:25 UTC is 1:55 PM at +05:30.
        assert_eq!(rows.last().unwrap().timestamp, "1:55:00 PM");
        // 06:50 UTC is 12:20 PM.
        assert_eq!(rows[0].timestamp, "12:20:00 PM");
    }

    #[test]
    fn test_analytics_limit_keeps_newest() {
        let store = store();
        let all = store.analytics(&AnalyticsQuery::new(2));
        let rows = store.analytics(&AnalyticsQuery::new(2).limit(3));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[..], all[17..]);
    }

    #[test]
    fn test_alert_views_carry_sensor_name() {
        let generators = GeneratorSet::standard().with(FixedAqi(120));
        let mut store = SensorStore::seeded(StoreOptions::default(), generators, 1);
        store.initialize_at(NOW).unwrap();
        let views = store.alerts(&AlertQuery::new().sensor(8));
        assert!(!views.is_empty());
        assert!(views.iter().all(|v| v.sensor_name == "Trimbak Road"));
        assert!(views.iter().all(|v| v.alert.sensor_id == 8));
    }

    #[test]
    fn test_reset_empties_store() {
        let mut store = store();
        store.reset();
        assert_eq!(store.sensor_count(), 0);
        assert!(store.zones().is_empty());
        assert!(store.alerts(&AlertQuery::new()).is_empty());
        assert_eq!(store.dashboard_stats_at(NOW).avg_aqi, 0.0);
    }

    #[test]
    fn test_conditions_leave_history_alone() {
        let store = store();
        let snapshot = store.conditions(4, NOW).unwrap();
        assert_eq!(snapshot.location, "College Road");
        assert_eq!(store.sensor(4).unwrap().readings.len(), 20);
        assert!(store.conditions(12, NOW).is_none());
    }

    #[test]
    fn test_conditions_do_not_shift_tick_series() {
        let mut quiet = store();
        let mut busy = store();
        for i in 0..5 {
            let at = NOW + Duration::seconds(5) * i;
            for id in 1..=8 {
                busy.conditions(id, at).unwrap();
            }
            let expected: Vec<_> = quiet.tick_all(at).unwrap().into_iter().map(|o| o.reading).collect();
            let actual: Vec<_> = busy.tick_all(at).unwrap().into_iter().map(|o| o.reading).collect();
            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn test_conditions_repeat_within_a_second() {
        let store = store();
        assert_eq!(store.conditions(2, NOW), store.conditions(2, NOW));
    }

    #[test]
    fn test_backfill_out_of_range_leaves_store_untouched() {
        let options = StoreOptions {
            backfill_spacing: Duration::seconds(1_000_000_000_000),
            ..StoreOptions::default()
        };
        let mut store = SensorStore::seeded(options, GeneratorSet::standard(), 7);
        assert_eq!(
            store.initialize_at(NOW),
            Err(Error::BackfillOutOfRange {
                count: 20,
                spacing_secs: 1_000_000_000_000,
            })
        );
        assert_eq!(store.sensor_count(), 0);
    }

    #[test]
    fn test_zero_backfill() {
        let options = StoreOptions {
            backfill_count: 0,
            ..StoreOptions::default()
        };
        let mut store = SensorStore::seeded(options, GeneratorSet::standard(), 7);
        store.initialize_at(NOW).unwrap();
        assert_eq!(store.sensor_count(), 8);
        assert!(store.sensors().all(|s| s.readings.is_empty()));
    }

    #[test]
    fn test_map_features_order() {
        let store = store();
        let features = store.map_features();
        assert_eq!(features.len(), 4 + 9 + 8);
        assert!(matches!(features[0].kind, FeatureKind::Zone { .. }));
        assert!(matches!(features[4].kind, FeatureKind::Hotspot(_)));
        assert!(matches!(features[13].kind, FeatureKind::Sensor { id: 1, .. }));
    }

    #[test]
    fn test_time_label() {
        let offset = UtcOffset::from_hms(5, 30, 0).unwrap();
        assert_eq!(time_label(datetime!(2025-03-01 18:35:09 UTC), offset), "12:05:09 AM");
        assert_eq!(time_label(datetime!(2025-03-01 06:30:00 UTC), offset), "12:00:00 PM");
        assert_eq!(time_label(datetime!(2025-03-01 08:35:09 UTC), UtcOffset::UTC), "8:35:09 AM");
    }
}
