//! Retention and ordering properties of the sensor store.

use ecowatch_core::GeneratorSet;
use ecowatch_store::{AlertQuery, AnalyticsQuery, Retention, SensorStore, StoreOptions};
use ecowatch_types::AlertLevel;
use proptest::prelude::*;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const START: OffsetDateTime = datetime!(2025-03-01 06:00 UTC);

fn initialized(seed: u64, generators: GeneratorSet) -> SensorStore {
    let mut store = SensorStore::seeded(StoreOptions::default(), generators, seed);
    store.initialize_at(START).unwrap();
    store
}

/// Tick every sensor `count` times, five seconds apart, starting at tick
/// index `first` so consecutive batches keep the clock moving forward.
fn run_ticks(store: &mut SensorStore, first: u32, count: u32) {
    for i in first..first + count {
        store.tick_all(START + Duration::seconds(5) * i).unwrap();
    }
}

fn assert_invariants(store: &SensorStore, ticks: u32) {
    let retention = Retention::default();
    let expected = ((ticks + 20) as usize).min(retention.readings_per_sensor);

    for sensor in store.sensors() {
        assert_eq!(sensor.readings.len(), expected, "sensor {}", sensor.id);
        assert!(sensor.alerts.len() <= retention.alerts_per_sensor);

        let timestamps: Vec<_> = sensor.readings.iter().map(|r| r.timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]), "sensor {}", sensor.id);

        let alert_times: Vec<_> = sensor.alerts.iter().map(|a| a.timestamp).collect();
        assert!(alert_times.windows(2).all(|w| w[0] >= w[1]), "sensor {}", sensor.id);

        let newest = sensor.latest_reading().unwrap();
        assert_eq!(sensor.predicted_aqi, newest.aqi);
        assert_eq!(sensor.predicted_temp, newest.temperature);
    }

    let alerts = store.alerts(&AlertQuery::new());
    assert!(alerts.len() <= retention.exposed_alerts);
    assert!(
        alerts
            .windows(2)
            .all(|w| w[0].alert.timestamp >= w[1].alert.timestamp)
    );
}

#[test]
fn test_history_fills_to_cap() {
    let mut store = initialized(11, GeneratorSet::standard());
    assert_invariants(&store, 0);

    run_ticks(&mut store, 0, 30);
    assert_invariants(&store, 30);

    run_ticks(&mut store, 30, 70);
    assert_invariants(&store, 100);

    let sensor = store.sensor(1).unwrap();
    let newest = sensor.latest_reading().unwrap();
    assert_eq!(newest.timestamp, START + Duration::seconds(5) * 99);
}

#[test]
fn test_eviction_drops_oldest() {
    let mut store = initialized(3, GeneratorSet::standard());
    run_ticks(&mut store, 0, 120);

    let sensor = store.sensor(5).unwrap();
    assert_eq!(sensor.readings.len(), 100);
    // 20 backfilled + 120 live; the 40 oldest are gone.
    let oldest = sensor.readings.front().unwrap();
    assert_eq!(oldest.timestamp, START + Duration::seconds(5) * 20);
}

#[test]
fn test_mobility_pipeline_fills_optional_fields() {
    let store = initialized(5, GeneratorSet::with_mobility());
    for sensor in store.sensors() {
        let reading = sensor.latest_reading().unwrap();
        assert!(reading.crowd_density.is_some());
        assert!(reading.traffic_congestion.is_some());
    }
}

#[test]
fn test_alert_filters_narrow_exposed_window() {
    let mut store = initialized(9, GeneratorSet::with_mobility());
    run_ticks(&mut store, 0, 50);

    let all = store.alerts(&AlertQuery::new());
    let critical = store.alerts(&AlertQuery::new().level(AlertLevel::Critical));
    assert!(critical.len() <= all.len());
    assert!(critical.iter().all(|v| v.alert.level == AlertLevel::Critical));
}

#[test]
fn test_analytics_matches_history() {
    let store = initialized(2, GeneratorSet::standard());
    let sensor = store.sensor(6).unwrap();
    let rows = store.analytics(&AnalyticsQuery::new(6));
    assert_eq!(rows.len(), sensor.readings.len());
    for (row, reading) in rows.iter().zip(&sensor.readings) {
        assert_eq!(row.aqi, reading.aqi);
        assert_eq!(row.co2, reading.co2);
        assert_eq!(row.temperature, reading.temperature);
        assert_eq!(row.humidity, reading.humidity);
    }
}

#[test]
fn test_same_seed_same_history() {
    let a = initialized(77, GeneratorSet::standard());
    let b = initialized(77, GeneratorSet::standard());
    for (x, y) in a.sensors().zip(b.sensors()) {
        assert_eq!(x.readings, y.readings);
    }
}

#[test]
fn test_reinitialize_starts_over() {
    let mut store = initialized(4, GeneratorSet::standard());
    run_ticks(&mut store, 0, 10);
    store.initialize_at(START).unwrap();
    assert_invariants(&store, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn history_length_is_bounded(ticks in 0u32..120, seed in any::<u64>()) {
        let mut store = initialized(seed, GeneratorSet::with_mobility());
        run_ticks(&mut store, 0, ticks);
        let expected = ((ticks + 20) as usize).min(100);
        for sensor in store.sensors() {
            prop_assert_eq!(sensor.readings.len(), expected);
            prop_assert!(sensor.alerts.len() <= 10);
        }
        prop_assert!(store.alerts(&AlertQuery::new()).len() <= 20);
    }

    #[test]
    fn history_stays_ordered_across_batches(
        first in 0u32..60,
        second in 0u32..60,
        seed in any::<u64>(),
    ) {
        let mut store = initialized(seed, GeneratorSet::standard());
        run_ticks(&mut store, 0, first);
        run_ticks(&mut store, first, second);
        for sensor in store.sensors() {
            let timestamps: Vec<_> = sensor.readings.iter().map(|r| r.timestamp).collect();
            prop_assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
