//! Prometheus text exposition.
//!
//! # Metrics
//!
//! Per sensor, labelled with `sensor` (id) and `name`:
//! - `ecowatch_aqi`
//! - `ecowatch_temperature_celsius`
//! - `ecowatch_humidity_percent`
//! - `ecowatch_co2_ppm`
//! - `ecowatch_readings_retained`
//!
//! Site-wide:
//! - `ecowatch_campus_green_index`
//! - `ecowatch_alerts_total{level}`
//! - `ecowatch_collector_running`
//! - `ecowatch_collector_ticks_total`
//! - `ecowatch_collector_failures_total`
//! - `ecowatch_collector_uptime_seconds`

use time::OffsetDateTime;

use ecowatch_store::SensorStore;
use ecowatch_types::Reading;

use crate::state::CollectorState;

/// Content type of the text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render every metric as Prometheus text.
pub fn render(store: &SensorStore, collector: &CollectorState, now: OffsetDateTime) -> String {
    let mut output = String::with_capacity(4096);

    output.push_str("# EcoWatch sensor metrics\n");
    output.push_str(&format!(
        "# Generated at {}\n\n",
        now.format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default()
    ));

    render_collector(collector, now, &mut output);
    render_sensors(store, &mut output);

    let stats = store.dashboard_stats_at(now);
    family(
        &mut output,
        "ecowatch_campus_green_index",
        "Campus green index (0-100)",
        "gauge",
        [format!("ecowatch_campus_green_index {:.2}", stats.campus_green_index)],
    );

    let counts = store.alert_counts();
    family(
        &mut output,
        "ecowatch_alerts_total",
        "Alerts raised since initialization",
        "counter",
        [
            format!("ecowatch_alerts_total{{level=\"warning\"}} {}", counts.warning),
            format!("ecowatch_alerts_total{{level=\"critical\"}} {}", counts.critical),
        ],
    );

    output
}

fn render_collector(collector: &CollectorState, now: OffsetDateTime, output: &mut String) {
    family(
        output,
        "ecowatch_collector_running",
        "Whether the collector is running (1=running, 0=stopped)",
        "gauge",
        [format!(
            "ecowatch_collector_running {}",
            if collector.is_running() { 1 } else { 0 }
        )],
    );
    family(
        output,
        "ecowatch_collector_ticks_total",
        "Completed ticks",
        "counter",
        [format!("ecowatch_collector_ticks_total {}", collector.ticks())],
    );
    family(
        output,
        "ecowatch_collector_failures_total",
        "Failed ticks",
        "counter",
        [format!("ecowatch_collector_failures_total {}", collector.failures())],
    );

    if let Some(started_at) = collector.started_at() {
        let uptime = (now - started_at).whole_seconds().max(0);
        family(
            output,
            "ecowatch_collector_uptime_seconds",
            "How long the collector has been running",
            "gauge",
            [format!("ecowatch_collector_uptime_seconds {}", uptime)],
        );
    }
}

fn render_sensors(store: &SensorStore, output: &mut String) {
    let latest: Vec<(String, &Reading, usize)> = store
        .sensors()
        .filter_map(|sensor| {
            let labels = format!(
                "sensor=\"{}\",name=\"{}\"",
                sensor.id,
                escape_label_value(&sensor.name)
            );
            sensor
                .latest_reading()
                .map(|reading| (labels, reading, sensor.readings.len()))
        })
        .collect();

    if latest.is_empty() {
        return;
    }

    family(
        output,
        "ecowatch_aqi",
        "Air quality index",
        "gauge",
        latest
            .iter()
            .map(|(labels, r, _)| format!("ecowatch_aqi{{{}}} {}", labels, r.aqi)),
    );
    family(
        output,
        "ecowatch_temperature_celsius",
        "Temperature in degrees Celsius",
        "gauge",
        latest.iter().map(|(labels, r, _)| {
            format!("ecowatch_temperature_celsius{{{}}} {:.2}", labels, r.temperature)
        }),
    );
    family(
        output,
        "ecowatch_humidity_percent",
        "Relative humidity percentage",
        "gauge",
        latest.iter().map(|(labels, r, _)| {
            format!("ecowatch_humidity_percent{{{}}} {:.2}", labels, r.humidity)
        }),
    );
    family(
        output,
        "ecowatch_co2_ppm",
        "CO2 concentration in parts per million",
        "gauge",
        latest
            .iter()
            .map(|(labels, r, _)| format!("ecowatch_co2_ppm{{{}}} {}", labels, r.co2)),
    );
    family(
        output,
        "ecowatch_readings_retained",
        "Readings held in the sensor's history",
        "gauge",
        latest
            .iter()
            .map(|(labels, _, n)| format!("ecowatch_readings_retained{{{}}} {}", labels, n)),
    );
}

/// Write one metric family: HELP and TYPE lines, samples, blank line.
fn family(
    output: &mut String,
    name: &str,
    help: &str,
    kind: &str,
    samples: impl IntoIterator<Item = String>,
) {
    output.push_str(&format!("# HELP {} {}\n", name, help));
    output.push_str(&format!("# TYPE {} {}\n", name, kind));
    for sample in samples {
        output.push_str(&sample);
        output.push('\n');
    }
    output.push('\n');
}

/// Escape special characters in Prometheus label values.
fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
