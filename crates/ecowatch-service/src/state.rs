//! Application state shared across handlers.
//!
//! # Broadcast Channel Behavior
//!
//! The `events_tx` broadcast channel carries one [`TickEvent`] per sensor per
//! tick to WebSocket clients.
//!
//! - **Buffer size**: Configurable via `server.broadcast_buffer` (default: 100)
//! - **Message loss**: A subscriber that falls behind skips the oldest events
//! - **No blocking**: The collector never waits on slow receivers
//!
//! With eight sensors one tick publishes eight events, so the default buffer
//! holds a little over twelve ticks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;

use ecowatch_store::{SensorStore, TickOutcome};
use ecowatch_types::{Alert, Reading};

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// The sensor store. Ticks hold the write side for the whole mutation.
    pub store: RwLock<SensorStore>,
    /// Configuration the server was started with.
    pub config: Config,
    /// Broadcast channel for tick events.
    pub events_tx: broadcast::Sender<TickEvent>,
    /// Collector control state.
    pub collector: CollectorState,
}

impl AppState {
    /// Create new application state around an already initialized store.
    pub fn new(store: SensorStore, config: Config) -> Arc<Self> {
        let (events_tx, _) = broadcast::channel(config.server.broadcast_buffer.max(1));
        Arc::new(Self {
            store: RwLock::new(store),
            config,
            events_tx,
            collector: CollectorState::new(),
        })
    }

    /// Build, initialize and wrap a store as described by `config`.
    pub fn from_config(config: Config) -> ecowatch_store::Result<Arc<Self>> {
        let options = config.store_options();
        let generators = config.generator_set();
        let mut store = match config.simulation.seed {
            Some(seed) => SensorStore::seeded(options, generators, seed),
            None => SensorStore::new(options, generators),
        };
        store.initialize()?;
        Ok(Self::new(store, config))
    }
}

/// State for tracking and controlling the collector.
pub struct CollectorState {
    /// Whether the collector loop is running.
    running: AtomicBool,
    /// When the collector was started (Unix timestamp, 0 if never).
    started_at: AtomicU64,
    /// Completed ticks.
    ticks: AtomicU64,
    /// Ticks that failed for at least one sensor.
    failures: AtomicU64,
    /// Time of the last completed tick (Unix timestamp, 0 if none).
    last_tick_at: AtomicI64,
    /// Cancelled on shutdown.
    cancel: CancellationToken,
}

impl CollectorState {
    /// Create a new collector state.
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            started_at: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            last_tick_at: AtomicI64::new(0),
            cancel: CancellationToken::new(),
        }
    }

    /// Check if the collector is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the collector as started or stopped.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
        if running {
            let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
            self.started_at.store(now, Ordering::SeqCst);
        }
    }

    /// Get the collector start time.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        let ts = self.started_at.load(Ordering::SeqCst);
        if ts == 0 {
            None
        } else {
            OffsetDateTime::from_unix_timestamp(ts as i64).ok()
        }
    }

    pub(crate) fn record_tick(&self, at: OffsetDateTime) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        self.last_tick_at.store(at.unix_timestamp(), Ordering::SeqCst);
    }

    pub(crate) fn record_failure(&self) -> u64 {
        self.failures.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Completed ticks since startup.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Failed ticks since startup.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Time of the last completed tick.
    pub fn last_tick_at(&self) -> Option<OffsetDateTime> {
        let ts = self.last_tick_at.load(Ordering::SeqCst);
        if ts == 0 {
            None
        } else {
            OffsetDateTime::from_unix_timestamp(ts).ok()
        }
    }

    /// Token the collector loop watches for shutdown.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Signal the collector to stop.
    pub fn signal_stop(&self) {
        self.cancel.cancel();
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Default for CollectorState {
    fn default() -> Self {
        Self::new()
    }
}

/// A tick event for WebSocket broadcast.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickEvent {
    pub sensor_id: u32,
    pub sensor_name: String,
    /// The reading appended by this tick.
    pub reading: Reading,
    /// Alerts raised by the reading; empty in the connect snapshot.
    pub alerts: Vec<Alert>,
}

impl TickEvent {
    pub fn new(sensor_name: impl Into<String>, outcome: TickOutcome) -> Self {
        Self {
            sensor_id: outcome.reading.sensor_id,
            sensor_name: sensor_name.into(),
            reading: outcome.reading,
            alerts: outcome.alerts,
        }
    }
}
