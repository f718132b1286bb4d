//! Background tick driver.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use crate::state::{AppState, TickEvent};

/// Failures logged at `warn` before the collector goes quiet.
const LOUD_FAILURES: u64 = 3;

/// Background collector that ticks every sensor on a fixed period.
pub struct Collector {
    state: Arc<AppState>,
}

impl Collector {
    /// Create a new collector.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start ticking in the background.
    ///
    /// The first tick fires one period after start. The loop runs until the
    /// collector's cancellation token fires.
    pub fn start(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move { run(state).await })
    }
}

async fn run(state: Arc<AppState>) {
    let period = state.config.simulation.tick_interval();
    let cancel = state.collector.cancellation();

    info!(
        "Starting collector (interval: {}s)",
        state.config.simulation.tick_interval_secs
    );
    state.collector.set_running(true);

    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = timer.tick() => {}
        }

        match tick_once(&state, OffsetDateTime::now_utc()).await {
            Ok(count) => debug!("Tick complete for {} sensor(s)", count),
            Err(e) => {
                let failures = state.collector.record_failure();
                if failures <= LOUD_FAILURES {
                    warn!("Tick failed: {} (failure {})", e, failures);
                } else if failures == LOUD_FAILURES + 1 {
                    error!(
                        "Tick failed {} times, will keep ticking without logging each failure",
                        failures
                    );
                }
            }
        }
    }

    state.collector.set_running(false);
    info!("Collector stopped");
}

/// Tick every sensor once and broadcast the results.
///
/// Returns the number of sensors ticked.
pub async fn tick_once(state: &AppState, at: OffsetDateTime) -> Result<usize, CollectorError> {
    let events = {
        let mut store = state.store.write().await;
        let outcomes = store.tick_all(at).map_err(CollectorError::Store)?;
        outcomes
            .into_iter()
            .map(|outcome| {
                let name = store
                    .sensor(outcome.reading.sensor_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                TickEvent::new(name, outcome)
            })
            .collect::<Vec<_>>()
    };

    state.collector.record_tick(at);
    let count = events.len();
    for event in events {
        // No subscribers is fine.
        let _ = state.events_tx.send(event);
    }
    Ok(count)
}

/// Collector errors.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Failed to tick: {0}")]
    Store(ecowatch_store::Error),
}
