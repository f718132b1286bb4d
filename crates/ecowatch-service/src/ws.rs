//! WebSocket handler for real-time updates.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use time::OffsetDateTime;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use ecowatch_store::TickOutcome;

use crate::state::{AppState, TickEvent};

/// Create the WebSocket router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/ws", get(ws_handler))
}

/// WebSocket upgrade handler.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Latest reading of every sensor, as events without alerts.
pub async fn snapshot(state: &AppState) -> Vec<TickEvent> {
    let store = state.store.read().await;
    store
        .sensors()
        .filter_map(|sensor| {
            sensor.latest_reading().map(|reading| {
                TickEvent::new(
                    sensor.name.clone(),
                    TickOutcome {
                        reading: reading.clone(),
                        alerts: Vec::new(),
                    },
                )
            })
        })
        .collect()
}

/// Newest reading timestamp per sensor already sent in the connect snapshot.
///
/// A tick that lands between subscribing and taking the snapshot shows up in
/// both; the cursor lets the stream skip the second copy.
#[derive(Debug, Default)]
pub struct SnapshotCursor {
    sent: HashMap<u32, OffsetDateTime>,
}

impl SnapshotCursor {
    pub fn new(snapshot: &[TickEvent]) -> Self {
        Self {
            sent: snapshot
                .iter()
                .map(|event| (event.sensor_id, event.reading.timestamp))
                .collect(),
        }
    }

    /// Whether `event` carries a reading newer than the snapshot's.
    pub fn is_fresh(&self, event: &TickEvent) -> bool {
        self.sent
            .get(&event.sensor_id)
            .is_none_or(|&sent| event.reading.timestamp > sent)
    }
}

/// Handle a WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before taking the snapshot so no tick is missed; ticks caught
    // by both are filtered through the cursor.
    let mut rx = state.events_tx.subscribe();

    info!("WebSocket client connected");

    let initial = snapshot(&state).await;
    let cursor = SnapshotCursor::new(&initial);
    for event in initial {
        if let Ok(json) = serde_json::to_string(&event)
            && sender.send(Message::Text(json.into())).await.is_err()
        {
            info!("WebSocket client disconnected during initial snapshot");
            return;
        }
    }

    debug!("Sent initial snapshot to WebSocket client");

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket client lagged, skipped {} event(s)", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if !cursor.is_fresh(&event) {
                debug!(sensor = event.sensor_id, "Skipping event already in snapshot");
                continue;
            }

            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(e) => {
                    warn!("Failed to serialize event: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Drain client frames; pongs are answered by axum.
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        },
        _ = &mut recv_task => {
            send_task.abort();
        },
    }

    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::tick_once;
    use crate::config::Config;

    #[tokio::test]
    async fn test_snapshot_has_latest_reading_per_sensor() {
        let mut config = Config::default();
        config.simulation.seed = Some(8);
        let state = AppState::from_config(config).unwrap();

        let events = snapshot(&state).await;
        assert_eq!(events.len(), 8);

        let store = state.store.read().await;
        for event in &events {
            let sensor = store.sensor(event.sensor_id).unwrap();
            assert_eq!(event.sensor_name, sensor.name);
            assert_eq!(Some(&event.reading), sensor.latest_reading());
            assert!(event.alerts.is_empty());
        }
    }

    #[tokio::test]
    async fn test_snapshot_of_empty_store() {
        let config = Config::default();
        let store = ecowatch_store::SensorStore::seeded(
            config.store_options(),
            config.generator_set(),
            1,
        );
        let state = AppState::new(store, config);
        assert!(snapshot(&state).await.is_empty());
    }

    #[tokio::test]
    async fn test_cursor_skips_ticks_already_in_snapshot() {
        let mut config = Config::default();
        config.simulation.seed = Some(8);
        let state = AppState::from_config(config).unwrap();
        let mut rx = state.events_tx.subscribe();

        // This tick lands after subscribing but before the snapshot.
        let at = OffsetDateTime::now_utc();
        tick_once(&state, at).await.unwrap();
        let initial = snapshot(&state).await;
        let cursor = SnapshotCursor::new(&initial);
        assert!(initial.iter().all(|e| e.reading.timestamp == at));

        for _ in 0..initial.len() {
            let event = rx.recv().await.unwrap();
            assert!(!cursor.is_fresh(&event));
        }

        tick_once(&state, at + time::Duration::seconds(5)).await.unwrap();
        let event = rx.recv().await.unwrap();
        assert!(cursor.is_fresh(&event));
    }

    #[tokio::test]
    async fn test_cursor_passes_unknown_sensors() {
        let mut config = Config::default();
        config.simulation.seed = Some(8);
        let state = AppState::from_config(config).unwrap();

        let events = snapshot(&state).await;
        let cursor = SnapshotCursor::new(&events[1..]);
        assert!(cursor.is_fresh(&events[0]));
        assert!(!cursor.is_fresh(&events[1]));
    }
}
