//! Fixed-tick game loop and websocket broadcast.
//!
//! The loop owns the write side of the shared state and publishes one
//! serialized snapshot per tick on a broadcast channel. Each websocket
//! connection runs its own forward loop off a channel subscription, so a
//! slow or dead client never stalls the simulation or other clients.

use crate::payload::{get_timestamp, GameSnapshot};
use crate::state::GameState;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, RwLock};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

pub type SharedState = Arc<RwLock<GameState>>;

/// Advances the simulation at the fixed tick rate and publishes one
/// snapshot per tick.
pub async fn run_game_loop(
    state: SharedState,
    snapshots: broadcast::Sender<String>,
    tick_rate: u32,
) {
    let dt = 1.0 / tick_rate.max(1) as f32;
    let mut timer = interval(Duration::from_secs_f32(dt));
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Skip the first tick since it fires immediately
    timer.tick().await;

    loop {
        timer.tick().await;

        let (snapshot, tick) = {
            let mut state = state.write().await;
            state.update(dt, &mut rand::thread_rng());
            (GameSnapshot::from_state(&state, get_timestamp()), state.tick)
        };

        match serde_json::to_string(&snapshot) {
            // A send error only means nobody is connected right now.
            Ok(text) => {
                let _ = snapshots.send(text);
            }
            Err(e) => error!("Failed to serialize snapshot: {}", e),
        }

        // Periodic monitoring
        if tick % (tick_rate.max(1) as u64 * 10) == 0 {
            debug!(
                "Tick {}: {} connected clients",
                tick,
                snapshots.receiver_count()
            );
        }
    }
}

/// Accepts websocket clients; each one forwards the broadcast snapshots.
pub async fn serve(
    addr: String,
    snapshots: broadcast::Sender<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(&addr).await?;
    info!("Game state channel listening on ws://{}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        let receiver = snapshots.subscribe();

        tokio::spawn(async move {
            if let Err(e) = forward_loop(stream, peer, receiver).await {
                warn!("Forward loop for {} ended with error: {}", peer, e);
            }
        });
    }
}

/// Forwards snapshots to one client until it goes away.
async fn forward_loop(
    stream: TcpStream,
    peer: SocketAddr,
    mut snapshots: broadcast::Receiver<String>,
) -> Result<(), WsError> {
    let ws_stream = accept_async(stream).await?;
    info!("WebSocket client connected from {}", peer);

    // The read half is dropped: clients never send anything we consume.
    let (mut sender, _receiver) = ws_stream.split();

    loop {
        match snapshots.recv().await {
            Ok(text) => {
                if sender.send(Message::Text(text)).await.is_err() {
                    info!("WebSocket client {} disconnected", peer);
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("Client {} lagged, skipped {} snapshots", peer, missed);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[tokio::test]
    async fn test_snapshots_reach_subscribers() {
        let mut rng = StdRng::seed_from_u64(31);
        let state: SharedState = Arc::new(RwLock::new(GameState::new(&mut rng)));
        let (snapshots, mut receiver) = broadcast::channel(16);

        // One hand-driven loop iteration.
        let text = {
            let mut state = state.write().await;
            state.update(1.0 / 30.0, &mut rand::thread_rng());
            serde_json::to_string(&GameSnapshot::from_state(&state, get_timestamp())).unwrap()
        };
        snapshots.send(text.clone()).unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received, text);

        let value: serde_json::Value = serde_json::from_str(&received).unwrap();
        assert!(value["players"].is_array());
        assert!(value["puck"].is_object());
    }

    #[test]
    fn test_send_without_subscribers_is_not_fatal() {
        let (snapshots, _) = broadcast::channel::<String>(16);
        // Mirrors the loop's behavior: the error is simply discarded.
        assert!(snapshots.send("{}".to_string()).is_err());
    }
}
