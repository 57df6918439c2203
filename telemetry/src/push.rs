//! WebSocket push channel.
//!
//! Every connection gets its own push loop: once per cycle it advances the
//! shared context one tick and sends the freshly generated batch as a single
//! JSON message. Disconnects end only the affected loop.

use crate::context::SharedContext;
use crate::samples::TickMessage;
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

/// Accepts websocket clients and spawns a push loop per connection.
pub async fn serve(
    addr: String,
    ctx: SharedContext,
    push_interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(&addr).await?;
    info!("WebSocket push channel listening on ws://{}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        let ctx = ctx.clone();

        tokio::spawn(async move {
            if let Err(e) = push_loop(stream, peer, ctx, push_interval).await {
                warn!("Push loop for {} ended with error: {}", peer, e);
            }
        });
    }
}

/// Pushes one freshly generated tick per cycle until the client goes away.
async fn push_loop(
    stream: TcpStream,
    peer: SocketAddr,
    ctx: SharedContext,
    push_interval: Duration,
) -> Result<(), WsError> {
    let ws_stream = accept_async(stream).await?;
    info!("WebSocket client connected from {}", peer);

    // The read half is dropped: clients never send anything we consume.
    let (mut sender, _receiver) = ws_stream.split();

    let mut timer = interval(push_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        timer.tick().await;

        let players = {
            let mut ctx = ctx.write().await;
            ctx.advance_tick(&mut rand::thread_rng())
        };
        let message = TickMessage { players };

        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to serialize tick message: {}", e);
                continue;
            }
        };

        if sender.send(Message::Text(text)).await.is_err() {
            info!("WebSocket client {} disconnected", peer);
            break;
        }
    }

    Ok(())
}
