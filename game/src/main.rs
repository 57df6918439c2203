use clap::Parser;
use game::push;
use game::state::GameState;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Parses command-line arguments, then runs the simulation loop and the
/// websocket broadcast server as independent tasks.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// WebSocket port to listen on
        #[clap(short, long, default_value = "8766")]
        port: u16,
        /// Tick rate (updates per second)
        #[clap(short, long, default_value = "30")]
        tick_rate: u32,
    }

    env_logger::init();
    let args = Args::parse();

    let state: push::SharedState =
        Arc::new(RwLock::new(GameState::new(&mut rand::thread_rng())));
    let (snapshots, _) = broadcast::channel(64);

    // Spawn game loop task
    let game_handle = {
        let state = Arc::clone(&state);
        let snapshots = snapshots.clone();
        tokio::spawn(async move {
            push::run_game_loop(state, snapshots, args.tick_rate).await;
        })
    };

    // Spawn network task
    let server_handle = {
        let addr = format!("{}:{}", args.host, args.port);
        tokio::spawn(async move {
            if let Err(e) = push::serve(addr, snapshots).await {
                error!("WebSocket server failed: {}", e);
            }
        })
    };

    // Handle shutdown gracefully
    tokio::select! {
        result = game_handle => {
            if let Err(e) = result {
                error!("Game loop task panicked: {}", e);
            }
        }
        result = server_handle => {
            if let Err(e) = result {
                error!("Network task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
