use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use telemetry::api;
use telemetry::context::{SharedContext, SimContext};
use telemetry::push;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Parses command-line arguments, then runs the generation loop, the HTTP
/// API and the websocket push channel as independent tasks.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// HTTP API port
        #[clap(short, long, default_value = "5000")]
        port: u16,
        /// WebSocket push port
        #[clap(short = 'w', long, default_value = "8765")]
        ws_port: u16,
        /// Generation ticks per second
        #[clap(short, long, default_value = "1")]
        tick_rate: u32,
    }

    env_logger::init();
    let args = Args::parse();

    let tick_interval = Duration::from_secs_f32(1.0 / args.tick_rate.max(1) as f32);
    let ctx: SharedContext = Arc::new(RwLock::new(SimContext::new(&mut rand::thread_rng())));

    // Background generation loop
    let generator_handle = {
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            run_generation_loop(ctx, tick_interval).await;
        })
    };

    // WebSocket push channel
    let push_handle = {
        let ctx = Arc::clone(&ctx);
        let addr = format!("{}:{}", args.host, args.ws_port);
        tokio::spawn(async move {
            if let Err(e) = push::serve(addr, ctx, tick_interval).await {
                error!("WebSocket server failed: {}", e);
            }
        })
    };

    // HTTP API
    let api_handle = {
        let ctx = Arc::clone(&ctx);
        let addr = format!("{}:{}", args.host, args.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("HTTP API listening on http://{}", addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, api::router(ctx)).await {
                error!("HTTP server failed: {}", e);
            }
        })
    };

    // Handle shutdown gracefully
    tokio::select! {
        result = generator_handle => {
            if let Err(e) = result {
                error!("Generation task panicked: {}", e);
            }
        }
        result = push_handle => {
            if let Err(e) = result {
                error!("WebSocket task panicked: {}", e);
            }
        }
        result = api_handle => {
            if let Err(e) = result {
                error!("HTTP task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}

/// Advances the shared context once per tick, forever.
async fn run_generation_loop(ctx: SharedContext, tick_interval: Duration) {
    let mut timer = interval(tick_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Skip the first tick since it fires immediately
    timer.tick().await;

    loop {
        timer.tick().await;
        let mut ctx = ctx.write().await;
        ctx.advance_tick(&mut rand::thread_rng());
    }
}
