//! Single-table Texas Hold'em WebSocket server.
//!
//! Spawns one table actor, serves the static frontend, and bridges
//! WebSocket sessions to the actor's command inbox.

mod api;
mod config;
mod metrics;

use std::sync::Arc;

use anyhow::{Context, Error};
use ctrlc::set_handler;
use holdem::table::TableActor;
use log::info;
use pico_args::Arguments;

use crate::config::ServerConfig;

const HELP: &str = "\
Run a Texas Hold'em table server

USAGE:
  holdem_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT   Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --frontend   DIR       Static frontend directory   [default: env FRONTEND_DIR or ../frontend]

FLAGS:
  -h, --help             Print help information

ENVIRONMENT:
  SERVER_BIND            Server bind address (e.g. 0.0.0.0:8080)
  FRONTEND_DIR           Directory of static files served at /
  STARTING_CHIPS         Stack handed to every new player
  TABLE_SMALL_BLIND      Small blind amount
  TABLE_BIG_BLIND        Big blind amount
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists.
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override = pargs.opt_value_from_str("--bind")?;
    let frontend_override = pargs.opt_value_from_str("--frontend")?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let config = ServerConfig::from_env(bind_override, frontend_override)?;
    config.validate()?;
    info!("starting hold'em table server at {}", config.bind);

    let (actor, handle) = TableActor::new(config.table);
    tokio::spawn(actor.run());

    let shared_metrics = Arc::new(metrics::Metrics::default());
    metrics::spawn_logger(shared_metrics.clone(), handle.clone());

    let state = api::AppState {
        table: handle.clone(),
        metrics: shared_metrics,
        subscriber_capacity: config.table.subscriber_capacity,
    };
    let app = api::create_router(state, config.frontend_dir.clone());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind))?;
    info!(
        "serving frontend from {} at http://{}; press Ctrl+C to stop",
        config.frontend_dir.display(),
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutting down");
    let _ = handle.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        log::error!("failed to install CTRL+C signal handler");
    }
}
