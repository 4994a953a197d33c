//! Lightweight periodic health logging.
//!
//! No scrape endpoint; a background task logs connection and player
//! counts at a fixed interval, which is enough to watch a single-table
//! deployment.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use holdem::table::TableHandle;
use log::{info, warn};

const LOG_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
pub struct Metrics {
    active_connections: AtomicU64,
    total_connections: AtomicU64,
}

impl Metrics {
    pub fn connection_opened(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        self.total_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn active_connections(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }

    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }
}

/// Spawn the periodic logger. Stops on its own once the table actor is
/// gone.
pub fn spawn_logger(metrics: Arc<Metrics>, table: TableHandle) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(LOG_INTERVAL);
        // The first tick completes immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let snapshot = match table.snapshot(None).await {
                Ok(snapshot) => snapshot,
                Err(_) => {
                    warn!("table actor is gone; stopping metrics logger");
                    break;
                }
            };
            info!(
                "metrics: {} active connection(s), {} seated player(s), phase {}, {} connection(s) served",
                metrics.active_connections(),
                snapshot.players.len(),
                snapshot.game_phase,
                metrics.total_connections(),
            );
        }
    });
}
