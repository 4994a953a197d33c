//! HTTP surface: the `/ws` WebSocket endpoint plus static frontend
//! files for everything else.

pub mod websocket;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, routing::get};
use holdem::table::TableHandle;
use tower_http::services::ServeDir;

use crate::metrics::Metrics;

/// State shared by every connection. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the single table actor.
    pub table: TableHandle,
    pub metrics: Arc<Metrics>,
    /// Outbound queue depth per websocket session.
    pub subscriber_capacity: usize,
}

pub fn create_router(state: AppState, frontend_dir: PathBuf) -> Router {
    Router::new()
        .route("/ws", get(websocket::websocket_handler))
        .fallback_service(ServeDir::new(frontend_dir))
        .with_state(state)
}
