//! Two-player chess over WebSockets.
//!
//! The relay pairs two clients in a short-lived room and forwards their
//! moves; the chess rules themselves live in shakmaty and are only applied
//! on the clients.

pub mod client;
pub mod config;
pub mod game;
pub mod identity;
pub mod models;
pub mod rooms;
pub mod routes;
pub mod websocket;

use std::{sync::Arc, time::Instant};

use axum::{routing::get, Router};
use config::Config;
use rooms::RoomRegistry;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    /// All open rooms keyed by room code
    pub rooms: RoomRegistry,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            rooms: RoomRegistry::new(),
        })
    }
}

/// Build the relay router: WebSocket endpoint, API routes and the static client
pub fn build_router(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Serve the browser client build
    let frontend_service = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/ws", get(websocket::handle_websocket))
        .merge(routes::create_routes())
        .fallback_service(frontend_service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Background task that periodically removes rooms left without connected players
pub async fn room_cleanup_task(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(state.config.cleanup_interval());
    let grace = state.config.empty_grace_period();

    loop {
        interval.tick().await;

        for room_id in state.rooms.remove_expired(Instant::now(), grace) {
            tracing::info!("Removed empty room {} (grace period expired)", room_id);
        }
    }
}
