//! Route Definitions
//!
//! Maps URLs to handlers with type-safe routing.

use super::{handlers::*, monitoring::metrics_handler, websocket::websocket_handler};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        // Wagers
        .route("/api/bets", post(place_bet_handler))
        .route("/api/players/:player/history", get(history_handler))
        // Treasury
        .route("/api/treasury", get(treasury_handler))
        .route("/api/treasury/fund", post(fund_handler))
        .route("/api/treasury/withdraw", post(withdraw_handler))
        // Administration
        .route(
            "/api/parameters",
            get(get_parameters_handler).put(update_parameters_handler),
        )
        .route("/api/stats", get(stats_handler))
        // Provable fairness
        .route("/api/vrf/public-key", get(vrf_public_key_handler))
        .route("/api/vrf/verify", post(verify_vrf_handler))
        // Real-time events
        .route("/ws", get(websocket_handler))
        // Metrics endpoint for Prometheus
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
