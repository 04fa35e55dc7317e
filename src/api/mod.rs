//! Dice Casino HTTP API
//!
//! JSON endpoints for every casino operation, a WebSocket event stream and
//! Prometheus metrics. Withdrawals and parameter updates require the
//! operator's bearer token.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod monitoring;
pub mod routes;
pub mod security;
pub mod server;
pub mod websocket;

pub use handlers::AppState;
pub use security::{hash_api_key, OperatorAuth};
pub use server::{build_app, ApiServer};
