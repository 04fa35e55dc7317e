//! Monitoring & Metrics
//!
//! Request counters kept in atomics, exported together with casino
//! statistics in Prometheus text format.

use super::handlers::AppState;
use crate::games::settlement::Casino;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Prometheus-compatible metrics registry
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    pub http_requests_total: AtomicU64,
    pub http_errors_total: AtomicU64,
    pub websocket_connections_active: AtomicU64,
    pub websocket_messages_sent: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one HTTP response
    pub fn record_http_request(&self, status: StatusCode) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        if status.is_client_error() || status.is_server_error() {
            self.http_errors_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn websocket_connected(&self) {
        self.websocket_connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn websocket_disconnected(&self) {
        self.websocket_connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn record_websocket_message(&self) {
        self.websocket_messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Render metrics in Prometheus exposition format
    pub fn to_prometheus_format(&self, casino: &Casino) -> String {
        let mut output = String::new();

        push_metric(
            &mut output,
            "dice_http_requests_total",
            "Total number of HTTP requests",
            "counter",
            self.http_requests_total.load(Ordering::Relaxed),
        );
        push_metric(
            &mut output,
            "dice_http_errors_total",
            "HTTP responses with a 4xx or 5xx status",
            "counter",
            self.http_errors_total.load(Ordering::Relaxed),
        );
        push_metric(
            &mut output,
            "dice_websocket_connections_active",
            "Active WebSocket connections",
            "gauge",
            self.websocket_connections_active.load(Ordering::Relaxed),
        );
        push_metric(
            &mut output,
            "dice_websocket_messages_sent_total",
            "Events delivered to WebSocket clients",
            "counter",
            self.websocket_messages_sent.load(Ordering::Relaxed),
        );

        let stats = casino.stats();
        push_metric(&mut output, "dice_bets_total", "Bets settled", "counter", stats.bet_count);
        push_metric(&mut output, "dice_wins_total", "Winning bets", "counter", stats.wins);
        push_metric(&mut output, "dice_players", "Players with at least one bet", "gauge", stats.player_count);
        push_metric(
            &mut output,
            "dice_wagered_total",
            "Total amount staked, in currency units",
            "counter",
            stats.total_wagered,
        );
        push_metric(
            &mut output,
            "dice_paid_out_total",
            "Total amount paid to winners, in currency units",
            "counter",
            stats.total_paid_out,
        );
        push_metric(
            &mut output,
            "dice_treasury_balance",
            "Current treasury balance, in currency units",
            "gauge",
            casino.balance_of(),
        );

        output
    }
}

fn push_metric(output: &mut String, name: &str, help: &str, kind: &str, value: impl std::fmt::Display) {
    output.push_str(&format!(
        "# HELP {name} {help}\n# TYPE {name} {kind}\n{name} {value}\n\n"
    ));
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let metrics = state.metrics.to_prometheus_format(&state.casino);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        metrics,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::randomness::ScriptedDiceSource;
    use crate::games::types::{AccountId, DieFace, GameParameters};

    #[test]
    fn test_prometheus_output() {
        let casino = Casino::new(
            AccountId::new("owner"),
            GameParameters::standard(),
            Arc::new(ScriptedDiceSource::repeating(DieFace::new(2).unwrap())),
        )
        .unwrap();
        casino.fund(&AccountId::new("owner"), "1".parse().unwrap()).unwrap();
        casino.place_bet(&AccountId::new("p"), 5, "0.05".parse().unwrap()).unwrap();

        let registry = MetricsRegistry::new();
        registry.record_http_request(StatusCode::OK);
        registry.record_http_request(StatusCode::CONFLICT);

        let text = registry.to_prometheus_format(&casino);
        assert!(text.contains("dice_http_requests_total 2\n"));
        assert!(text.contains("dice_http_errors_total 1\n"));
        assert!(text.contains("dice_bets_total 1\n"));
        assert!(text.contains("dice_treasury_balance 1.05\n"));
        assert!(text.contains("# TYPE dice_wagered_total counter"));
    }
}
