//! Prometheus metrics for monitoring
//!
//! Exposes metrics for:
//! - User actions and their outcomes
//! - Board refreshes
//! - Tips sent
//! - RPC failovers

use crate::error::{PortalError, PortalResult};

use axum::{http::StatusCode, routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram_vec, Counter,
    CounterVec, Encoder, Gauge, HistogramVec, TextEncoder,
};
use std::net::SocketAddr;
use tracing::info;

lazy_static! {
    // Action metrics
    pub static ref ACTIONS: CounterVec = register_counter_vec!(
        "gif_portal_actions_total",
        "Total user actions by outcome",
        &["action", "outcome"]
    ).unwrap();

    pub static ref ACTION_LATENCY: HistogramVec = register_histogram_vec!(
        "gif_portal_action_latency_seconds",
        "Time from user action to its outcome",
        &["action"],
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    ).unwrap();

    // Board metrics
    pub static ref REFRESHES: CounterVec = register_counter_vec!(
        "gif_portal_board_refreshes_total",
        "Board fetches by result",
        &["result"]
    ).unwrap();

    pub static ref SUBMISSIONS_LISTED: Gauge = register_gauge!(
        "gif_portal_submissions_listed",
        "Submissions shown after the last successful refresh"
    ).unwrap();

    // Tip metrics
    pub static ref LAMPORTS_TIPPED: Counter = register_counter!(
        "gif_portal_lamports_tipped_total",
        "Lamports sent as confirmed tips"
    ).unwrap();

    // RPC metrics
    pub static ref RPC_FAILOVERS: Counter = register_counter!(
        "gif_portal_rpc_failovers_total",
        "Times the provider switched RPC endpoint"
    ).unwrap();
}

/// Prometheus metrics server
pub struct MetricsServer {
    port: u16,
}

impl MetricsServer {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub async fn run(&self) -> PortalResult<()> {
        let app = Router::new().route("/metrics", get(metrics_handler));

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Starting metrics server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| PortalError::Internal(format!("Failed to bind {}: {}", addr, e)))?;
        axum::serve(listener, app)
            .await
            .map_err(|e| PortalError::Internal(e.to_string()))?;

        Ok(())
    }
}

async fn metrics_handler() -> Result<String, StatusCode> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

// Helper functions to record metrics

pub fn record_action(action: &str, outcome: &str, latency_secs: f64) {
    ACTIONS.with_label_values(&[action, outcome]).inc();
    ACTION_LATENCY
        .with_label_values(&[action])
        .observe(latency_secs);
}

pub fn record_refresh(result: &str) {
    REFRESHES.with_label_values(&[result]).inc();
}

pub fn record_submissions(count: usize) {
    SUBMISSIONS_LISTED.set(count as f64);
}

pub fn record_tip(lamports: u64) {
    LAMPORTS_TIPPED.inc_by(lamports as f64);
}

pub fn record_rpc_failover() {
    RPC_FAILOVERS.inc();
}
