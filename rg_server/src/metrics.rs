//! Prometheus metrics for monitoring access decisions and game sessions.
//!
//! Metrics are exposed in Prometheus text format for scraping by monitoring systems.
//! When no exporter is installed the recording calls are no-ops.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts, duration, status codes
//! - **Access Metrics**: Decisions and individual failed checks
//! - **Game Metrics**: Sessions started, clicks, finished games, sweeps
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use rg_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/game/start", 200);
//! metrics::game_sessions_active(12);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Access Metrics
// ============================================================================

/// Record one access decision.
pub fn access_decisions_total(granted: bool) {
    let result = if granted { "granted" } else { "denied" };
    metrics::counter!("access_decisions_total", "result" => result).increment(1);
}

/// Record a failed individual check (`location`, `device` or `security`).
pub fn access_checks_failed_total(check: &'static str) {
    metrics::counter!("access_checks_failed_total", "check" => check).increment(1);
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Increment started sessions counter.
pub fn game_sessions_started_total() {
    metrics::counter!("game_sessions_started_total").increment(1);
}

/// Set current active sessions count.
pub fn game_sessions_active(count: usize) {
    metrics::gauge!("game_sessions_active").set(count as f64);
}

/// Record a click outcome (`accepted` or the rejection reason).
pub fn game_clicks_total(result: &'static str) {
    metrics::counter!("game_clicks_total", "result" => result).increment(1);
}

/// Record a finished game (`completed` or the rejection reason).
pub fn game_finished_total(result: &'static str) {
    metrics::counter!("game_finished_total", "result" => result).increment(1);
}

/// Increment swept sessions counter.
pub fn sessions_swept_total(count: usize) {
    metrics::counter!("sessions_swept_total").increment(count as u64);
}

// ============================================================================
// Rate Limiting Metrics
// ============================================================================

/// Increment rate limit hits counter.
pub fn rate_limit_hits_total(endpoint: &str) {
    metrics::counter!("rate_limit_hits_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
}
