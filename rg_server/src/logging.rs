//! Structured logging configuration.
//!
//! This module provides structured logging with request correlation
//! and security event tracking. Records emitted through the `log` facade by
//! the `reaction_gate` library are bridged into the same subscriber.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the RUST_LOG env var.
///
/// # Example
///
/// ```no_run
/// use rg_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // `try_init` so tests that spin up several servers don't panic.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `ip_address` - Client IP the event is attributed to
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use rg_server::logging::log_security_event;
///
/// log_security_event(
///     "impossible_score",
///     "203.0.113.7",
///     "Claimed 900 clicks in a 30s game"
/// );
/// ```
pub fn log_security_event(event_type: &str, ip_address: &str, message: &str) {
    tracing::warn!(
        event_type = event_type,
        ip_address = ip_address,
        "SECURITY: {}",
        message
    );
}

/// Log access decision
///
/// Denials are kept at info since most of them are ordinary desktop visitors.
pub fn log_access_decision(ip_address: &str, location: bool, device: bool, security: bool) {
    if location && device && security {
        tracing::debug!(ip_address = ip_address, "Access granted");
    } else {
        tracing::info!(
            ip_address = ip_address,
            location = location,
            device = device,
            security = security,
            "Access denied"
        );
    }
}

/// Log API request/response
///
/// # Arguments
///
/// * `method` - HTTP method
/// * `path` - Request path
/// * `status_code` - Response status code
/// * `duration_ms` - Request duration in milliseconds
/// * `request_id` - Correlation ID echoed in `x-request-id`
///
pub fn log_api_request(
    method: &str,
    path: &str,
    status_code: u16,
    duration_ms: u64,
    request_id: &str,
) {
    if duration_ms > 1000 {
        tracing::warn!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            request_id = request_id,
            "PERFORMANCE: Slow request"
        );
    } else {
        tracing::info!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            request_id = request_id,
            "API request completed"
        );
    }
}
