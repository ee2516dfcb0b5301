//! HTTP API for the reaction game.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP
//! - **Tower**: Middleware for CORS and request correlation
//! - **reaction_gate**: Access validation and session guard shared by all handlers
//!
//! # Modules
//!
//! - [`access`]: Access check for the calling client
//! - [`game`]: Game start, click and end
//! - [`client_ip`]: User-Agent and client IP extraction
//! - [`rate_limiter`]: Per-IP limit on game starts
//! - [`request_id`]: Request correlation middleware
//! - [`errors`]: Error to HTTP status mapping
//!
//! # Endpoints Overview
//!
//! - `GET /health` - Server health status
//! - `GET /api/v1/access` - Access decision with per-check breakdown
//! - `POST /api/v1/game/start` - Start a game (re-validates access)
//! - `POST /api/v1/game/click` - Count one click
//! - `POST /api/v1/game/end` - Submit the final score
//!
//! # Security
//!
//! - Access is re-validated on every game start, never cached
//! - Game identifiers are random and single use
//! - Click rate, game duration and score are checked server-side
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod access;
pub mod client_ip;
pub mod errors;
pub mod game;
pub mod rate_limiter;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use reaction_gate::{AccessValidator, GameSessionGuard};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::config::ScoreScope;
use rate_limiter::StartLimiter;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<AccessValidator>,
    pub guard: Arc<GameSessionGuard>,
    pub start_limiter: Arc<StartLimiter>,
    pub score_scope: ScoreScope,
}

/// Create the complete API router with all endpoints and middleware.
///
/// ## API v1
/// ```text
/// GET  /health                 - Health check
/// GET  /api/v1/access          - Access check
/// POST /api/v1/game/start      - Start game
/// POST /api/v1/game/click      - Click
/// POST /api/v1/game/end        - End game
/// ```
///
/// ## Legacy Routes (Deprecated)
/// ```text
/// POST /api/game/start         - Use /api/v1/game/start
/// POST /api/game/click         - Use /api/v1/game/click
/// POST /api/game/end           - Use /api/v1/game/end
/// ```
///
/// # Example
///
/// ```rust,no_run
/// # use rg_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:6969").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router())
        .route("/api/game/start", post(game::start_game))
        .route("/api/game/click", post(game::click))
        .route("/api/game/end", post(game::end_game))
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(request_id::request_id_middleware)),
        )
        .with_state(state)
}

/// Versioned routes, so a v2 can change payloads without breaking clients.
fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/access", get(access::check_access))
        .route("/game/start", post(game::start_game))
        .route("/game/click", post(game::click))
        .route("/game/end", post(game::end_game))
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"1.0.0","activeSessions":3,"timestamp":"2026-10-17T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "activeSessions": state.guard.active_sessions().await,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
