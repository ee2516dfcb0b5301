//! Game session endpoints: start, click and end.
//!
//! Every step is validated server-side by the
//! [`GameSessionGuard`](reaction_gate::GameSessionGuard); the client only ever
//! holds an opaque game identifier.
//!
//! # Examples
//!
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/game/start -H "User-Agent: Mozilla/5.0 (iPhone; ...)"
//! curl -X POST http://localhost:6969/api/v1/game/click \
//!   -H "Content-Type: application/json" \
//!   -d '{"gameId": "game_3f9a...", "timestamp": 1731400000000}'
//! curl -X POST http://localhost:6969/api/v1/game/end \
//!   -H "Content-Type: application/json" \
//!   -d '{"gameId": "game_3f9a...", "score": 143}'
//! ```

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use reaction_gate::{GameError, GameId, GameOutcome, PlayerIdentity, PublicStatus};
use serde::{Deserialize, Serialize};

use super::{
    AppState, access::record_access_decision, client_ip::RequestMeta, errors::ApiError,
    request_id::RequestId,
};
use crate::config::ScoreScope;
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickPayload {
    pub game_id: GameId,
    /// Client-side click time in ms since the epoch, informational only
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndPayload {
    pub game_id: GameId,
    pub score: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub game_id: GameId,
}

#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub success: bool,
    pub clicks: u32,
}

/// Start a game after re-validating access.
///
/// # Errors
///
/// - `429 Too Many Requests`: Per-IP start limit reached
/// - `403 Forbidden`: Access checks failed for this request
/// - `503 Service Unavailable`: Session capacity reached
pub async fn start_game(
    State(state): State<AppState>,
    request_id: RequestId,
    meta: RequestMeta,
) -> Result<Json<StartResponse>, ApiError> {
    if let Err(retry_after) = state.start_limiter.check(meta.ip()).await {
        metrics::rate_limit_hits_total("game_start");
        tracing::info!(ip_address = meta.ip(), "Game start limit reached");
        return Err(ApiError::StartLimited(retry_after));
    }

    let grant = match state.validator.authorize(meta.request()).await {
        Ok(grant) => {
            record_access_decision(meta.ip(), &PublicStatus::granted());
            grant
        }
        Err(err) => {
            record_access_decision(meta.ip(), &err.public_status());
            return Err(err.into());
        }
    };

    let game_id = state.guard.start(&grant).await.inspect_err(|err| {
        tracing::error!(ip_address = meta.ip(), "Game start refused: {}", err);
    })?;

    metrics::game_sessions_started_total();
    metrics::game_sessions_active(state.guard.active_sessions().await);
    tracing::info!(
        request_id = request_id.as_str(),
        ip_address = meta.ip(),
        game_id = %game_id,
        "Game started"
    );

    Ok(Json(StartResponse { game_id }))
}

/// Count one click.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown session or game window closed
/// - `429 Too Many Requests`: Click rate above the cap
pub async fn click(
    State(state): State<AppState>,
    meta: RequestMeta,
    payload: Result<Json<ClickPayload>, JsonRejection>,
) -> Result<Json<ClickResponse>, ApiError> {
    let Json(payload) = payload?;

    match state
        .guard
        .click(&payload.game_id, meta.ip(), payload.timestamp)
        .await
    {
        Ok(receipt) => {
            metrics::game_clicks_total("accepted");
            Ok(Json(ClickResponse {
                success: true,
                clicks: receipt.clicks,
            }))
        }
        Err(err) => {
            metrics::game_clicks_total(error_label(err));
            report_suspicious(err, meta.ip(), &payload.game_id);
            Err(err.into())
        }
    }
}

/// Finish a game and submit the claimed score.
///
/// # Response
///
/// ```json
/// { "success": true, "newBest": true, "bestScore": 143 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown or finished session, duration outside the
///   accepted window, or impossible score
pub async fn end_game(
    State(state): State<AppState>,
    meta: RequestMeta,
    payload: Result<Json<EndPayload>, JsonRejection>,
) -> Result<Json<GameOutcome>, ApiError> {
    let Json(payload) = payload?;

    let identity = match state.score_scope {
        ScoreScope::Anonymous => PlayerIdentity::anonymous(),
        ScoreScope::ClientIp => PlayerIdentity::from_ip(meta.ip()),
    };

    let result = state
        .guard
        .end(&payload.game_id, payload.score, &identity, meta.ip())
        .await;

    metrics::game_sessions_active(state.guard.active_sessions().await);

    match result {
        Ok(outcome) => {
            metrics::game_finished_total("completed");
            Ok(Json(outcome))
        }
        Err(err) => {
            metrics::game_finished_total(error_label(err));
            report_suspicious(err, meta.ip(), &payload.game_id);
            Err(err.into())
        }
    }
}

fn report_suspicious(err: GameError, ip: &str, game_id: &GameId) {
    if err.is_suspicious() {
        logging::log_security_event(
            error_label(err),
            ip,
            &format!("{} on game {}", err, game_id),
        );
    }
}

/// Metric label for a rejected game step
fn error_label(err: GameError) -> &'static str {
    match err {
        GameError::InvalidSession => "invalid_session",
        GameError::GameExpired => "game_expired",
        GameError::RateExceeded => "rate_exceeded",
        GameError::InvalidDuration => "invalid_duration",
        GameError::ImpossibleScore => "impossible_score",
        GameError::TooManySessions => "too_many_sessions",
    }
}
