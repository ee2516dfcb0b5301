//! Mapping of library errors onto HTTP responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use reaction_gate::access::AccessError;
use reaction_gate::session::GameError;
use serde::Serialize;
use std::time::Duration;

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors surfaced by the HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("Invalid request body")]
    InvalidBody(#[from] JsonRejection),

    /// Per-IP start limit hit; carries the time until the next allowed start
    #[error("Too many games started, please try again later")]
    StartLimited(Duration),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Access(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::StartLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Game(err) => match err {
                GameError::InvalidSession
                | GameError::GameExpired
                | GameError::InvalidDuration
                | GameError::ImpossibleScore => StatusCode::BAD_REQUEST,
                GameError::RateExceeded => StatusCode::TOO_MANY_REQUESTS,
                GameError::TooManySessions => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    /// Message safe to show to the client
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Game(err) => err.client_message(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status_code(),
            Json(ErrorResponse {
                error: self.client_message(),
            }),
        )
            .into_response();

        if let ApiError::StartLimited(retry_after) = self {
            // Whole seconds, rounded up so clients never retry too early
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }

        response
    }
}
