//! Access validation error types.

use super::models::PublicStatus;
use std::time::Duration;
use thiserror::Error;

/// Geolocation lookup errors
///
/// These never reach a client. The validator logs them and treats the
/// location check as failed.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Transport error talking to the provider
    #[error("Geolocation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider did not answer in time
    #[error("Geolocation lookup timed out after {0:?}")]
    Timeout(Duration),

    /// Provider answered with a non-2xx status
    #[error("Geolocation provider returned status {0}")]
    Status(u16),

    /// Response body was not the expected JSON
    #[error("Malformed geolocation response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Response carried no country code
    #[error("Geolocation response has no country code")]
    MissingCountry,

    /// Client address is not an IP address
    #[error("Invalid IP address: {0}")]
    InvalidIp(String),
}

/// Result type for geolocation lookups
pub type GeoResult<T> = Result<T, GeoError>;

/// Access gate errors
#[derive(Debug, Error)]
pub enum AccessError {
    /// One or more access checks failed
    #[error("Access denied")]
    Denied(PublicStatus),
}

impl AccessError {
    /// Per-check breakdown that may be shown to the denied visitor
    pub fn public_status(&self) -> PublicStatus {
        match self {
            AccessError::Denied(status) => *status,
        }
    }
}

/// Result type for access gating
pub type AccessResult<T> = Result<T, AccessError>;
