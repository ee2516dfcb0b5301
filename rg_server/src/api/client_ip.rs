//! Request metadata extraction.
//!
//! Builds the [`ValidationRequest`] the access checks run against from the
//! `user-agent`, `x-forwarded-for` and `x-real-ip` headers.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::USER_AGENT, request::Parts},
};
use reaction_gate::access::{ValidationRequest, resolve_client_ip};
use std::convert::Infallible;

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const REAL_IP_HEADER: &str = "x-real-ip";

/// Per-request client metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta(pub ValidationRequest);

impl RequestMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_agent = header_str(headers, USER_AGENT.as_str()).unwrap_or_default();
        let ip = resolve_client_ip(
            header_str(headers, FORWARDED_FOR_HEADER),
            header_str(headers, REAL_IP_HEADER),
        );

        RequestMeta(ValidationRequest::new(user_agent, ip))
    }

    pub fn ip(&self) -> &str {
        &self.0.ip
    }

    pub fn request(&self) -> &ValidationRequest {
        &self.0
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestMeta::from_headers(&parts.headers))
    }
}
