//! Integration tests for the HTTP geolocation lookup.
//!
//! A local axum server stands in for the geolocation provider so success,
//! error statuses, malformed bodies and slow responses can all be exercised.

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    routing::get,
};
use reaction_gate::access::{
    AccessValidator, GeoError, GeoLocator, HttpGeoLocator, ValidationRequest,
};
use serde_json::json;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) \
                         AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148 Safari/604.1";

/// Fake provider: 203.0.113.x is Jordan, everything else is the US
async fn lookup(Path(ip): Path<String>, headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
    let agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if agent != "Server-Validation/1.0" {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "unexpected agent" })));
    }

    let country = if ip.starts_with("203.0.113.") { "JO" } else { "US" };
    (StatusCode::OK, Json(json!({ "countryCode": country })))
}

async fn spawn_provider() -> SocketAddr {
    let app = Router::new()
        .route("/json/{ip}", get(lookup))
        .route("/legacy/{ip}", get(|| async { Json(json!({ "country_code": "JO" })) }))
        .route(
            "/error/{ip}",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exceeded") }),
        )
        .route("/garbage/{ip}", get(|| async { "<html>not json</html>" }))
        .route(
            "/reserved/{ip}",
            get(|| async { Json(json!({ "status": "fail", "message": "reserved range" })) }),
        )
        .route(
            "/slow/{ip}",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "countryCode": "JO" }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn locator(addr: SocketAddr, path: &str, timeout: Duration) -> HttpGeoLocator {
    HttpGeoLocator::new(format!("http://{addr}/{path}/{{ip}}"), timeout).unwrap()
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_lookup_returns_country_code() {
    let addr = spawn_provider().await;
    let geo = locator(addr, "json", Duration::from_secs(2));

    assert_eq!(geo.country_code(ip("203.0.113.7")).await.unwrap(), "JO");
    assert_eq!(geo.country_code(ip("198.51.100.4")).await.unwrap(), "US");
}

#[tokio::test]
async fn test_lookup_accepts_snake_case_field() {
    let addr = spawn_provider().await;
    let geo = locator(addr, "legacy", Duration::from_secs(2));

    assert_eq!(geo.country_code(ip("203.0.113.7")).await.unwrap(), "JO");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let addr = spawn_provider().await;
    let geo = locator(addr, "error", Duration::from_secs(2));

    let err = geo.country_code(ip("203.0.113.7")).await.unwrap_err();
    assert!(matches!(err, GeoError::Status(429)), "got {err:?}");
}

#[tokio::test]
async fn test_malformed_body_is_reported() {
    let addr = spawn_provider().await;
    let geo = locator(addr, "garbage", Duration::from_secs(2));

    let err = geo.country_code(ip("203.0.113.7")).await.unwrap_err();
    assert!(matches!(err, GeoError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn test_missing_country_is_reported() {
    let addr = spawn_provider().await;
    let geo = locator(addr, "reserved", Duration::from_secs(2));

    let err = geo.country_code(ip("10.0.0.1")).await.unwrap_err();
    assert!(matches!(err, GeoError::MissingCountry), "got {err:?}");
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let addr = spawn_provider().await;
    let geo = locator(addr, "slow", Duration::from_millis(200));

    let start = Instant::now();
    let err = geo.country_code(ip("203.0.113.7")).await.unwrap_err();
    assert!(matches!(err, GeoError::Timeout(_)), "got {err:?}");
    assert!(start.elapsed() < Duration::from_secs(2), "lookup must be bounded");
}

#[tokio::test]
async fn test_unreachable_provider_is_reported() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let geo = locator(addr, "json", Duration::from_secs(2));
    let err = geo.country_code(ip("203.0.113.7")).await.unwrap_err();
    assert!(matches!(err, GeoError::Http(_)), "got {err:?}");
}

// ============================================================================
// Fail-Closed Validation Tests
// ============================================================================

#[tokio::test]
async fn test_validator_grants_through_real_lookup() {
    let addr = spawn_provider().await;
    let validator = AccessValidator::new(
        Arc::new(locator(addr, "json", Duration::from_secs(2))),
        "JO",
    );

    let result = validator
        .validate(&ValidationRequest::new(IPHONE_UA, "203.0.113.7"))
        .await;
    assert!(result.has_access);

    let result = validator
        .validate(&ValidationRequest::new(IPHONE_UA, "198.51.100.4"))
        .await;
    assert!(!result.has_access);
    assert!(!result.public_status.location);
}

#[tokio::test]
async fn test_validator_fails_closed_on_every_provider_failure() {
    let addr = spawn_provider().await;

    for path in ["error", "garbage", "reserved", "slow"] {
        let validator = AccessValidator::new(
            Arc::new(locator(addr, path, Duration::from_millis(200))),
            "JO",
        );
        let result = validator
            .validate(&ValidationRequest::new(IPHONE_UA, "203.0.113.7"))
            .await;
        assert!(!result.public_status.location, "{path} must fail closed");
        assert!(!result.has_access);
    }
}
