//! IP geolocation lookup.

use super::errors::{GeoError, GeoResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

/// Default provider URL template, `{ip}` is replaced by the client address
pub const DEFAULT_GEO_ENDPOINT: &str = "http://ip-api.com/json/{ip}?fields=countryCode";

/// Default upper bound for one lookup
pub const DEFAULT_GEO_TIMEOUT: Duration = Duration::from_secs(2);

/// User-Agent sent to the geolocation provider
const PROVIDER_USER_AGENT: &str = "Server-Validation/1.0";

/// Placeholder substituted with the client IP
const IP_PLACEHOLDER: &str = "{ip}";

/// Source of country codes for client addresses
#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// Look up the ISO 3166-1 alpha-2 country code for `ip`
    async fn country_code(&self, ip: IpAddr) -> GeoResult<String>;
}

#[derive(Debug, Deserialize)]
struct GeoPayload {
    #[serde(rename = "countryCode", alias = "country_code")]
    country_code: Option<String>,
}

/// Geolocation over an HTTP JSON API
///
/// Works with any provider that answers `GET <endpoint>` with a JSON object
/// carrying `countryCode` (ip-api.com) or `country_code` (ipapi.co).
#[derive(Debug, Clone)]
pub struct HttpGeoLocator {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpGeoLocator {
    /// Create a new HTTP geolocator
    ///
    /// # Arguments
    ///
    /// * `endpoint` - URL template containing `{ip}`
    /// * `timeout` - Upper bound for the whole lookup (connect, response, body)
    ///
    /// # Errors
    ///
    /// * `GeoError::Http` - HTTP client could not be built
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> GeoResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(PROVIDER_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    fn lookup_url(&self, ip: IpAddr) -> String {
        self.endpoint.replace(IP_PLACEHOLDER, &ip.to_string())
    }

    async fn fetch(&self, url: &str) -> GeoResult<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let payload: GeoPayload = serde_json::from_slice(&body)?;

        payload
            .country_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .ok_or(GeoError::MissingCountry)
    }
}

#[async_trait]
impl GeoLocator for HttpGeoLocator {
    async fn country_code(&self, ip: IpAddr) -> GeoResult<String> {
        let url = self.lookup_url(ip);

        tokio::time::timeout(self.timeout, self.fetch(&url))
            .await
            .map_err(|_| GeoError::Timeout(self.timeout))?
    }
}
