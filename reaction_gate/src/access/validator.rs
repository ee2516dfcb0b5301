//! Combined access validator.

use super::{
    bot::is_human_client,
    device::is_mobile_device,
    errors::{AccessError, AccessResult},
    geo::GeoLocator,
    models::{AccessGrant, PublicStatus, ValidationRequest, ValidationResult},
};
use log::{debug, warn};
use std::{net::IpAddr, sync::Arc};

/// Country permitted by default (Jordan)
pub const DEFAULT_ALLOWED_COUNTRY: &str = "JO";

/// Runs the device, security and location checks for a request
///
/// Nothing is cached between calls: every access-sensitive boundary runs a
/// fresh validation.
pub struct AccessValidator {
    locator: Arc<dyn GeoLocator>,
    allowed_country: String,
}

impl AccessValidator {
    /// Create a new access validator
    ///
    /// # Arguments
    ///
    /// * `locator` - Geolocation source for the location check
    /// * `allowed_country` - ISO 3166-1 alpha-2 code of the permitted country
    pub fn new(locator: Arc<dyn GeoLocator>, allowed_country: impl Into<String>) -> Self {
        let allowed_country: String = allowed_country.into();

        Self {
            locator,
            allowed_country: allowed_country.trim().to_ascii_uppercase(),
        }
    }

    /// Validate a request
    ///
    /// All three checks always run so the caller gets the full breakdown.
    pub async fn validate(&self, request: &ValidationRequest) -> ValidationResult {
        let device = is_mobile_device(&request.user_agent);
        let security = is_human_client(&request.user_agent);
        let location = self.check_location(&request.ip).await;

        let status = PublicStatus {
            location,
            device,
            security,
        };

        debug!(
            "Access validation for {}: location={} device={} security={}",
            request.ip, location, device, security
        );

        ValidationResult::from(status)
    }

    /// Validate a request and issue a grant if every check passed
    ///
    /// # Errors
    ///
    /// * `AccessError::Denied` - At least one check failed
    pub async fn authorize(&self, request: &ValidationRequest) -> AccessResult<AccessGrant> {
        let result = self.validate(request).await;

        if result.has_access {
            Ok(AccessGrant::new(request.ip.clone()))
        } else {
            Err(AccessError::Denied(result.public_status))
        }
    }

    /// Location check, fail-closed: any lookup error counts as outside the
    /// permitted country.
    async fn check_location(&self, ip: &str) -> bool {
        let addr = match ip.trim().parse::<IpAddr>() {
            Ok(addr) => addr,
            Err(_) => {
                warn!("Location check skipped, not an IP address: {:?}", ip);
                return false;
            }
        };

        match self.locator.country_code(addr).await {
            Ok(code) => code.eq_ignore_ascii_case(&self.allowed_country),
            Err(e) => {
                warn!("Location check failed for {}: {}", addr, e);
                false
            }
        }
    }
}
