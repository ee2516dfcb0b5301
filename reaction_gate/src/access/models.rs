//! Access validation data models.

use serde::{Deserialize, Serialize};

/// Request metadata the access checks run against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    /// Raw User-Agent header, empty when absent
    pub user_agent: String,
    /// Resolved client IP
    pub ip: String,
}

impl ValidationRequest {
    pub fn new(user_agent: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ip: ip.into(),
        }
    }
}

/// Outcome of each individual check
///
/// This is the only part of a validation that is exposed to clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicStatus {
    /// Client IP geolocates to the permitted country
    pub location: bool,
    /// User-Agent identifies a mobile device
    pub device: bool,
    /// User-Agent looks like a human-driven browser
    pub security: bool,
}

impl PublicStatus {
    /// Breakdown of a request that passed every check
    pub const fn granted() -> Self {
        Self {
            location: true,
            device: true,
            security: true,
        }
    }

    /// Whether every check passed
    pub fn all_passed(&self) -> bool {
        self.location && self.device && self.security
    }
}

/// Access decision plus its public breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub has_access: bool,
    pub public_status: PublicStatus,
}

impl From<PublicStatus> for ValidationResult {
    fn from(public_status: PublicStatus) -> Self {
        Self {
            has_access: public_status.all_passed(),
            public_status,
        }
    }
}

/// Proof that access validation passed for one request
///
/// Only [`AccessValidator::authorize`](super::AccessValidator::authorize) can
/// create one, so a game session cannot be started without a fresh validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    ip: String,
}

impl AccessGrant {
    pub(crate) fn new(ip: impl Into<String>) -> Self {
        Self { ip: ip.into() }
    }

    /// Client IP the grant was issued for
    pub fn ip(&self) -> &str {
        &self.ip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granted_status_passes_everything() {
        assert!(PublicStatus::granted().all_passed());
        assert!(ValidationResult::from(PublicStatus::granted()).has_access);
    }

    #[test]
    fn test_access_requires_all_checks() {
        let status = PublicStatus {
            location: true,
            device: true,
            security: false,
        };
        assert!(!ValidationResult::from(status).has_access);

        let status = PublicStatus {
            location: true,
            device: true,
            security: true,
        };
        assert!(ValidationResult::from(status).has_access);
    }

    #[test]
    fn test_result_serializes_only_booleans() {
        let result = ValidationResult::from(PublicStatus {
            location: false,
            device: true,
            security: true,
        });

        let json = serde_json::to_value(result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hasAccess": false,
                "publicStatus": { "location": false, "device": true, "security": true }
            })
        );
    }
}
