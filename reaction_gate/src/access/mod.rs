//! Access gating for the reaction game.
//!
//! A visitor is let through only when all three server-side checks pass:
//! - **Device**: the User-Agent carries a mobile platform signature
//! - **Security**: the User-Agent carries no automation signature and looks like
//!   a mainstream browser
//! - **Location**: the client IP geolocates to the permitted country
//!
//! Only the three booleans ([`PublicStatus`]) are ever handed back to clients.
//! The signature tables, the permitted country and the geolocation provider stay
//! on the server.
//!
//! ## Example
//!
//! ```no_run
//! use reaction_gate::access::{AccessValidator, HttpGeoLocator, ValidationRequest};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let locator = HttpGeoLocator::new(
//!         "http://ip-api.com/json/{ip}?fields=countryCode",
//!         Duration::from_secs(2),
//!     )?;
//!     let validator = AccessValidator::new(Arc::new(locator), "JO");
//!
//!     let request = ValidationRequest::new("Mozilla/5.0 (iPhone; ...)", "203.0.113.7");
//!     let result = validator.validate(&request).await;
//!     println!("access granted: {}", result.has_access);
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod client_ip;
pub mod device;
pub mod errors;
pub mod geo;
pub mod models;
pub mod validator;

pub use bot::{is_human_client, is_plausible_browser, matches_automation_signature};
pub use client_ip::{DEFAULT_CLIENT_IP, normalize_ip, resolve_client_ip};
pub use device::is_mobile_device;
pub use errors::{AccessError, AccessResult, GeoError, GeoResult};
pub use geo::{DEFAULT_GEO_ENDPOINT, DEFAULT_GEO_TIMEOUT, GeoLocator, HttpGeoLocator};
pub use models::{AccessGrant, PublicStatus, ValidationRequest, ValidationResult};
pub use validator::{AccessValidator, DEFAULT_ALLOWED_COUNTRY};
