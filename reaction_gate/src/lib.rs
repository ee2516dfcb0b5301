//! # Reaction Gate
//!
//! Server-side gatekeeping for a mobile reaction game.
//!
//! Visitors only reach the game when they pass three checks (mobile device,
//! human browser, permitted country). Once in, every game step is validated on
//! the server so scores cannot be forged client-side.
//!
//! ## Core Modules
//!
//! - [`access`]: Device, bot and geolocation checks producing an access decision
//! - [`session`]: Game sessions with rate-capped clicks, duration and score checks
//!
//! ## Example
//!
//! ```no_run
//! use reaction_gate::access::{AccessValidator, HttpGeoLocator, ValidationRequest};
//! use reaction_gate::session::{
//!     GameSessionGuard, GuardConfig, InMemorySessionStore, PlayerIdentity, SystemClock,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let locator = HttpGeoLocator::new(
//!         reaction_gate::access::DEFAULT_GEO_ENDPOINT,
//!         reaction_gate::access::DEFAULT_GEO_TIMEOUT,
//!     )?;
//!     let validator = AccessValidator::new(Arc::new(locator), "JO");
//!
//!     let config = GuardConfig::default();
//!     let store = Arc::new(InMemorySessionStore::new(config.max_sessions));
//!     let guard = GameSessionGuard::new(store, Arc::new(SystemClock), config);
//!
//!     let request = ValidationRequest::new("Mozilla/5.0 (iPhone; ...)", "203.0.113.7");
//!     let grant = validator.authorize(&request).await?;
//!     let game_id = guard.start(&grant).await?;
//!     println!("started {game_id}");
//!     Ok(())
//! }
//! ```

/// Access validation (device, bot, location).
pub mod access;
pub use access::{AccessGrant, AccessValidator, PublicStatus, ValidationRequest, ValidationResult};

/// Game sessions and anti-cheat checks.
pub mod session;
pub use session::{GameError, GameId, GameOutcome, GameSessionGuard, GuardConfig, PlayerIdentity};
