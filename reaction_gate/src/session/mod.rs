//! Server-held game sessions with anti-cheat validation.
//!
//! A session moves through `NONE -> ACTIVE -> FINALIZED`:
//! - [`GameSessionGuard::start`] creates it (requires an [`AccessGrant`](crate::access::AccessGrant))
//! - [`GameSessionGuard::click`] counts clicks under a rate cap while the game window is open
//! - [`GameSessionGuard::end`] consumes it, checks duration and score plausibility
//!   and updates the best-score board
//!
//! Storage sits behind the [`SessionStore`] trait and time behind [`Clock`], so both
//! can be swapped (external TTL store, simulated time in tests).
//!
//! ## Example
//!
//! ```no_run
//! use reaction_gate::session::{
//!     GameSessionGuard, GuardConfig, InMemorySessionStore, PlayerIdentity, SystemClock,
//! };
//! use std::sync::Arc;
//!
//! # async fn example(grant: reaction_gate::access::AccessGrant) -> Result<(), Box<dyn std::error::Error>> {
//! let config = GuardConfig::default();
//! let store = Arc::new(InMemorySessionStore::new(config.max_sessions));
//! let guard = GameSessionGuard::new(store, Arc::new(SystemClock), config);
//!
//! let game_id = guard.start(&grant).await?;
//! guard.click(&game_id, grant.ip(), None).await?;
//! let outcome = guard
//!     .end(&game_id, 1, &PlayerIdentity::anonymous(), grant.ip())
//!     .await?;
//! println!("best score: {}", outcome.best_score);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod errors;
pub mod guard;
pub mod models;
pub mod scores;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GuardConfig;
pub use errors::{GameError, GameResult};
pub use guard::GameSessionGuard;
pub use models::{ClickReceipt, GameId, GameOutcome, GameSession, PlayerIdentity};
pub use scores::ScoreBoard;
pub use store::{CasOutcome, InMemorySessionStore, SessionStore};
