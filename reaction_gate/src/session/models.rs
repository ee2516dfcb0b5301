//! Game session data models.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Random bytes in a generated game identifier
const GAME_ID_BYTES: usize = 24;

/// Opaque game session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Generate a new unguessable identifier (192 bits from the OS-seeded CSPRNG)
    pub fn generate() -> Self {
        let mut bytes = [0u8; GAME_ID_BYTES];
        rand::rng().fill(&mut bytes);
        Self(format!("game_{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for GameId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for GameId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One in-progress game attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    pub id: GameId,
    pub started_at: DateTime<Utc>,
    /// Accepted clicks so far
    pub clicks: u32,
    /// Client IP that started the game
    pub ip: String,
}

impl GameSession {
    pub fn new(id: GameId, ip: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            started_at,
            clicks: 0,
            ip: ip.into(),
        }
    }

    /// Milliseconds since the game started, zero if `now` is earlier
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.started_at).num_milliseconds()).unwrap_or(0)
    }
}

/// Key for best-score tracking
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerIdentity(String);

impl PlayerIdentity {
    const ANONYMOUS: &'static str = "anonymous";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Shared bucket for callers without an identity
    pub fn anonymous() -> Self {
        Self::new(Self::ANONYMOUS)
    }

    /// Identity scoped to a client IP
    pub fn from_ip(ip: &str) -> Self {
        Self(format!("ip:{ip}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Accepted click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickReceipt {
    /// Session click count including this click
    pub clicks: u32,
}

/// Result of a finalized game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOutcome {
    pub success: bool,
    pub new_best: bool,
    pub best_score: u32,
}
