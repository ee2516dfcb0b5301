//! Session storage.

use super::{
    errors::{GameError, GameResult},
    models::{GameId, GameSession},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Outcome of a compare-and-set on a session's click counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// Counter matched the expected value and was updated
    Applied,
    /// Counter changed since it was read, carries the current value
    Conflict(u32),
    /// Session no longer exists
    Missing,
}

/// Storage for in-progress game sessions
///
/// Implementations must make `delete` an atomic take (exactly one caller gets
/// the session back) and `compare_and_set_clicks` atomic per key.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session
    ///
    /// # Errors
    ///
    /// * `GameError::TooManySessions` - Store is at capacity
    async fn put(&self, session: GameSession) -> GameResult<()>;

    /// Read a snapshot of a session
    async fn get(&self, id: &GameId) -> Option<GameSession>;

    /// Remove a session and return it
    async fn delete(&self, id: &GameId) -> Option<GameSession>;

    /// Set the click counter to `new` only if it still equals `expected`
    async fn compare_and_set_clicks(&self, id: &GameId, expected: u32, new: u32) -> CasOutcome;

    /// Remove every session started before `cutoff`, returning how many were removed
    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> usize;

    /// Number of stored sessions
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Process-local session store
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<GameId, GameSession>>,
    capacity: usize,
}

impl InMemorySessionStore {
    /// Create a new in-memory store
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of sessions held at once
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity,
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, session: GameSession) -> GameResult<()> {
        let mut sessions = self.sessions.write().await;

        if sessions.len() >= self.capacity {
            return Err(GameError::TooManySessions);
        }

        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &GameId) -> Option<GameSession> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn delete(&self, id: &GameId) -> Option<GameSession> {
        self.sessions.write().await.remove(id)
    }

    async fn compare_and_set_clicks(&self, id: &GameId, expected: u32, new: u32) -> CasOutcome {
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(id) {
            None => CasOutcome::Missing,
            Some(session) if session.clicks != expected => CasOutcome::Conflict(session.clicks),
            Some(session) => {
                session.clicks = new;
                CasOutcome::Applied
            }
        }
    }

    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.started_at >= cutoff);
        before - sessions.len()
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
