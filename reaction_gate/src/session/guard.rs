//! Game session guard: start, click and end validation.

use super::{
    clock::Clock,
    config::GuardConfig,
    errors::{GameError, GameResult},
    models::{ClickReceipt, GameId, GameOutcome, GameSession, PlayerIdentity},
    scores::ScoreBoard,
    store::{CasOutcome, SessionStore},
};
use crate::access::AccessGrant;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::sync::Arc;

/// Validates every step of a game server-side
pub struct GameSessionGuard {
    store: Arc<dyn SessionStore>,
    scores: ScoreBoard,
    clock: Arc<dyn Clock>,
    config: GuardConfig,
}

impl GameSessionGuard {
    /// Create a new session guard
    ///
    /// # Arguments
    ///
    /// * `store` - Session storage
    /// * `clock` - Time source for elapsed-time checks
    /// * `config` - Anti-cheat limits
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, config: GuardConfig) -> Self {
        Self {
            store,
            scores: ScoreBoard::new(config.max_score_identities),
            clock,
            config,
        }
    }

    /// Start a new game for a validated request
    ///
    /// # Arguments
    ///
    /// * `grant` - Proof of a successful access validation in this request
    ///
    /// # Returns
    ///
    /// * `GameResult<GameId>` - Identifier of the new session
    ///
    /// # Errors
    ///
    /// * `GameError::TooManySessions` - Session store is full
    pub async fn start(&self, grant: &AccessGrant) -> GameResult<GameId> {
        let id = GameId::generate();
        let session = GameSession::new(id.clone(), grant.ip(), self.clock.now());

        self.store.put(session).await?;

        debug!("Game {} started for {}", id, grant.ip());
        Ok(id)
    }

    /// Count one click
    ///
    /// The rate is checked before the counter moves: a click that would push
    /// the average above the cap is rejected and leaves the session untouched.
    /// The counter is updated with compare-and-set, so concurrent clicks on one
    /// session are serialized and each is counted once.
    ///
    /// # Arguments
    ///
    /// * `game_id` - Session identifier
    /// * `client_ip` - Resolved IP of the caller
    /// * `client_timestamp` - Client-reported click time, informational only
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidSession` - Unknown session, or IP mismatch when binding is on
    /// * `GameError::GameExpired` - Game window has closed
    /// * `GameError::RateExceeded` - Click would exceed the rate cap
    pub async fn click(
        &self,
        game_id: &GameId,
        client_ip: &str,
        client_timestamp: Option<i64>,
    ) -> GameResult<ClickReceipt> {
        loop {
            let session = self
                .store
                .get(game_id)
                .await
                .ok_or(GameError::InvalidSession)?;
            self.check_binding(&session, client_ip)?;

            let elapsed_ms = session.elapsed_ms(self.clock.now());
            if elapsed_ms > self.config.game_duration_ms() {
                return Err(GameError::GameExpired);
            }

            let candidate = session.clicks.saturating_add(1);
            if self.config.exceeds_rate(u64::from(candidate), elapsed_ms) {
                warn!(
                    "Click rate exceeded on game {}: {} clicks in {}ms from {}",
                    game_id, candidate, elapsed_ms, client_ip
                );
                return Err(GameError::RateExceeded);
            }

            match self
                .store
                .compare_and_set_clicks(game_id, session.clicks, candidate)
                .await
            {
                CasOutcome::Applied => {
                    debug!(
                        "Game {} click {} at {}ms (client ts {:?})",
                        game_id, candidate, elapsed_ms, client_timestamp
                    );
                    return Ok(ClickReceipt { clicks: candidate });
                }
                // Another click landed first, re-read and re-check
                CasOutcome::Conflict(_) => continue,
                CasOutcome::Missing => return Err(GameError::InvalidSession),
            }
        }
    }

    /// Finish a game and submit its score
    ///
    /// The session is consumed before any check runs, so every `end` call is
    /// final: a rejected submission cannot be retried on the same session.
    ///
    /// # Arguments
    ///
    /// * `game_id` - Session identifier
    /// * `claimed_score` - Score reported by the client
    /// * `identity` - Best-score bucket to update
    /// * `client_ip` - Resolved IP of the caller
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidSession` - Unknown or already finalized session
    /// * `GameError::InvalidDuration` - Elapsed time outside the accepted window
    /// * `GameError::ImpossibleScore` - Score above what the rate cap allows
    pub async fn end(
        &self,
        game_id: &GameId,
        claimed_score: u32,
        identity: &PlayerIdentity,
        client_ip: &str,
    ) -> GameResult<GameOutcome> {
        if self.config.bind_session_to_ip {
            let session = self
                .store
                .get(game_id)
                .await
                .ok_or(GameError::InvalidSession)?;
            self.check_binding(&session, client_ip)?;
        }

        let session = self
            .store
            .delete(game_id)
            .await
            .ok_or(GameError::InvalidSession)?;

        let elapsed_ms = session.elapsed_ms(self.clock.now());
        if elapsed_ms < self.config.min_game_ms() || elapsed_ms > self.config.max_game_ms() {
            info!("Game {} ended after {}ms, outside the accepted window", game_id, elapsed_ms);
            return Err(GameError::InvalidDuration);
        }

        let max_score = self.config.max_clicks_for(elapsed_ms);
        if u64::from(claimed_score) > max_score {
            warn!(
                "Impossible score on game {}: claimed {} but at most {} in {}ms from {}",
                game_id, claimed_score, max_score, elapsed_ms, client_ip
            );
            return Err(GameError::ImpossibleScore);
        }

        let (new_best, best_score) = self.scores.record(identity, claimed_score).await;

        info!(
            "Game {} finished: score {} ({} clicks counted), best {}",
            game_id, claimed_score, session.clicks, best_score
        );

        Ok(GameOutcome {
            success: true,
            new_best,
            best_score,
        })
    }

    /// Current best score for `identity`
    pub async fn best_score(&self, identity: &PlayerIdentity) -> u32 {
        self.scores.best(identity).await
    }

    /// Evict sessions too old to be finished
    ///
    /// # Returns
    ///
    /// * `usize` - Number of sessions removed
    pub async fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let cutoff = Duration::from_std(self.config.session_ttl())
            .ok()
            .and_then(|ttl| now.checked_sub_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.store.sweep_expired(cutoff).await
    }

    pub async fn active_sessions(&self) -> usize {
        self.store.len().await
    }

    fn check_binding(&self, session: &GameSession, client_ip: &str) -> GameResult<()> {
        if self.config.bind_session_to_ip && session.ip != client_ip {
            warn!(
                "Game {} used from {} but started from {}",
                session.id, client_ip, session.ip
            );
            return Err(GameError::InvalidSession);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{clock::ManualClock, store::InMemorySessionStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const CLIENT_IP: &str = "203.0.113.7";

    fn setup(config: GuardConfig) -> (GameSessionGuard, ManualClock) {
        let clock = ManualClock::starting_now();
        let store = Arc::new(InMemorySessionStore::new(config.max_sessions));
        let guard = GameSessionGuard::new(store, Arc::new(clock.clone()), config);
        (guard, clock)
    }

    fn grant() -> AccessGrant {
        AccessGrant::new(CLIENT_IP)
    }

    #[tokio::test]
    async fn test_start_creates_active_session() {
        let (guard, _clock) = setup(GuardConfig::default());
        guard.start(&grant()).await.unwrap();
        assert_eq!(guard.active_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_start_respects_capacity() {
        let config = GuardConfig {
            max_sessions: 1,
            ..GuardConfig::default()
        };
        let (guard, _clock) = setup(config);

        guard.start(&grant()).await.unwrap();
        assert_eq!(guard.start(&grant()).await, Err(GameError::TooManySessions));
    }

    #[tokio::test]
    async fn test_click_unknown_session() {
        let (guard, _clock) = setup(GuardConfig::default());
        let result = guard.click(&GameId::from("game_missing"), CLIENT_IP, None).await;
        assert_eq!(result, Err(GameError::InvalidSession));
    }

    #[tokio::test]
    async fn test_click_after_window_expires() {
        let (guard, clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();

        clock.advance_millis(30_001);
        assert_eq!(guard.click(&id, CLIENT_IP, None).await, Err(GameError::GameExpired));
    }

    #[tokio::test]
    async fn test_click_at_window_edge_is_accepted() {
        let (guard, clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();

        clock.advance_millis(30_000);
        assert_eq!(
            guard.click(&id, CLIENT_IP, None).await,
            Ok(ClickReceipt { clicks: 1 })
        );
    }

    #[tokio::test]
    async fn test_rejected_click_does_not_count() {
        let (guard, clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();

        // 20 clicks fit in the first second
        clock.advance_millis(1000);
        for expected in 1..=20 {
            let receipt = guard.click(&id, CLIENT_IP, None).await.unwrap();
            assert_eq!(receipt.clicks, expected);
        }

        // The 21st is over the cap and must not be recorded
        assert_eq!(guard.click(&id, CLIENT_IP, None).await, Err(GameError::RateExceeded));
        assert_eq!(guard.click(&id, CLIENT_IP, None).await, Err(GameError::RateExceeded));

        // Once time catches up, the next click is number 21
        clock.advance_millis(50);
        assert_eq!(
            guard.click(&id, CLIENT_IP, None).await,
            Ok(ClickReceipt { clicks: 21 })
        );
    }

    #[tokio::test]
    async fn test_click_at_start_instant_is_rejected() {
        let (guard, _clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();
        assert_eq!(guard.click(&id, CLIENT_IP, None).await, Err(GameError::RateExceeded));
    }

    #[tokio::test]
    async fn test_full_game_sets_best_score() {
        let (guard, clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();

        // 25 clicks spread evenly over 30 seconds
        for _ in 0..25 {
            clock.advance_millis(1200);
            guard.click(&id, CLIENT_IP, Some(0)).await.unwrap();
        }

        let outcome = guard
            .end(&id, 25, &PlayerIdentity::anonymous(), CLIENT_IP)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            GameOutcome {
                success: true,
                new_best: true,
                best_score: 25,
            }
        );
        assert_eq!(guard.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_end_too_early() {
        let (guard, clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();

        clock.advance_millis(5_000);
        let result = guard.end(&id, 10, &PlayerIdentity::anonymous(), CLIENT_IP).await;
        assert_eq!(result, Err(GameError::InvalidDuration));
    }

    #[tokio::test]
    async fn test_end_too_late() {
        let (guard, clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();

        clock.advance_millis(35_001);
        let result = guard.end(&id, 10, &PlayerIdentity::anonymous(), CLIENT_IP).await;
        assert_eq!(result, Err(GameError::InvalidDuration));
    }

    #[tokio::test]
    async fn test_end_window_bounds_are_inclusive() {
        let (guard, clock) = setup(GuardConfig::default());
        let player = PlayerIdentity::anonymous();

        let early = guard.start(&grant()).await.unwrap();
        clock.advance_millis(25_000);
        assert!(guard.end(&early, 0, &player, CLIENT_IP).await.is_ok());

        let late = guard.start(&grant()).await.unwrap();
        clock.advance_millis(35_000);
        assert!(guard.end(&late, 0, &player, CLIENT_IP).await.is_ok());
    }

    #[tokio::test]
    async fn test_impossible_score() {
        let (guard, clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();

        clock.advance_millis(30_000);
        let result = guard.end(&id, 1000, &PlayerIdentity::anonymous(), CLIENT_IP).await;
        assert_eq!(result, Err(GameError::ImpossibleScore));
    }

    #[tokio::test]
    async fn test_max_possible_score_is_accepted() {
        let (guard, clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();

        clock.advance_millis(30_000);
        let outcome = guard
            .end(&id, 600, &PlayerIdentity::anonymous(), CLIENT_IP)
            .await
            .unwrap();
        assert_eq!(outcome.best_score, 600);
    }

    #[tokio::test]
    async fn test_end_is_single_use() {
        let (guard, clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();
        let player = PlayerIdentity::anonymous();

        clock.advance_millis(30_000);
        guard.end(&id, 10, &player, CLIENT_IP).await.unwrap();
        assert_eq!(
            guard.end(&id, 10, &player, CLIENT_IP).await,
            Err(GameError::InvalidSession)
        );
        assert_eq!(guard.click(&id, CLIENT_IP, None).await, Err(GameError::InvalidSession));
    }

    #[tokio::test]
    async fn test_rejected_end_consumes_session() {
        let (guard, clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();
        let player = PlayerIdentity::anonymous();

        clock.advance_millis(5_000);
        assert_eq!(
            guard.end(&id, 1, &player, CLIENT_IP).await,
            Err(GameError::InvalidDuration)
        );

        clock.advance_millis(25_000);
        assert_eq!(
            guard.end(&id, 1, &player, CLIENT_IP).await,
            Err(GameError::InvalidSession)
        );
    }

    #[tokio::test]
    async fn test_lower_score_keeps_previous_best() {
        let (guard, clock) = setup(GuardConfig::default());
        let player = PlayerIdentity::anonymous();

        let first = guard.start(&grant()).await.unwrap();
        clock.advance_millis(30_000);
        guard.end(&first, 40, &player, CLIENT_IP).await.unwrap();

        let second = guard.start(&grant()).await.unwrap();
        clock.advance_millis(30_000);
        let outcome = guard.end(&second, 12, &player, CLIENT_IP).await.unwrap();
        assert!(!outcome.new_best);
        assert_eq!(outcome.best_score, 40);
        assert_eq!(guard.best_score(&player).await, 40);
    }

    #[tokio::test]
    async fn test_ip_binding_rejects_foreign_caller() {
        let config = GuardConfig {
            bind_session_to_ip: true,
            ..GuardConfig::default()
        };
        let (guard, clock) = setup(config);
        let id = guard.start(&grant()).await.unwrap();
        let player = PlayerIdentity::anonymous();

        clock.advance_millis(1_000);
        assert_eq!(
            guard.click(&id, "198.51.100.4", None).await,
            Err(GameError::InvalidSession)
        );
        assert!(guard.click(&id, CLIENT_IP, None).await.is_ok());

        clock.advance_millis(29_000);
        assert_eq!(
            guard.end(&id, 1, &player, "198.51.100.4").await,
            Err(GameError::InvalidSession)
        );
        // A hijack attempt must not destroy the owner's session
        assert!(guard.end(&id, 1, &player, CLIENT_IP).await.is_ok());
    }

    #[tokio::test]
    async fn test_ip_binding_off_by_default() {
        let (guard, clock) = setup(GuardConfig::default());
        let id = guard.start(&grant()).await.unwrap();

        clock.advance_millis(1_000);
        assert!(guard.click(&id, "198.51.100.4", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_evicts_abandoned_sessions() {
        let (guard, clock) = setup(GuardConfig::default());
        let abandoned = guard.start(&grant()).await.unwrap();

        clock.advance_millis(40_000);
        let _fresh = guard.start(&grant()).await.unwrap();
        assert_eq!(guard.sweep_expired().await, 0, "45s ttl not reached yet");

        clock.advance_millis(5_001);
        assert_eq!(guard.sweep_expired().await, 1);
        assert_eq!(
            guard.click(&abandoned, CLIENT_IP, None).await,
            Err(GameError::InvalidSession)
        );
        assert_eq!(guard.active_sessions().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_clicks_are_counted_once_each() {
        let (guard, clock) = setup(GuardConfig::default());
        let guard = Arc::new(guard);
        let id = guard.start(&grant()).await.unwrap();

        // Room for 200 clicks, send 50 concurrently
        clock.advance_millis(10_000);
        let mut handles = Vec::new();
        for _ in 0..50 {
            let guard = guard.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                guard.click(&id, CLIENT_IP, None).await
            }));
        }

        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap().unwrap().clicks);
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=50).collect::<Vec<u32>>());
    }

    /// Store that lets a competing click win the first compare-and-set
    struct RacingStore {
        inner: InMemorySessionStore,
        raced: AtomicBool,
        reads: AtomicUsize,
    }

    impl RacingStore {
        fn new() -> Self {
            Self {
                inner: InMemorySessionStore::new(16),
                raced: AtomicBool::new(false),
                reads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SessionStore for RacingStore {
        async fn put(&self, session: GameSession) -> GameResult<()> {
            self.inner.put(session).await
        }

        async fn get(&self, id: &GameId) -> Option<GameSession> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get(id).await
        }

        async fn delete(&self, id: &GameId) -> Option<GameSession> {
            self.inner.delete(id).await
        }

        async fn compare_and_set_clicks(&self, id: &GameId, expected: u32, new: u32) -> CasOutcome {
            if !self.raced.swap(true, Ordering::SeqCst) {
                // Another click lands between the caller's read and its write
                assert_eq!(
                    self.inner.compare_and_set_clicks(id, expected, new).await,
                    CasOutcome::Applied
                );
                return CasOutcome::Conflict(new);
            }
            self.inner.compare_and_set_clicks(id, expected, new).await
        }

        async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> usize {
            self.inner.sweep_expired(cutoff).await
        }

        async fn len(&self) -> usize {
            self.inner.len().await
        }
    }

    fn setup_racing() -> (GameSessionGuard, Arc<RacingStore>, ManualClock) {
        let clock = ManualClock::starting_now();
        let store = Arc::new(RacingStore::new());
        let guard = GameSessionGuard::new(
            store.clone(),
            Arc::new(clock.clone()),
            GuardConfig::default(),
        );
        (guard, store, clock)
    }

    #[tokio::test]
    async fn test_click_retries_after_lost_compare_and_set() {
        let (guard, store, clock) = setup_racing();
        let id = guard.start(&grant()).await.unwrap();
        clock.advance_millis(1_000);

        let receipt = guard.click(&id, CLIENT_IP, None).await.unwrap();

        // Counted on top of the competing click, exactly once
        assert_eq!(receipt.clicks, 2);
        assert_eq!(store.inner.get(&id).await.unwrap().clicks, 2);
        assert_eq!(store.reads.load(Ordering::SeqCst), 2, "session must be re-read");
    }

    #[tokio::test]
    async fn test_click_rechecks_rate_after_lost_compare_and_set() {
        let (guard, store, clock) = setup_racing();
        let id = guard.start(&grant()).await.unwrap();
        // 20 clicks/s leaves room for exactly one click at 50ms
        clock.advance_millis(50);

        let result = guard.click(&id, CLIENT_IP, None).await;

        assert_eq!(result.unwrap_err(), GameError::RateExceeded);
        assert_eq!(store.inner.get(&id).await.unwrap().clicks, 1);
    }
}
