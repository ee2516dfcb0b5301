//! Game session guard configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Anti-cheat limits for game sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Length of one game (default: 30s)
    pub game_duration: Duration,

    /// Accepted deviation from `game_duration` when a game ends (default: 5s)
    pub duration_tolerance: Duration,

    /// Highest humanly plausible click rate (default: 20 per second)
    pub max_clicks_per_second: u32,

    /// Extra time an abandoned session is kept before eviction (default: 10s)
    pub session_grace: Duration,

    /// Maximum number of sessions held at once (default: 10,000)
    pub max_sessions: usize,

    /// Reject click/end calls from an IP other than the one that started the game
    pub bind_session_to_ip: bool,

    /// Maximum number of best-score watermarks kept (default: 100,000)
    ///
    /// Identities can be derived from client-supplied headers, so the table
    /// is bounded.
    pub max_score_identities: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            game_duration: Duration::from_secs(30),
            duration_tolerance: Duration::from_secs(5),
            max_clicks_per_second: 20,
            session_grace: Duration::from_secs(10),
            max_sessions: 10_000,
            bind_session_to_ip: false,
            max_score_identities: 100_000,
        }
    }
}

impl GuardConfig {
    pub fn game_duration_ms(&self) -> u64 {
        duration_ms(self.game_duration)
    }

    /// Shortest elapsed time a finished game may report
    pub fn min_game_ms(&self) -> u64 {
        duration_ms(self.game_duration.saturating_sub(self.duration_tolerance))
    }

    /// Longest elapsed time a finished game may report
    pub fn max_game_ms(&self) -> u64 {
        duration_ms(self.game_duration.saturating_add(self.duration_tolerance))
    }

    /// Age after which a session can no longer be finished and is garbage
    pub fn session_ttl(&self) -> Duration {
        self.game_duration
            .saturating_add(self.duration_tolerance)
            .saturating_add(self.session_grace)
    }

    /// Most clicks achievable in `elapsed_ms` at the rate cap
    ///
    /// Equivalent to dividing elapsed time by the minimum inter-click interval
    /// (50ms at 20 clicks/s), without losing precision for caps that do not
    /// divide 1000.
    pub fn max_clicks_for(&self, elapsed_ms: u64) -> u64 {
        elapsed_ms.saturating_mul(u64::from(self.max_clicks_per_second)) / 1000
    }

    /// Whether `clicks` in `elapsed_ms` averages above the rate cap
    pub fn exceeds_rate(&self, clicks: u64, elapsed_ms: u64) -> bool {
        clicks.saturating_mul(1000)
            > u64::from(self.max_clicks_per_second).saturating_mul(elapsed_ms)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
