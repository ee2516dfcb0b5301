//! Game session error types.

use thiserror::Error;

/// Game session errors
///
/// Every variant is safe to show to the client and ends only the current
/// operation. None of them is retried; a rejected session is not revived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// Unknown, finalized, evicted or foreign session identifier
    #[error("Invalid game session")]
    InvalidSession,

    /// Click arrived after the game window closed
    #[error("Game expired")]
    GameExpired,

    /// Click would push the average rate above the cap
    #[error("Click rate too high")]
    RateExceeded,

    /// Game ended too early or too late
    #[error("Invalid game duration")]
    InvalidDuration,

    /// Claimed score exceeds what the rate cap allows in the elapsed time
    #[error("Impossible score detected")]
    ImpossibleScore,

    /// Session store is full
    #[error("Too many active games, please try again later")]
    TooManySessions,
}

impl GameError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        self.to_string()
    }

    /// Whether the error points at tampering rather than an honest mistake
    pub fn is_suspicious(&self) -> bool {
        matches!(self, GameError::RateExceeded | GameError::ImpossibleScore)
    }
}

/// Result type for game session operations
pub type GameResult<T> = Result<T, GameError>;
