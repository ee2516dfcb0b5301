//! Best-score watermarks.

use super::models::PlayerIdentity;
use log::debug;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Best score per player identity
///
/// Holds at most `capacity` identities. When full, a new identity displaces
/// the lowest watermark if it beats it, otherwise its score is reported but
/// not kept.
#[derive(Debug)]
pub struct ScoreBoard {
    best: RwLock<HashMap<PlayerIdentity, u32>>,
    capacity: usize,
}

impl ScoreBoard {
    pub fn new(capacity: usize) -> Self {
        Self {
            best: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Current best for `identity`, zero if none recorded
    pub async fn best(&self, identity: &PlayerIdentity) -> u32 {
        self.best.read().await.get(identity).copied().unwrap_or(0)
    }

    /// Record a finished game's score
    ///
    /// # Returns
    ///
    /// * `(bool, u32)` - Whether the score is a new best, and the resulting best
    pub async fn record(&self, identity: &PlayerIdentity, score: u32) -> (bool, u32) {
        let mut best = self.best.write().await;

        if let Some(current) = best.get_mut(identity) {
            if score > *current {
                *current = score;
                return (true, score);
            }
            return (false, *current);
        }

        if score == 0 {
            return (false, 0);
        }

        if best.len() >= self.capacity {
            let lowest = best
                .iter()
                .min_by_key(|(_, watermark)| **watermark)
                .map(|(id, watermark)| (id.clone(), *watermark));

            match lowest {
                Some((evicted, watermark)) if watermark < score => {
                    debug!("Score table full, evicting {} ({})", evicted.as_str(), watermark);
                    best.remove(&evicted);
                }
                _ => return (true, score),
            }
        }

        best.insert(identity.clone(), score);
        (true, score)
    }
}
