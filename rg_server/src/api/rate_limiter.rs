//! Rate limiting for game starts.
//!
//! Prevents session flooding by limiting how many games one client IP can
//! start within a sliding time window.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Rate limiter using a sliding window algorithm
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of recent requests
    timestamps: VecDeque<Instant>,
    /// Maximum number of requests allowed in the window
    max_requests: usize,
    /// Time window for rate limiting
    window: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    ///
    /// * `max_requests` - Maximum number of requests allowed in the time window
    /// * `window` - Time window duration
    ///
    /// # Example
    ///
    /// ```
    /// use rg_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// // Allow 10 game starts per minute
    /// let limiter = RateLimiter::new(10, Duration::from_secs(60));
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// Check if a request should be allowed
    ///
    /// Returns `true` if the request is allowed, `false` if rate limit exceeded.
    ///
    /// # Example
    ///
    /// ```
    /// # use rg_server::api::rate_limiter::RateLimiter;
    /// # use std::time::Duration;
    /// let mut limiter = RateLimiter::new(5, Duration::from_secs(1));
    ///
    /// for _ in 0..5 {
    ///     assert!(limiter.check());
    /// }
    ///
    /// assert!(!limiter.check());
    /// ```
    pub fn check(&mut self) -> bool {
        let now = Instant::now();
        self.evict_expired(now);

        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        self.timestamps.push_back(now);
        true
    }

    /// Get the time until the oldest request leaves the window
    ///
    /// Returns `None` if there are no requests in the current window.
    pub fn reset_in(&self) -> Option<Duration> {
        self.timestamps.front().map(|oldest| {
            let elapsed = Instant::now().duration_since(*oldest);
            self.window.saturating_sub(elapsed)
        })
    }

    /// Whether every recorded request has left the window
    pub fn is_idle(&mut self) -> bool {
        self.evict_expired(Instant::now());
        self.timestamps.is_empty()
    }

    fn evict_expired(&mut self, now: Instant) {
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}

/// One sliding-window limiter per client IP
#[derive(Debug)]
pub struct StartLimiter {
    limiters: Mutex<HashMap<String, RateLimiter>>,
    max_requests: usize,
    window: Duration,
}

impl StartLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            limiters: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Record a start attempt for `key`
    ///
    /// # Errors
    ///
    /// Returns the time until another start is allowed when the limit is hit.
    pub async fn check(&self, key: &str) -> Result<(), Duration> {
        let mut limiters = self.limiters.lock().await;
        let limiter = limiters
            .entry(key.to_string())
            .or_insert_with(|| RateLimiter::new(self.max_requests, self.window));

        if limiter.check() {
            Ok(())
        } else {
            Err(limiter.reset_in().unwrap_or(self.window))
        }
    }

    /// Drop limiters with no requests left in their window
    ///
    /// # Returns
    ///
    /// * `usize` - Number of entries removed
    pub async fn prune_idle(&self) -> usize {
        let mut limiters = self.limiters.lock().await;
        let before = limiters.len();
        limiters.retain(|_, limiter| !limiter.is_idle());
        before - limiters.len()
    }

    /// Number of client IPs currently tracked
    pub async fn tracked(&self) -> usize {
        self.limiters.lock().await.len()
    }
}
