//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use reaction_gate::access::{DEFAULT_ALLOWED_COUNTRY, DEFAULT_GEO_ENDPOINT};
use reaction_gate::session::GuardConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// Default server bind address
pub const DEFAULT_BIND: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 6969);

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter bind address, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Access validation configuration
    pub access: AccessConfig,
    /// Anti-cheat limits for game sessions
    pub game: GuardConfig,
    /// Per-IP limit on game starts
    pub start_limit: StartLimitConfig,
    /// How often abandoned sessions are swept
    pub sweep_interval: Duration,
    /// Which best-score bucket a caller's games count towards
    pub score_scope: ScoreScope,
}

/// Access validation configuration
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// ISO 3166-1 alpha-2 code of the permitted country
    pub allowed_country: String,
    /// Geolocation URL template containing `{ip}`
    pub geo_endpoint: String,
    /// Upper bound for one geolocation lookup
    pub geo_timeout: Duration,
}

/// Sliding-window limit on game starts per client IP
#[derive(Debug, Clone, Copy)]
pub struct StartLimitConfig {
    /// Maximum starts allowed in the window
    pub max_requests: usize,
    /// Window length
    pub window: Duration,
}

/// Best-score bucket selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreScope {
    /// Every caller shares one watermark
    Anonymous,
    /// One watermark per client IP
    ClientIp,
}

impl std::fmt::Display for ScoreScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreScope::Anonymous => write!(f, "anonymous"),
            ScoreScope::ClientIp => write!(f, "ip"),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_override` - Optional metrics address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but malformed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), bind_override, metrics_override)
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(
        lookup: F,
        bind_override: Option<SocketAddr>,
        metrics_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match bind_override {
            Some(addr) => addr,
            None => parse_addr(&lookup, "SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let metrics_bind = match metrics_override {
            Some(addr) => Some(addr),
            None => parse_addr(&lookup, "METRICS_BIND")?,
        };

        let access = AccessConfig {
            allowed_country: lookup("ALLOWED_COUNTRY")
                .map(|v| v.trim().to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_ALLOWED_COUNTRY.to_string()),
            geo_endpoint: lookup("GEO_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_GEO_ENDPOINT.to_string()),
            geo_timeout: Duration::from_millis(parse_var_or(&lookup, "GEO_TIMEOUT_MS", 2000)),
        };

        let defaults = GuardConfig::default();
        let game = GuardConfig {
            game_duration: Duration::from_secs(parse_var_or(
                &lookup,
                "GAME_DURATION_SECS",
                defaults.game_duration.as_secs(),
            )),
            duration_tolerance: Duration::from_secs(parse_var_or(
                &lookup,
                "GAME_DURATION_TOLERANCE_SECS",
                defaults.duration_tolerance.as_secs(),
            )),
            max_clicks_per_second: parse_var_or(
                &lookup,
                "MAX_CLICKS_PER_SECOND",
                defaults.max_clicks_per_second,
            ),
            session_grace: Duration::from_secs(parse_var_or(
                &lookup,
                "SESSION_GRACE_SECS",
                defaults.session_grace.as_secs(),
            )),
            max_sessions: parse_var_or(&lookup, "MAX_ACTIVE_SESSIONS", defaults.max_sessions),
            bind_session_to_ip: parse_var_or(
                &lookup,
                "BIND_SESSION_TO_IP",
                defaults.bind_session_to_ip,
            ),
            max_score_identities: parse_var_or(
                &lookup,
                "MAX_SCORE_IDENTITIES",
                defaults.max_score_identities,
            ),
        };

        let start_limit = StartLimitConfig {
            max_requests: parse_var_or(&lookup, "START_LIMIT_MAX", 10),
            window: Duration::from_secs(parse_var_or(&lookup, "START_LIMIT_WINDOW_SECS", 60)),
        };

        let score_scope = match lookup("BEST_SCORE_SCOPE") {
            None => ScoreScope::Anonymous,
            Some(v) => match v.trim().to_lowercase().as_str() {
                "anonymous" => ScoreScope::Anonymous,
                "ip" => ScoreScope::ClientIp,
                other => {
                    return Err(ConfigError::Invalid {
                        var: "BEST_SCORE_SCOPE".to_string(),
                        reason: format!("Expected 'anonymous' or 'ip', got '{other}'"),
                    });
                }
            },
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            access,
            game,
            start_limit,
            sweep_interval: Duration::from_secs(parse_var_or(&lookup, "SWEEP_INTERVAL_SECS", 15)),
            score_scope,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let country = &self.access.allowed_country;
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid {
                var: "ALLOWED_COUNTRY".to_string(),
                reason: "Must be a two-letter ISO 3166-1 country code".to_string(),
            });
        }

        if !self.access.geo_endpoint.contains("{ip}") {
            return Err(ConfigError::Invalid {
                var: "GEO_ENDPOINT".to_string(),
                reason: "Must contain the {ip} placeholder".to_string(),
            });
        }

        if self.access.geo_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "GEO_TIMEOUT_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.game.game_duration <= self.game.duration_tolerance {
            return Err(ConfigError::Invalid {
                var: "GAME_DURATION_SECS".to_string(),
                reason: format!(
                    "Must be greater than the tolerance ({}s)",
                    self.game.duration_tolerance.as_secs()
                ),
            });
        }

        if !(1..=1000).contains(&self.game.max_clicks_per_second) {
            return Err(ConfigError::Invalid {
                var: "MAX_CLICKS_PER_SECOND".to_string(),
                reason: "Must be between 1 and 1000".to_string(),
            });
        }

        if self.game.max_sessions == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_ACTIVE_SESSIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.game.max_score_identities == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_SCORE_IDENTITIES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.start_limit.max_requests == 0 || self.start_limit.window.is_zero() {
            return Err(ConfigError::Invalid {
                var: "START_LIMIT_MAX".to_string(),
                reason: "Start limit and window must be greater than 0".to_string(),
            });
        }

        if self.sweep_interval.is_zero() {
            return Err(ConfigError::Invalid {
                var: "SWEEP_INTERVAL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse a variable with default fallback
fn parse_var_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Socket addresses are rejected loudly rather than silently defaulted
fn parse_addr<F>(lookup: &F, key: &str) -> Result<Option<SocketAddr>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("'{v}' is not a socket address"),
            })
        })
        .transpose()
}
