//! Reaction game server.
//!
//! Serves the access check and the server-validated game endpoints. Sessions
//! live in memory and are swept by a background task.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use pico_args::Arguments;
use reaction_gate::access::{AccessValidator, HttpGeoLocator};
use reaction_gate::session::{GameSessionGuard, InMemorySessionStore, SystemClock};
use rg_server::api::{self, AppState, rate_limiter::StartLimiter};
use rg_server::config::ServerConfig;
use rg_server::{logging, metrics};
use tracing::{error, info};

const HELP: &str = "\
Run the reaction game server

USAGE:
  rg_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --metrics    IP:PORT     Prometheus exporter address [default: env METRICS_BIND or disabled]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  ALLOWED_COUNTRY          Permitted ISO country code (e.g., JO)
  GEO_ENDPOINT             Geolocation URL template containing {ip}
  MAX_CLICKS_PER_SECOND    Click rate cap
  BIND_SESSION_TO_IP       Reject clicks from another IP than the game start
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let metrics_bind: Option<SocketAddr> = pargs.opt_value_from_str("--metrics")?;

    logging::init();

    let config = ServerConfig::from_env(bind, metrics_bind)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus exporter listening on {}", addr);
    }

    info!(
        "Access restricted to {} (geo timeout {}ms)",
        config.access.allowed_country,
        config.access.geo_timeout.as_millis()
    );
    let locator = HttpGeoLocator::new(&config.access.geo_endpoint, config.access.geo_timeout)?;
    let validator = Arc::new(AccessValidator::new(
        Arc::new(locator),
        config.access.allowed_country.clone(),
    ));

    let store = Arc::new(InMemorySessionStore::new(config.game.max_sessions));
    let guard = Arc::new(GameSessionGuard::new(
        store,
        Arc::new(SystemClock),
        config.game.clone(),
    ));
    let start_limiter = Arc::new(StartLimiter::new(
        config.start_limit.max_requests,
        config.start_limit.window,
    ));

    info!(
        "Games last {}s, capped at {} clicks/s, best scores scoped by {}",
        config.game.game_duration.as_secs(),
        config.game.max_clicks_per_second,
        config.score_scope
    );

    let sweeper = spawn_sweeper(guard.clone(), start_limiter.clone(), config.sweep_interval);

    let app = api::create_router(AppState {
        validator,
        guard,
        start_limiter,
        score_scope: config.score_scope,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    sweeper.abort();

    Ok(())
}

/// Periodically evict abandoned sessions and idle start limiters
fn spawn_sweeper(
    guard: Arc<GameSessionGuard>,
    start_limiter: Arc<StartLimiter>,
    interval: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let swept = guard.sweep_expired().await;
            let pruned = start_limiter.prune_idle().await;
            let active = guard.active_sessions().await;

            metrics::sessions_swept_total(swept);
            metrics::game_sessions_active(active);

            if swept > 0 || pruned > 0 {
                info!(
                    "Swept {} abandoned session(s), pruned {} idle limiter(s), {} active",
                    swept, pruned, active
                );
            }
        }
    })
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C signal handler: {}", e);
        // Without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
}
