//! Server mode
//!
//! Prepares storage and site settings, then runs the HTTP server until a
//! shutdown signal arrives.

use std::time::Duration;

use actix_web::HttpServer;
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{AppState, build_app};
use crate::config::get_config;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {}", e))?;

    let config = get_config();
    let state = AppState::new(startup.storage.clone(), startup.settings.clone(), &config);

    if state.login_rate_limit {
        if config.server.trusted_proxies.is_empty() {
            info!("Login rate limiting enabled (keyed by peer IP)");
        } else {
            warn!(
                "Login rate limiting: trusted proxies configured: {:?}",
                config.server.trusted_proxies
            );
        }
    } else {
        warn!("Login rate limiting is disabled");
    }

    let workers = config.server.workers.clamp(1, 32);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let db_for_shutdown = startup.storage.get_db().clone();

    let server = HttpServer::new(move || build_app(state.clone()))
        .keep_alive(Duration::from_secs(30))
        .client_request_timeout(Duration::from_millis(5000))
        .client_disconnect_timeout(Duration::from_millis(1000))
        .workers(workers)
        .disable_signals()
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    info!("Starting server at http://{} ({} workers)", bind_address, workers);

    let handle = server.handle();
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            info!("Stopping HTTP server...");
            handle.stop(true).await;
        }
    }

    lifetime::shutdown::close_database(db_for_shutdown).await;
    warn!("Graceful shutdown complete");
    Ok(())
}
