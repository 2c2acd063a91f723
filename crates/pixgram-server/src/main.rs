mod cleanup;
mod config;

use std::sync::Arc;

use tracing::{error, info};

use pixgram_api::auth::{AppState, AppStateInner};
use pixgram_api::revocation::DbRevocationStore;
use pixgram_api::tokens::AuthSettings;
use pixgram_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixgram=debug,tower_http=debug".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {:#}", e);
            eprintln!("       Check the PIXGRAM_* settings in your .env file and restart.");
            std::process::exit(1);
        }
    };

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);
    let purged = db.purge_expired_revocations()?;
    if purged > 0 {
        info!("Purged {} expired token revocations", purged);
    }

    // Background cleanup task (runs every hour)
    tokio::spawn(cleanup::run_cleanup_loop(db.clone(), 3600));

    let state: AppState = Arc::new(AppStateInner {
        revocations: Arc::new(DbRevocationStore::new(db.clone())),
        db,
        auth: AuthSettings {
            jwt_secret: config.jwt_secret,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        },
    });

    let app = pixgram_api::router(state);

    info!("Pixgram server listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
