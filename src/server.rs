//! HTTP server initialization and runtime setup.
//!
//! Selects the URL store, wires the services, and runs Axum until Ctrl-C.

use crate::config::Config;
use crate::domain::repositories::UrlStore;
use crate::infrastructure::persistence::{InMemoryUrlStore, PgUrlStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations, or the in-memory store
/// - Generation and lookup services
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown the shared [`CancellationToken`] is cancelled, so in-flight
/// generations stop retrying and return instead of holding the server open.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store: Arc<dyn UrlStore> = match config.database_url {
        Some(ref database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to migrate")?;

            Arc::new(PgUrlStore::new(Arc::new(pool)))
        }
        None => {
            tracing::warn!("No database configured, using in-memory store");
            Arc::new(InMemoryUrlStore::new())
        }
    };

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        store,
        config.generation_options()?,
        &config.base_url,
        shutdown.clone(),
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C and cancels `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
