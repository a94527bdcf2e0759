//! Server module for managing HTTP server lifecycle
//!
//! Chooses the storage backend, seeds identity data, builds the router and
//! serves until a shutdown signal arrives.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::Settings;
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::repositories::{MemoryStore, PgStore, Store};
use crate::services::seed::seed_identity;
use crate::state::AppState;

pub struct Server {
    settings: Settings,
    in_memory: bool,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            in_memory: false,
        }
    }

    /// Serve from a [`MemoryStore`] preloaded with the sample catalog
    /// instead of PostgreSQL.
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// Starts the server and runs until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// - Database pool or migration failures
    /// - Seeding failures
    /// - Address binding errors
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = &self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            "Application starting"
        );
        tracing::info!(
            host = %settings.server.host,
            port = settings.server.port,
            cors_origins = ?settings.server.cors_origins,
            "Server configuration loaded"
        );
        tracing::info!(
            access_token_minutes = settings.jwt.access_token_expiration_minutes,
            refresh_token_hours = settings.jwt.refresh_token_expiration_hours,
            issuer = %settings.jwt.issuer,
            "JWT configuration loaded"
        );

        let store = self.open_store().await?;
        seed_identity(store.as_ref(), &settings.seed).await?;
        tracing::info!(backend = store.backend(), "Identity data seeded");

        let state = AppState::new(store, settings.jwt.clone());
        let router = create_router(state, &settings.server);

        let address = settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;
        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    async fn open_store(&self) -> anyhow::Result<Arc<dyn Store>> {
        if self.in_memory {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            return Ok(Arc::new(MemoryStore::with_catalog_seed()?));
        }

        let database = &self.settings.database;
        tracing::info!(
            max_connections = database.max_connections,
            min_connections = database.min_connections,
            connection_timeout = database.connection_timeout,
            auto_migrate = database.auto_migrate,
            "Database configuration loaded"
        );

        if database.auto_migrate {
            let applied = run_pending_migrations(&database.url).await?;
            tracing::info!(count = applied.len(), versions = ?applied, "Migrations applied");
        }

        let pool = establish_async_connection_pool(database).await?;
        Ok(Arc::new(PgStore::new(pool)))
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM. A handler that cannot be
/// installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
