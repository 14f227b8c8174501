//! Web server for floodwatch-auth.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::db::Backend;
use crate::store::{MemorySessionStore, SessionStore};
use crate::Result;

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// How often expired sessions are swept from the in-memory store.
const PURGE_INTERVAL_SECS: u64 = 600;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Store swept periodically for expired sessions.
    purge_store: Option<Arc<MemorySessionStore>>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(
        config: &Config,
        backend: Arc<dyn Backend>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let addr = config.server.addr()?;
        let app_state = AppState::new(config, backend, store);

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            purge_store: None,
        })
    }

    /// Sweep expired sessions out of `store` while the server runs.
    pub fn with_purge_task(mut self, store: Arc<MemorySessionStore>) -> Self {
        self.purge_store = Some(store);
        self
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the session purge background task.
    fn start_purge_task(store: Arc<MemorySessionStore>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(PURGE_INTERVAL_SECS));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                let count = store.purge_expired().await;
                if count > 0 {
                    tracing::info!(purged_count = count, "Purged expired sessions");
                } else {
                    tracing::debug!("No expired sessions to purge");
                }
            }
        });
    }

    /// Bind the listener and build the application.
    async fn prepare(self) -> std::io::Result<(TcpListener, Router)> {
        let router = create_router(self.app_state).merge(create_health_router());

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        if let Some(store) = self.purge_store {
            Self::start_purge_task(store);
            tracing::info!(
                interval_secs = PURGE_INTERVAL_SECS,
                "Session purge task started"
            );
        }

        tracing::info!("Web server listening on http://{}", local_addr);
        Ok((listener, router))
    }

    /// Run the web server until Ctrl-C.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.prepare().await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.prepare().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down web server");
}
