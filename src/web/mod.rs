//! Public HTTP surface: home, listing pages, search, contact and media.

mod handlers;
pub mod templates;
pub mod views;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Settings;
use crate::db::Database;
use crate::storage::{LocalStorage, MediaStorage};

pub const SEARCH_PATH: &str = "/propiedades/busqueda/";
pub const LIST_PATH: &str = "/propiedades/";

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub storage: Arc<dyn MediaStorage>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: Database, storage: Arc<dyn MediaStorage>, settings: Settings) -> Self {
        Self {
            db,
            storage,
            settings: Arc::new(settings),
        }
    }

    /// Open the configured database and media directory
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let db = Database::open(&settings.database.path)?;
        let storage: Arc<dyn MediaStorage> = Arc::new(LocalStorage::new(
            settings.media.root.clone(),
            settings.media.url.clone(),
        ));
        Ok(Self::new(db, storage, settings))
    }
}

/// Build the site router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route(LIST_PATH, get(handlers::list))
        .route(SEARCH_PATH, get(handlers::search))
        .route("/propiedades/{id}/", get(handlers::detail))
        .route("/contacto/", get(handlers::contact))
        .route("/media/{*path}", get(handlers::media))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Serve the site on the configured address until Ctrl+C or SIGTERM
pub async fn serve(state: AppState) -> Result<()> {
    let bind = state.settings.server.bind.clone();
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!(
        "🏠 Serving catalog on http://{} (media: {}, Ctrl+C to stop)",
        listener.local_addr()?,
        state.storage.backend_name()
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
