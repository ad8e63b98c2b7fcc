//! HTTP server for courierd

use crate::artifacts::ArtifactStore;
use crate::config::Config;
use crate::routes;
use anyhow::Result;
use axum::Router;
use courier_common::ReleaseCatalog;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub catalog: ReleaseCatalog,
    pub artifacts: ArtifactStore,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(catalog: ReleaseCatalog, artifacts: ArtifactStore) -> Self {
        Self {
            catalog,
            artifacts,
            start_time: Instant::now(),
        }
    }
}

/// Build the full router. Shared by the daemon and the integration tests.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::version_routes())
        .merge(routes::download_routes())
        .merge(routes::stats_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until ctrl-c.
pub async fn run(config: &Config, state: AppState) -> Result<()> {
    let app = app(Arc::new(state));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down gracefully");
}
