//! Courier Daemon - application update negotiation server
//!
//! Resolves client version checks against the release catalog and serves
//! the matching artifacts by validated filename.

use anyhow::{Context, Result};
use courierd::artifacts::ArtifactStore;
use courierd::config::Config;
use courierd::server::{self, AppState};
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🚀  Courier update server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();

    // A catalog without a default entry must never accept traffic.
    let catalog = config
        .build_catalog()
        .context("release catalog configuration")?;
    info!(
        "📦  Release catalog ready - default cohort serves v{}",
        catalog.default_release().version
    );

    let mut artifacts = ArtifactStore::new(config.server.artifact_dir.clone());
    for (name, mime) in config.artifact_mimes() {
        artifacts.register_mime(name, mime);
    }
    artifacts
        .bootstrap()
        .context("artifact store bootstrap")?;
    info!("📁  Artifact directory: {}", artifacts.root().display());

    match artifacts.inventory() {
        Ok(files) if files.is_empty() => {
            warn!("⚠️  No artifacts found. Add artifact files before serving downloads.");
        }
        Ok(files) => {
            info!("📱  Found {} artifacts:", files.len());
            for (name, size) in files {
                info!("   - {} ({:.1} MB)", name, size as f64 / 1024.0 / 1024.0);
            }
        }
        Err(e) => warn!("⚠️  Could not read artifact directory: {}", e),
    }

    info!("🔍  Endpoints: GET /api/version, GET /api/download/:filename, GET /api/stats, GET /health");

    server::run(&config, AppState::new(catalog, artifacts)).await
}
