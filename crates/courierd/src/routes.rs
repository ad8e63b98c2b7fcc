//! API routes for courierd
//!
//! Version negotiation, artifact download, server stats and health.

use crate::artifacts::sanitize_filename;
use crate::error::ApiError;
use crate::server::AppState;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use courier_common::{
    decide, HealthResponse, StatsResponse, VersionCheckResponse, VersionIdentifier,
};
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;

/// Version assumed for clients that omit the Current-Version header
pub const FALLBACK_CLIENT_VERSION: &str = "1.0.0";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

// ============================================================================
// Version Negotiation Routes
// ============================================================================

pub fn version_routes() -> Router<AppStateArc> {
    Router::new().route("/api/version", get(check_version))
}

async fn check_version(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> Result<Json<VersionCheckResponse>, ApiError> {
    let start = Instant::now();

    let reported = header_str(&headers, "Current-Version").unwrap_or(FALLBACK_CLIENT_VERSION);
    let build = header_str(&headers, "Current-Build").unwrap_or("1");
    let platform = header_str(&headers, "Platform").unwrap_or("android");

    // Parse failures stop here, before any decision logic runs.
    let client_version: VersionIdentifier = reported.parse().map_err(|e| {
        warn!(
            "Rejecting malformed Current-Version {:?} (platform: {})",
            reported, platform
        );
        ApiError::from(e)
    })?;

    // The raw reported string is the cohort key, not the parsed form.
    let release = state.catalog.lookup(reported);
    let decision = decide(&client_version, &release);

    let response = match &decision.target {
        Some(target) => VersionCheckResponse::with_update(client_version, target),
        None => VersionCheckResponse::no_update(client_version, release.version),
    };

    info!(
        "Version check - cohort: {}, build: {}, platform: {}, latest: {}, has_update: {}, forced: {}, latency_ms: {}",
        reported,
        build,
        platform,
        response.latest_version,
        response.has_update,
        decision.forced,
        start.elapsed().as_millis()
    );

    Ok(Json(response))
}

// ============================================================================
// Artifact Download Routes
// ============================================================================

pub fn download_routes() -> Router<AppStateArc> {
    Router::new().route("/api/download/:filename", get(download_artifact))
}

async fn download_artifact(
    State(state): State<AppStateArc>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let name = sanitize_filename(&filename).ok_or_else(|| {
        warn!("Rejecting invalid artifact name: {:?}", filename);
        ApiError::InvalidFilename(filename.clone())
    })?;

    let path = state.artifacts.path_for(&name);
    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            warn!("Artifact not found: {}", path.display());
            ApiError::ArtifactNotFound(name.clone())
        } else {
            error!("Failed to open artifact {}: {}", path.display(), e);
            ApiError::Io(e)
        }
    })?;

    let metadata = file.metadata().await.map_err(|e| {
        error!("Failed to stat artifact {}: {}", path.display(), e);
        ApiError::Io(e)
    })?;

    info!("Serving artifact: {} ({} bytes)", name, metadata.len());

    // Dropping the streamed body on client disconnect closes the file.
    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [
        (CONTENT_TYPE, state.artifacts.mime_for(&name).to_string()),
        (CONTENT_LENGTH, metadata.len().to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name),
        ),
    ];

    Ok((headers, body).into_response())
}

// ============================================================================
// Stats Routes
// ============================================================================

pub fn stats_routes() -> Router<AppStateArc> {
    Router::new().route("/api/stats", get(server_stats))
}

async fn server_stats(State(state): State<AppStateArc>) -> Result<Json<StatsResponse>, ApiError> {
    let inventory = state.artifacts.inventory().map_err(|e| {
        error!("Failed to read artifact store: {}", e);
        ApiError::Io(e)
    })?;
    let catalog = state.catalog.stats();

    Ok(Json(StatsResponse {
        server_time: Utc::now(),
        available_artifacts: inventory.len(),
        artifact_files: inventory.into_iter().map(|(name, _)| name).collect(),
        latest_version: catalog.default_version,
        registered_cohorts: catalog.cohorts,
    }))
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
