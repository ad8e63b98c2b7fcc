//! JSON schemas for the courier HTTP API.

use crate::release::ReleaseDescriptor;
use crate::version::VersionIdentifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version check response. Download fields are present only when an
/// update is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionCheckResponse {
    pub current_version: VersionIdentifier,
    pub latest_version: VersionIdentifier,
    pub has_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_forced: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
}

impl VersionCheckResponse {
    /// Response for a client that is already up to date.
    pub fn no_update(current: VersionIdentifier, latest: VersionIdentifier) -> Self {
        Self {
            current_version: current,
            latest_version: latest,
            has_update: false,
            download_url: None,
            download_size: None,
            release_notes: None,
            is_forced: None,
            update_type: None,
            release_date: None,
        }
    }

    /// Response offering `target` to the client.
    pub fn with_update(current: VersionIdentifier, target: &ReleaseDescriptor) -> Self {
        Self {
            current_version: current,
            latest_version: target.version,
            has_update: true,
            download_url: Some(target.artifact_name.clone()),
            download_size: Some(target.artifact_size_bytes),
            release_notes: Some(target.release_notes.clone()),
            is_forced: Some(target.forced),
            update_type: Some(target.update_type.clone()),
            release_date: Some(target.released_at),
        }
    }
}

/// Server statistics response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub server_time: DateTime<Utc>,
    pub available_artifacts: usize,
    pub artifact_files: Vec<String>,
    pub latest_version: VersionIdentifier,
    pub registered_cohorts: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Error body shared by every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::UPDATE_TYPE_RECOMMENDED;

    #[test]
    fn test_no_update_omits_download_fields() {
        let response = VersionCheckResponse::no_update(
            "1.1.0".parse().unwrap(),
            "1.1.0".parse().unwrap(),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["has_update"], false);
        assert!(json.get("download_url").is_none());
        assert!(json.get("is_forced").is_none());
        assert!(json.get("release_date").is_none());
    }

    #[test]
    fn test_with_update_carries_release_fields() {
        let target = ReleaseDescriptor {
            version: "1.1.0".parse().unwrap(),
            artifact_name: "app_v1.1.0.apk".to_string(),
            artifact_size_bytes: 15_728_640,
            release_notes: "Bug fixes".to_string(),
            forced: false,
            update_type: UPDATE_TYPE_RECOMMENDED.to_string(),
            released_at: Utc::now(),
        };
        let response = VersionCheckResponse::with_update("1.0.3+4".parse().unwrap(), &target);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["has_update"], true);
        assert_eq!(json["current_version"], "1.0.3+4");
        assert_eq!(json["latest_version"], "1.1.0");
        assert_eq!(json["download_url"], "app_v1.1.0.apk");
        assert_eq!(json["download_size"], 15_728_640u64);
        assert_eq!(json["is_forced"], false);
        assert_eq!(json["update_type"], "recommended");
    }
}
