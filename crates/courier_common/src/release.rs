//! Release descriptors: the record describing the latest available build
//! for one client cohort.

use crate::version::VersionIdentifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Update-type label for a routine, non-mandatory release
pub const UPDATE_TYPE_RECOMMENDED: &str = "recommended";

/// Update-type label for a release clients must take
pub const UPDATE_TYPE_FORCED: &str = "forced";

/// The latest available build for one cohort.
///
/// Replaced wholesale when a new release is published; never mutated in
/// place. `artifact_name` is only required to exist in the artifact store
/// when a download is actually served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    pub version: VersionIdentifier,
    pub artifact_name: String,
    pub artifact_size_bytes: u64,
    #[serde(default)]
    pub release_notes: String,
    /// A publishing decision (e.g. a security fix); never derived from
    /// the size of the version jump.
    #[serde(default)]
    pub forced: bool,
    #[serde(default = "default_update_type")]
    pub update_type: String,
    pub released_at: DateTime<Utc>,
}

fn default_update_type() -> String {
    UPDATE_TYPE_RECOMMENDED.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{
            "version": "1.1.0",
            "artifact_name": "app_v1.1.0.apk",
            "artifact_size_bytes": 15728640,
            "released_at": "2024-01-15T10:00:00Z"
        }"#;
        let descriptor: ReleaseDescriptor = serde_json::from_str(json).unwrap();
        assert!(!descriptor.forced);
        assert_eq!(descriptor.update_type, UPDATE_TYPE_RECOMMENDED);
        assert_eq!(descriptor.release_notes, "");
        assert_eq!(descriptor.version.to_string(), "1.1.0");
    }

    #[test]
    fn test_malformed_version_rejected_in_descriptor() {
        let json = r#"{
            "version": "1.1",
            "artifact_name": "app.apk",
            "artifact_size_bytes": 1,
            "released_at": "2024-01-15T10:00:00Z"
        }"#;
        assert!(serde_json::from_str::<ReleaseDescriptor>(json).is_err());
    }
}
