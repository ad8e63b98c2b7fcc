//! Update decision engine.
//!
//! A pure function of the client's reported version and the cohort's
//! current release. Inputs are pre-validated: parse failures are handled
//! at the request boundary and never reach this module.

use crate::release::ReleaseDescriptor;
use crate::version::VersionIdentifier;
use std::sync::Arc;

/// Outcome of negotiating one client's version against a release.
///
/// Derived fresh on every request; never cached per client.
#[derive(Debug, Clone)]
pub struct UpdateDecision {
    pub has_update: bool,
    /// Only meaningful when `has_update` is set.
    pub forced: bool,
    /// The release to offer, present only when `has_update` is set.
    pub target: Option<Arc<ReleaseDescriptor>>,
}

/// Decide whether `release` is an update for a client at `client_version`.
pub fn decide(
    client_version: &VersionIdentifier,
    release: &Arc<ReleaseDescriptor>,
) -> UpdateDecision {
    let has_update = release.version > *client_version;
    UpdateDecision {
        has_update,
        forced: has_update && release.forced,
        target: has_update.then(|| Arc::clone(release)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn release(version: &str, forced: bool) -> Arc<ReleaseDescriptor> {
        Arc::new(ReleaseDescriptor {
            version: version.parse().unwrap(),
            artifact_name: format!("app_v{}.apk", version),
            artifact_size_bytes: 15_728_640,
            release_notes: "notes".to_string(),
            forced,
            update_type: crate::release::UPDATE_TYPE_RECOMMENDED.to_string(),
            released_at: Utc::now(),
        })
    }

    #[test]
    fn test_newer_release_offers_update() {
        let decision = decide(&"1.0.3+4".parse().unwrap(), &release("1.0.4+5", false));
        assert!(decision.has_update);
        assert!(!decision.forced);
        assert_eq!(
            decision.target.unwrap().version,
            "1.0.4+5".parse().unwrap()
        );
    }

    #[test]
    fn test_equal_version_no_update() {
        let decision = decide(&"1.0.4+5".parse().unwrap(), &release("1.0.4+5", false));
        assert!(!decision.has_update);
        assert!(!decision.forced);
        assert!(decision.target.is_none());
    }

    #[test]
    fn test_older_release_no_update() {
        let decision = decide(&"1.0.5".parse().unwrap(), &release("1.0.4+5", true));
        assert!(!decision.has_update);
        // Forced only applies when there is an update to take.
        assert!(!decision.forced);
    }

    #[test]
    fn test_forced_release_forces_update() {
        let decision = decide(&"1.0.3".parse().unwrap(), &release("1.0.4", true));
        assert!(decision.has_update);
        assert!(decision.forced);
    }

    #[test]
    fn test_build_suffix_alone_is_an_update() {
        let decision = decide(&"1.0.4".parse().unwrap(), &release("1.0.4+1", false));
        assert!(decision.has_update);
    }
}
