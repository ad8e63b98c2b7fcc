//! Release catalog: cohort key -> current release descriptor.
//!
//! Read-mostly. Lookups clone an `Arc` of the committed table snapshot and
//! never hold the lock across request work; publishing swaps in a freshly
//! built snapshot, so concurrent readers observe either the old or the new
//! table in full.

use crate::release::ReleaseDescriptor;
use crate::version::VersionIdentifier;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Cohort key every lookup falls back to.
pub const DEFAULT_COHORT: &str = "default";

/// Catalog configuration errors. Startup-time only: a running catalog
/// cannot lose its default entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("release catalog has no 'default' entry")]
    MissingDefault,
}

/// Summary of the catalog for the stats endpoint.
#[derive(Debug, Clone)]
pub struct CatalogStats {
    pub entries: usize,
    pub cohorts: Vec<String>,
    pub default_version: VersionIdentifier,
}

#[derive(Clone)]
struct Snapshot {
    /// Kept alongside the table so lookup has a fallback without a panic
    /// path; the same descriptor is also in `table` under `DEFAULT_COHORT`.
    default: Arc<ReleaseDescriptor>,
    table: HashMap<String, Arc<ReleaseDescriptor>>,
}

/// Process-wide mapping from cohort key to its current release.
pub struct ReleaseCatalog {
    snapshot: RwLock<Arc<Snapshot>>,
}

impl ReleaseCatalog {
    /// Build a catalog from initial entries. The `default` entry must be
    /// present; its absence is a configuration error that should stop the
    /// service before it accepts traffic.
    pub fn new(entries: HashMap<String, ReleaseDescriptor>) -> Result<Self, CatalogError> {
        let table: HashMap<String, Arc<ReleaseDescriptor>> = entries
            .into_iter()
            .map(|(cohort, descriptor)| (cohort, Arc::new(descriptor)))
            .collect();
        let default = table
            .get(DEFAULT_COHORT)
            .cloned()
            .ok_or(CatalogError::MissingDefault)?;

        Ok(Self {
            snapshot: RwLock::new(Arc::new(Snapshot { default, table })),
        })
    }

    /// Convenience constructor for a catalog with only a default release.
    pub fn with_default(descriptor: ReleaseDescriptor) -> Self {
        let default = Arc::new(descriptor);
        let table = HashMap::from([(DEFAULT_COHORT.to_string(), Arc::clone(&default))]);
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot { default, table })),
        }
    }

    fn load(&self) -> Arc<Snapshot> {
        // A poisoned lock still guards a fully committed snapshot.
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Current release for `cohort`, falling back to the default entry.
    /// Never fails: an unknown cohort is served the default release.
    pub fn lookup(&self, cohort: &str) -> Arc<ReleaseDescriptor> {
        let snapshot = self.load();
        snapshot
            .table
            .get(cohort)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&snapshot.default))
    }

    /// The default cohort's current release.
    pub fn default_release(&self) -> Arc<ReleaseDescriptor> {
        Arc::clone(&self.load().default)
    }

    /// Publish a release for `cohort`, replacing any existing entry.
    /// Last write wins; there are no merge semantics.
    pub fn register(&self, cohort: impl Into<String>, descriptor: ReleaseDescriptor) {
        let cohort = cohort.into();
        let descriptor = Arc::new(descriptor);

        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Snapshot::clone(&guard);
        if cohort == DEFAULT_COHORT {
            next.default = Arc::clone(&descriptor);
        }
        debug!(
            "Catalog register - cohort: {}, version: {}",
            cohort, descriptor.version
        );
        next.table.insert(cohort, descriptor);
        *guard = Arc::new(next);
    }

    pub fn stats(&self) -> CatalogStats {
        let snapshot = self.load();
        let mut cohorts: Vec<String> = snapshot.table.keys().cloned().collect();
        cohorts.sort();
        CatalogStats {
            entries: snapshot.table.len(),
            cohorts,
            default_version: snapshot.default.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::UPDATE_TYPE_RECOMMENDED;
    use chrono::Utc;

    fn descriptor(version: &str) -> ReleaseDescriptor {
        ReleaseDescriptor {
            version: version.parse().unwrap(),
            artifact_name: format!("app_v{}.apk", version),
            artifact_size_bytes: 1024,
            release_notes: String::new(),
            forced: false,
            update_type: UPDATE_TYPE_RECOMMENDED.to_string(),
            released_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_default_is_an_error() {
        let entries = HashMap::from([("1.0.0".to_string(), descriptor("1.1.0"))]);
        assert_eq!(
            ReleaseCatalog::new(entries).err(),
            Some(CatalogError::MissingDefault)
        );
    }

    #[test]
    fn test_unknown_cohort_falls_back_to_default() {
        let catalog = ReleaseCatalog::with_default(descriptor("1.1.0"));
        let unknown = catalog.lookup("unknown-cohort");
        let default = catalog.lookup(DEFAULT_COHORT);
        assert_eq!(unknown.version, default.version);
        assert_eq!(unknown.artifact_name, default.artifact_name);
    }

    #[test]
    fn test_explicit_cohort_wins_over_default() {
        let entries = HashMap::from([
            (DEFAULT_COHORT.to_string(), descriptor("1.1.0")),
            ("1.0.0".to_string(), descriptor("1.2.0")),
        ]);
        let catalog = ReleaseCatalog::new(entries).unwrap();
        assert_eq!(catalog.lookup("1.0.0").version, "1.2.0".parse().unwrap());
        assert_eq!(catalog.lookup("0.9.0").version, "1.1.0".parse().unwrap());
    }

    #[test]
    fn test_register_replaces_wholesale() {
        let catalog = ReleaseCatalog::with_default(descriptor("1.1.0"));
        catalog.register("1.0.0", descriptor("1.2.0"));
        catalog.register("1.0.0", descriptor("1.3.0"));
        assert_eq!(catalog.lookup("1.0.0").version, "1.3.0".parse().unwrap());
    }

    #[test]
    fn test_register_default_updates_fallback() {
        let catalog = ReleaseCatalog::with_default(descriptor("1.1.0"));
        catalog.register(DEFAULT_COHORT, descriptor("2.0.0"));
        assert_eq!(
            catalog.lookup("never-registered").version,
            "2.0.0".parse().unwrap()
        );
        assert_eq!(catalog.default_release().version, "2.0.0".parse().unwrap());
    }

    #[test]
    fn test_stats_reports_sorted_cohorts() {
        let catalog = ReleaseCatalog::with_default(descriptor("1.1.0"));
        catalog.register("1.0.5", descriptor("1.1.0"));
        catalog.register("1.0.1", descriptor("1.1.0"));
        let stats = catalog.stats();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.cohorts, vec!["1.0.1", "1.0.5", "default"]);
        assert_eq!(stats.default_version, "1.1.0".parse().unwrap());
    }

    /// Concurrent registers and lookups must never observe a torn
    /// descriptor: version and artifact name always belong together.
    #[test]
    fn test_concurrent_register_and_lookup_see_whole_descriptors() {
        let catalog = std::sync::Arc::new(ReleaseCatalog::with_default(descriptor("1.1.0")));

        let writer = {
            let catalog = std::sync::Arc::clone(&catalog);
            std::thread::spawn(move || {
                for patch in 0..200u64 {
                    let version = format!("2.0.{}", patch);
                    catalog.register(DEFAULT_COHORT, descriptor(&version));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let catalog = std::sync::Arc::clone(&catalog);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let release = catalog.lookup("any-cohort");
                        assert_eq!(
                            release.artifact_name,
                            format!("app_v{}.apk", release.version)
                        );
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
