//! Configuration management for courierd.
//!
//! Loads settings from /etc/courier/config.toml or ./courier.toml, then
//! applies the HOST / PORT / ARTIFACT_DIR environment overrides. A built-in
//! default catalog entry ships so the daemon runs out of the box.

use crate::artifacts::DEFAULT_ARTIFACT_MIME;
use anyhow::Result;
use chrono::{DateTime, Utc};
use courier_common::{
    CatalogError, ReleaseCatalog, ReleaseDescriptor, VersionIdentifier, DEFAULT_COHORT,
    UPDATE_TYPE_RECOMMENDED,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/courier/config.toml";

/// Fallback config file path for local runs
pub const LOCAL_CONFIG_PATH: &str = "./courier.toml";

/// HTTP listener and artifact store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the downloadable artifacts
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("./artifacts")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            artifact_dir: default_artifact_dir(),
        }
    }
}

/// One catalog entry as written in config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseEntry {
    pub latest_version: VersionIdentifier,
    pub artifact_name: String,

    #[serde(default)]
    pub artifact_size_bytes: u64,

    #[serde(default)]
    pub release_notes: String,

    #[serde(default)]
    pub forced: bool,

    #[serde(default = "default_update_type")]
    pub update_type: String,

    pub release_date: DateTime<Utc>,

    /// MIME type served for this artifact; recorded at registration, never
    /// guessed from the extension at serve time.
    #[serde(default = "default_artifact_mime")]
    pub artifact_mime: String,
}

fn default_update_type() -> String {
    UPDATE_TYPE_RECOMMENDED.to_string()
}

fn default_artifact_mime() -> String {
    DEFAULT_ARTIFACT_MIME.to_string()
}

impl ReleaseEntry {
    pub fn to_descriptor(&self) -> ReleaseDescriptor {
        ReleaseDescriptor {
            version: self.latest_version,
            artifact_name: self.artifact_name.clone(),
            artifact_size_bytes: self.artifact_size_bytes,
            release_notes: self.release_notes.clone(),
            forced: self.forced,
            update_type: self.update_type.clone(),
            released_at: self.release_date,
        }
    }
}

impl Default for ReleaseEntry {
    fn default() -> Self {
        Self {
            latest_version: VersionIdentifier::new(1, 1, 0),
            artifact_name: "app_v1.1.0.apk".to_string(),
            artifact_size_bytes: 15_728_640,
            release_notes: "Stability improvements and bug fixes".to_string(),
            forced: false,
            update_type: default_update_type(),
            // 2024-01-15T10:00:00Z
            release_date: DateTime::from_timestamp(1_705_312_800, 0).unwrap_or_default(),
            artifact_mime: default_artifact_mime(),
        }
    }
}

/// Release catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Entry served to cohorts without an explicit override. Required when
    /// a `[catalog]` table is present; the built-in entry is used only when
    /// the whole section is absent.
    #[serde(default)]
    pub default: Option<ReleaseEntry>,

    /// Per-cohort overrides, keyed by the raw client version string
    #[serde(default)]
    pub cohorts: HashMap<String, ReleaseEntry>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default: Some(ReleaseEntry::default()),
            cohorts: HashMap::new(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Config {
    /// Load config from file, or return defaults. Environment overrides
    /// are applied last so container deployments win over the file.
    pub fn load() -> Self {
        let mut config = Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(LOCAL_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            });
        config.apply_env_overrides();
        config
    }

    /// Load config from specific path
    pub fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }

    /// HOST / PORT / ARTIFACT_DIR environment variables win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring unparseable PORT override: {:?}", port),
            }
        }
        if let Ok(dir) = std::env::var("ARTIFACT_DIR") {
            self.server.artifact_dir = PathBuf::from(dir);
        }
    }

    /// Assemble the release catalog. A missing default entry is a startup
    /// configuration error, not something to paper over at runtime.
    pub fn build_catalog(&self) -> Result<ReleaseCatalog, CatalogError> {
        let mut entries = HashMap::new();
        if let Some(default) = &self.catalog.default {
            entries.insert(DEFAULT_COHORT.to_string(), default.to_descriptor());
        }
        for (cohort, entry) in &self.catalog.cohorts {
            entries.insert(cohort.clone(), entry.to_descriptor());
        }
        ReleaseCatalog::new(entries)
    }

    /// MIME registrations for every configured artifact.
    pub fn artifact_mimes(&self) -> Vec<(String, String)> {
        self.catalog
            .default
            .iter()
            .chain(self.catalog.cohorts.values())
            .map(|entry| (entry.artifact_name.clone(), entry.artifact_mime.clone()))
            .collect()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
