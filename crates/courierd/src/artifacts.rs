//! Artifact store: validated filename resolution and serving metadata.
//!
//! Filenames from clients never touch the filesystem until they pass the
//! whole-name allow-list, so traversal sequences and separators are
//! rejected before any path is built.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Canonical artifact extension, appended when a request omits it
pub const ARTIFACT_EXTENSION: &str = ".apk";

/// MIME type recorded for artifacts that do not register their own
pub const DEFAULT_ARTIFACT_MIME: &str = "application/vnd.android.package-archive";

static FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("filename allow-list regex"));

/// Validate and normalize a requested artifact filename.
///
/// Returns `None` for anything outside the `[A-Za-z0-9._-]` allow-set
/// (after trimming); otherwise the name with the canonical extension
/// appended when absent. A dot alone passes the allow-set but `..` can
/// never escape the store because separators are rejected outright.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() || !FILENAME_RE.is_match(name) {
        return None;
    }
    if name.ends_with(ARTIFACT_EXTENSION) {
        Some(name.to_string())
    } else {
        Some(format!("{}{}", name, ARTIFACT_EXTENSION))
    }
}

/// The directory of downloadable artifacts plus the MIME type recorded
/// for each at registration time.
pub struct ArtifactStore {
    root: PathBuf,
    mime_types: HashMap<String, String>,
}

impl ArtifactStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            mime_types: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record the MIME type to serve for `name`. Called when the release
    /// catalog is provisioned, never during a download.
    pub fn register_mime(&mut self, name: impl Into<String>, mime: impl Into<String>) {
        self.mime_types.insert(name.into(), mime.into());
    }

    pub fn mime_for(&self, name: &str) -> &str {
        self.mime_types
            .get(name)
            .map(String::as_str)
            .unwrap_or(DEFAULT_ARTIFACT_MIME)
    }

    /// Path for a sanitized name. Callers must pass the output of
    /// `sanitize_filename`, which contains no separators.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create the root directory if needed and seed the placement note.
    pub fn bootstrap(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let readme = self.root.join("README.txt");
        if !readme.exists() {
            fs::write(
                &readme,
                "Place application artifacts in this directory.\n\
                 Filename format: app_v{version}.apk\n\
                 Example: app_v1.1.0.apk\n",
            )?;
        }
        Ok(())
    }

    /// Names and sizes of artifacts currently present, sorted by name.
    pub fn inventory(&self) -> io::Result<Vec<(String, u64)>> {
        let mut files = Vec::new();
        if !self.root.exists() {
            return Ok(files);
        }
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(ARTIFACT_EXTENSION) {
                files.push((name, entry.metadata()?.len()));
            }
        }
        files.sort();
        Ok(files)
    }
}
