//! Semantic version identifiers for update negotiation.
//!
//! Accepts exactly `major.minor.patch` or `major.minor.patch+build`.
//! Anything else is rejected whole at parse time so malformed versions
//! surface at the request boundary instead of deep inside decision logic.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Error for version strings that do not match `major.minor.patch(+build)?`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed version string: {0:?}")]
pub struct MalformedVersion(pub String);

/// A parsed application version with an optional numeric build suffix.
///
/// `1.0.4` and `1.0.4+0` are distinct values: an absent build is never
/// substituted with zero, and it sorts below any present build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionIdentifier {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub build: Option<u64>,
}

impl VersionIdentifier {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            build: None,
        }
    }

    pub fn with_build(major: u64, minor: u64, patch: u64, build: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            build: Some(build),
        }
    }
}

impl FromStr for VersionIdentifier {
    type Err = MalformedVersion;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        // All-digit check before parsing: rejects empty segments, signs,
        // whitespace and trailing garbage like "6extra" in one place.
        let number = |segment: &str| -> Result<u64, MalformedVersion> {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(MalformedVersion(text.to_string()));
            }
            segment
                .parse::<u64>()
                .map_err(|_| MalformedVersion(text.to_string()))
        };

        let (core, build) = match text.split_once('+') {
            Some((core, build)) => (core, Some(build)),
            None => (text, None),
        };

        let mut segments = core.split('.');
        let (major, minor, patch) = match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(major), Some(minor), Some(patch), None) => (major, minor, patch),
            _ => return Err(MalformedVersion(text.to_string())),
        };

        Ok(Self {
            major: number(major)?,
            minor: number(minor)?,
            patch: number(patch)?,
            build: build.map(number).transpose()?,
        })
    }
}

impl fmt::Display for VersionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(build) = self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl Ord for VersionIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            // Tie-break on build: a bare version sorts below the same
            // major.minor.patch with any build suffix.
            .then_with(|| self.build.cmp(&other.build))
    }
}

impl PartialOrd for VersionIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Wire form is the textual version, not a struct.

impl Serialize for VersionIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
