//! Version entries and the published manifest document.
//!
//! Field names are part of the document contract consumed by the updater
//! client: `version, channel, pub_time, files:[{name,size,sha256,urls}]`.

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::version::{ReleaseVersion, VersionError};

/// A single downloadable artifact belonging to a version entry.
///
/// `sha256` and `size` describe exactly one physical artifact; the record
/// is immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileArtifact {
    /// Artifact file name as published.
    pub name: String,

    /// Size in bytes.
    pub size: u64,

    /// SHA-256 of the artifact contents, lowercase hex.
    pub sha256: String,

    /// Download URLs in priority order; the first is the preferred mirror.
    pub urls: Vec<String>,
}

/// One published version of the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Semantic version string.
    pub version: String,

    /// Channel this entry was published under.
    pub channel: Channel,

    /// RFC3339 publication timestamp.
    pub pub_time: String,

    /// Artifacts for this version (non-empty).
    pub files: Vec<FileArtifact>,
}

impl VersionEntry {
    /// Parse this entry's `version` field.
    pub fn parsed_version(&self) -> Result<ReleaseVersion, VersionError> {
        ReleaseVersion::parse(&self.version)
    }
}

/// The per-run document an updater client fetches.
///
/// This is a view, not history: entries appear in publication order,
/// nightly first, then release if present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishedManifest {
    /// Entries in publication order.
    pub versions: Vec<VersionEntry>,
}
