//! Relman Manifest Types
//!
//! Defines the JSON documents shared between the manifest generator and
//! the auto-updater client: the published manifest, version entries, and
//! the version-ordering primitive everything above them uses.

pub mod channel;
pub mod entry;
pub mod version;

pub use channel::Channel;
pub use entry::{FileArtifact, PublishedManifest, VersionEntry};
pub use version::{ReleaseVersion, VersionError};

/// Length of a lowercase hex SHA-256 digest as stored in `FileArtifact`.
pub const SHA256_HEX_LEN: usize = 64;
