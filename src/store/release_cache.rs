//! Release cache
//!
//! A single persisted `VersionEntry` recording the most recently tagged
//! release. Nightly-only runs read it so the published manifest always
//! carries the latest release alongside the fresh nightly entry; the
//! document is overwritten only by the run whose commit is the tagged one.

use std::path::{Path, PathBuf};

use relman_manifest::{Channel, VersionEntry};

/// Errors for release cache operations.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseCacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cached entry for version {version} has channel '{channel}', expected 'release'")]
    WrongChannel { version: String, channel: Channel },
}

/// Read handle on the persisted release cache document.
#[derive(Debug)]
pub struct ReleaseCache {
    path: PathBuf,
    cached: Option<VersionEntry>,
}

impl ReleaseCache {
    /// Load the cache; an absent document means no release seen yet.
    pub fn load(path: &Path) -> Result<Self, ReleaseCacheError> {
        let cached = if path.exists() {
            let entry: VersionEntry = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            if entry.channel != Channel::Release {
                return Err(ReleaseCacheError::WrongChannel {
                    version: entry.version,
                    channel: entry.channel,
                });
            }
            Some(entry)
        } else {
            None
        };

        Ok(Self {
            path: path.to_path_buf(),
            cached,
        })
    }

    /// Document path this cache was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached release entry, if any.
    pub fn cached(&self) -> Option<&VersionEntry> {
        self.cached.as_ref()
    }
}
