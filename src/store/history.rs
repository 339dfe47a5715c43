//! History catalog
//!
//! The long-lived record of every published version, ordered descending
//! by parsed version (newest first), at most one entry per distinct
//! version. One process invocation owns the document: load, mutate in
//! memory, persist as a whole-document overwrite at the end of the run.

use std::path::{Path, PathBuf};

use relman_manifest::{VersionEntry, VersionError};

/// Errors for history catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Result of an upsert.
///
/// Stale input is deliberately a no-op, not an error: upserting a version
/// older than the catalog head leaves the catalog untouched and reports
/// `Dropped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The entry became the new catalog head.
    Inserted,
    /// An entry with a precedence-equal version was replaced in place.
    Replaced,
    /// A newer version is already recorded; the entry was discarded.
    Dropped,
}

/// In-memory handle on the history catalog document.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<VersionEntry>,
}

impl HistoryStore {
    /// Load the catalog, or start empty when the document is absent.
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        let entries = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(path)?)?
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Document path this store was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in stored (descending-version) order.
    pub fn entries(&self) -> &[VersionEntry] {
        &self.entries
    }

    /// Insert or update `entry`, keyed by version precedence.
    ///
    /// The catalog is scanned in stored order: a precedence-equal version
    /// is replaced in place; hitting a greater version first means the
    /// incoming entry is stale and is dropped; otherwise the entry is the
    /// newest seen and goes to the front.
    pub fn upsert(&mut self, entry: VersionEntry) -> Result<UpsertOutcome, HistoryError> {
        let incoming = entry.parsed_version()?;

        for idx in 0..self.entries.len() {
            let recorded = self.entries[idx].parsed_version()?;
            if recorded == incoming {
                self.entries[idx] = entry;
                return Ok(UpsertOutcome::Replaced);
            }
            if recorded > incoming {
                return Ok(UpsertOutcome::Dropped);
            }
        }

        self.entries.insert(0, entry);
        Ok(UpsertOutcome::Inserted)
    }
}
