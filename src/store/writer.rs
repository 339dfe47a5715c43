//! Manifest writer
//!
//! Serializes the documents of one run up front and writes them only
//! after the whole run has succeeded: a fatal error anywhere leaves every
//! persisted document untouched. Each write is a whole-document
//! overwrite.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Errors for manifest writing.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Buffered writer for the run's output documents.
#[derive(Debug, Default)]
pub struct ManifestWriter {
    staged: Vec<(PathBuf, String)>,
}

impl ManifestWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `document` and buffer it for `path`.
    ///
    /// Serialization failures surface here, before anything is written.
    pub fn stage<T: Serialize>(&mut self, path: &Path, document: &T) -> Result<(), WriteError> {
        let json = serde_json::to_string_pretty(document)?;
        self.staged.push((path.to_path_buf(), json));
        Ok(())
    }

    /// Paths staged so far, in stage order.
    pub fn staged_paths(&self) -> Vec<&Path> {
        self.staged.iter().map(|(path, _)| path.as_path()).collect()
    }

    /// Write every staged document, creating parent directories as
    /// needed. Consumes the writer; returns the written paths.
    pub fn commit(self) -> Result<Vec<PathBuf>, WriteError> {
        let mut written = Vec::with_capacity(self.staged.len());

        for (path, json) in self.staged {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|source| WriteError::Io {
                        path: path.clone(),
                        source,
                    })?;
                }
            }
            std::fs::write(&path, &json).map_err(|source| WriteError::Io {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relman_manifest::{Channel, FileArtifact, PublishedManifest, VersionEntry};
    use tempfile::TempDir;

    fn manifest() -> PublishedManifest {
        PublishedManifest {
            versions: vec![VersionEntry {
                version: "1.0.0".to_string(),
                channel: Channel::Nightly,
                pub_time: "2024-01-01T00:00:00Z".to_string(),
                files: vec![FileArtifact {
                    name: "app.tar".to_string(),
                    size: 4,
                    sha256: "e".repeat(64),
                    urls: vec!["https://downloads.example/app.tar".to_string()],
                }],
            }],
        }
    }

    #[test]
    fn test_nothing_written_before_commit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("update.json");

        let mut writer = ManifestWriter::new();
        writer.stage(&path, &manifest()).unwrap();

        assert!(!path.exists());
        assert_eq!(writer.staged_paths(), [path.as_path()]);
    }

    #[test]
    fn test_commit_writes_all_staged_documents() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join("out/update.json");
        let history_path = dir.path().join("out/update_db.json");

        let mut writer = ManifestWriter::new();
        writer.stage(&manifest_path, &manifest()).unwrap();
        writer.stage(&history_path, &manifest().versions).unwrap();

        let written = writer.commit().unwrap();
        assert_eq!(written, [manifest_path.clone(), history_path.clone()]);

        let reloaded: PublishedManifest =
            serde_json::from_str(&std::fs::read_to_string(&manifest_path).unwrap()).unwrap();
        assert_eq!(reloaded, manifest());

        let catalog: Vec<VersionEntry> =
            serde_json::from_str(&std::fs::read_to_string(&history_path).unwrap()).unwrap();
        assert_eq!(catalog, manifest().versions);
    }

    #[test]
    fn test_commit_overwrites_whole_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("update.json");
        std::fs::write(&path, "stale contents that are much longer than the new document")
            .unwrap();

        let mut writer = ManifestWriter::new();
        writer.stage(&path, &Vec::<VersionEntry>::new()).unwrap();
        writer.commit().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "[]");
    }
}
