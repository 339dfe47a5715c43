//! Artifact descriptors
//!
//! Builds the `FileArtifact` record for a packaged archive: size from
//! file metadata, streaming SHA-256 of the contents, and download URLs
//! expanded from the configured templates.

mod package;

pub use package::{archive_name, package_binary, PackageError};

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use relman_manifest::FileArtifact;
use sha2::{Digest, Sha256};

/// Errors for artifact description.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("no download URLs configured")]
    NoUrls,
}

/// Compute the SHA-256 of a file, lowercase hex.
pub fn file_sha256(path: &Path) -> Result<String, ArtifactError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Expand URL templates, substituting `{version}` and `{name}`.
///
/// Templates are expanded in declared order, so the first result is the
/// preferred mirror.
pub fn expand_urls(templates: &[String], version: &str, name: &str) -> Vec<String> {
    templates
        .iter()
        .map(|t| t.replace("{version}", version).replace("{name}", name))
        .collect()
}

/// Describe the artifact at `path` as a `FileArtifact`.
///
/// Pure function of the file contents apart from reading them.
pub fn describe_artifact(
    path: &Path,
    name: &str,
    urls: Vec<String>,
) -> Result<FileArtifact, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }
    if urls.is_empty() {
        return Err(ArtifactError::NoUrls);
    }

    let size = std::fs::metadata(path)?.len();
    let sha256 = file_sha256(path)?;

    Ok(FileArtifact {
        name: name.to_string(),
        size,
        sha256,
        urls,
    })
}
