//! Archive packaging
//!
//! Wraps the built binary in a canonical single-entry tar archive with
//! normalized header fields, so packaging the same binary twice yields
//! byte-identical archives. The inner entry is named after the archive
//! stem, so extraction produces a predictably named binary.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use relman_manifest::Channel;
use tar::{Builder, Header};

/// Errors for packaging operations.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("binary not found: {0}")]
    BinaryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Archive file name for a build:
/// `{product}_{version}_{os}_{arch}_{channel}_{commit}.tar`.
pub fn archive_name(
    product: &str,
    version: &str,
    os: &str,
    arch: &str,
    channel: Channel,
    commit_short: &str,
) -> String {
    format!("{product}_{version}_{os}_{arch}_{channel}_{commit_short}.tar")
}

/// Inner entry name: the archive file name without its `.tar` suffix.
fn inner_name(archive_file_name: &str) -> &str {
    archive_file_name
        .strip_suffix(".tar")
        .unwrap_or(archive_file_name)
}

/// Package `binary` into a single-entry tar at `archive_path`.
///
/// Header fields are normalized (epoch mtime, uid/gid 0, mode 0755) to
/// keep the archive canonical.
pub fn package_binary(binary: &Path, archive_path: &Path) -> Result<(), PackageError> {
    if !binary.exists() {
        return Err(PackageError::BinaryNotFound(binary.to_path_buf()));
    }

    let file_name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("artifact.tar");
    let entry_name = inner_name(file_name);

    if let Some(parent) = archive_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let metadata = std::fs::metadata(binary)?;
    let mut source = File::open(binary)?;

    let mut builder = Builder::new(File::create(archive_path)?);

    let mut header = Header::new_gnu();
    header.set_path(entry_name)?;
    header.set_size(metadata.len());
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mode(0o755);
    header.set_cksum();

    builder.append(&header, &mut source)?;
    builder.finish()?;

    Ok(())
}
