//! Publish-directory copies
//!
//! Copies each archive produced this run into the publish directory
//! under its published artifact name. Only attempted when the directory
//! exists; failures are reported per file and never abort the run.

use std::path::{Path, PathBuf};

/// What happened to each copy attempt.
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Destination paths written.
    pub copied: Vec<PathBuf>,

    /// Failed copies: source path and failure message.
    pub failed: Vec<(PathBuf, String)>,

    /// True when the publish directory was absent and nothing was tried.
    pub skipped: bool,
}

/// Copy `archives` (source path, published name) into `publish_dir`.
pub fn copy_artifacts(publish_dir: &Path, archives: &[(PathBuf, String)]) -> PublishReport {
    let mut report = PublishReport::default();

    if !publish_dir.is_dir() {
        report.skipped = true;
        return report;
    }

    for (source, name) in archives {
        let dest = publish_dir.join(name);
        match std::fs::copy(source, &dest) {
            Ok(_) => report.copied.push(dest),
            Err(e) => report.failed.push((source.clone(), e.to_string())),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_absent_publish_dir_is_skipped() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("app.tar");
        fs::write(&source, b"bytes").unwrap();

        let report = copy_artifacts(
            &dir.path().join("missing"),
            &[(source, "app.tar".to_string())],
        );

        assert!(report.skipped);
        assert!(report.copied.is_empty());
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_copies_under_published_name() {
        let dir = TempDir::new().unwrap();
        let publish_dir = dir.path().join("publish");
        fs::create_dir(&publish_dir).unwrap();
        let source = dir.path().join("archive.tar");
        fs::write(&source, b"bytes").unwrap();

        let report = copy_artifacts(
            &publish_dir,
            &[(source, "app_1.0.0_linux_x86_64_nightly_abc.tar".to_string())],
        );

        assert!(!report.skipped);
        assert_eq!(report.copied.len(), 1);
        assert!(publish_dir
            .join("app_1.0.0_linux_x86_64_nightly_abc.tar")
            .exists());
    }

    #[test]
    fn test_failed_copy_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let publish_dir = dir.path().join("publish");
        fs::create_dir(&publish_dir).unwrap();

        let good = dir.path().join("good.tar");
        fs::write(&good, b"bytes").unwrap();
        let bad = dir.path().join("does-not-exist.tar");

        let report = copy_artifacts(
            &publish_dir,
            &[
                (bad, "bad.tar".to_string()),
                (good, "good.tar".to_string()),
            ],
        );

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.copied.len(), 1);
        assert!(publish_dir.join("good.tar").exists());
    }
}
