//! Build metadata collaborators
//!
//! Supplies the version, commit, and tag inputs of one generation run:
//! the current version from the TOML build manifest, and commit/tag
//! timestamps from the version-control log.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, FixedOffset};

/// Errors from build metadata lookups. All of these abort the run.
#[derive(Debug, thiserror::Error)]
pub enum BuildInfoError {
    #[error("no version configured in {0}")]
    VersionUnavailable(PathBuf),

    #[error("failed to read build manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse build manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("git {args} failed: {message}")]
    Git { args: String, message: String },

    #[error("invalid timestamp '{input}': {source}")]
    Timestamp {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Commit metadata for the current build.
#[derive(Debug, Clone)]
pub struct CommitMetadata {
    /// Committer time of HEAD.
    pub commit_time: DateTime<FixedOffset>,

    /// Abbreviated commit hash.
    pub commit_hash_short: String,
}

/// The build-system inputs of one generation run.
///
/// Gathered once at the start of a run; the pipeline itself never talks
/// to the build system or the version-control log.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Version string from the build manifest.
    pub version: String,

    /// Commit metadata of HEAD.
    pub commit: CommitMetadata,

    /// Committer time of the most recent tag, if any.
    pub latest_tag_time: Option<DateTime<FixedOffset>>,
}

impl BuildContext {
    /// Gather version, commit, and tag metadata for `repo_dir`.
    pub fn gather(build_manifest: &Path, repo_dir: &Path) -> Result<Self, BuildInfoError> {
        Ok(Self {
            version: current_version(build_manifest)?,
            commit: commit_metadata(repo_dir)?,
            latest_tag_time: latest_tag_time(repo_dir)?,
        })
    }
}

/// Read the package version from a TOML build manifest.
///
/// Looks for `package.version`, then a top-level `version` key.
pub fn current_version(build_manifest: &Path) -> Result<String, BuildInfoError> {
    let content = std::fs::read_to_string(build_manifest)?;
    let value: toml::Value = toml::from_str(&content)?;

    let version = value
        .get("package")
        .and_then(|pkg| pkg.get("version"))
        .or_else(|| value.get("version"))
        .and_then(toml::Value::as_str);

    match version {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(BuildInfoError::VersionUnavailable(
            build_manifest.to_path_buf(),
        )),
    }
}

/// Commit time and short hash of HEAD in `repo_dir`.
pub fn commit_metadata(repo_dir: &Path) -> Result<CommitMetadata, BuildInfoError> {
    let raw_time = run_git(repo_dir, &["log", "-1", "--format=%cI"])?;
    let commit_time = parse_rfc3339(&raw_time)?;
    let commit_hash_short = run_git(repo_dir, &["log", "-1", "--format=%h"])?;

    Ok(CommitMetadata {
        commit_time,
        commit_hash_short,
    })
}

/// Committer time of the most recent tag, or `None` when the repository
/// has no tags.
pub fn latest_tag_time(repo_dir: &Path) -> Result<Option<DateTime<FixedOffset>>, BuildInfoError> {
    let tag = match run_git(repo_dir, &["describe", "--tags", "--abbrev=0"]) {
        Ok(tag) => tag,
        // No tags yet is a normal state for a young repository.
        Err(BuildInfoError::Git { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };

    let raw_time = run_git(repo_dir, &["log", "-1", &tag, "--format=%cI"])?;
    Ok(Some(parse_rfc3339(&raw_time)?))
}

fn parse_rfc3339(input: &str) -> Result<DateTime<FixedOffset>, BuildInfoError> {
    DateTime::parse_from_rfc3339(input).map_err(|source| BuildInfoError::Timestamp {
        input: input.to_string(),
        source,
    })
}

fn run_git(repo_dir: &Path, args: &[&str]) -> Result<String, BuildInfoError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .map_err(|e| BuildInfoError::Git {
            args: args.join(" "),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(BuildInfoError::Git {
            args: args.join(" "),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
