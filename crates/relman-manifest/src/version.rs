//! Semantic-version parsing and ordering.
//!
//! Every version comparison in the workspace goes through
//! [`ReleaseVersion`]; raw version strings are never compared directly.
//! Ordering follows SemVer precedence: numeric major/minor/patch,
//! pre-release below the release of the same triple, build metadata
//! ignored.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::Version;

/// Error for unparsable version strings.
#[derive(Debug, thiserror::Error)]
#[error("invalid version '{input}': {source}")]
pub struct VersionError {
    /// The string that failed to parse.
    pub input: String,
    #[source]
    source: semver::Error,
}

/// A parsed semantic version with SemVer precedence ordering.
///
/// `1.0.0` and `1.0.0+build1` compare equal; `1.0.0-rc1` sorts below
/// `1.0.0`.
#[derive(Debug, Clone)]
pub struct ReleaseVersion(Version);

impl ReleaseVersion {
    /// Parse a version string.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        Version::parse(input).map(Self).map_err(|source| VersionError {
            input: input.to_string(),
            source,
        })
    }

    /// Access the underlying semver components.
    pub fn as_semver(&self) -> &Version {
        &self.0
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.0.cmp_precedence(&other.0) == Ordering::Equal
    }
}

impl Eq for ReleaseVersion {}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp_precedence(&other.0)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ReleaseVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
