//! Channel reconciliation
//!
//! Produces the per-run published view: the freshly computed nightly
//! entry combined with at most one release entry. The release entry is
//! rebuilt from the current build when this run's commit is the tagged
//! one, and taken from the release cache otherwise, so every nightly run
//! re-publishes the last known release alongside itself.

use chrono::{DateTime, FixedOffset};
use relman_manifest::{PublishedManifest, VersionEntry};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// The document to publish this run: nightly first, release appended
    /// if one exists.
    pub published: PublishedManifest,

    /// A fresh release entry to persist into the cache, present only
    /// when this run's commit is the tagged one.
    pub refreshed_release: Option<VersionEntry>,
}

/// Whether the current commit is itself the most recently tagged commit.
///
/// The trigger is timestamp equality, not hash equality: the tag's
/// committer time equals the current commit's committer time. Both sides
/// are compared as instants, so offset spelling differences do not
/// matter.
pub fn is_tagged_build(
    commit_time: DateTime<FixedOffset>,
    latest_tag_time: Option<DateTime<FixedOffset>>,
) -> bool {
    latest_tag_time.is_some_and(|tag_time| tag_time == commit_time)
}

/// Merge the current build into the published view.
///
/// `fresh_release` is the release twin of the current build, supplied
/// only on tagged runs; `cached_release` is the last persisted release,
/// used unchanged when the run is not tagged.
pub fn reconcile(
    nightly: VersionEntry,
    fresh_release: Option<VersionEntry>,
    cached_release: Option<&VersionEntry>,
) -> Reconciliation {
    let mut versions = vec![nightly];

    let refreshed_release = match fresh_release {
        Some(release) => {
            versions.push(release.clone());
            Some(release)
        }
        None => {
            if let Some(cached) = cached_release {
                versions.push(cached.clone());
            }
            None
        }
    };

    Reconciliation {
        published: PublishedManifest { versions },
        refreshed_release,
    }
}
