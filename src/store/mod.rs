//! Persisted documents
//!
//! The two documents a run owns (history catalog, release cache) and the
//! buffered writer that commits every document of a run at once.

mod history;
mod release_cache;
mod writer;

pub use history::{HistoryError, HistoryStore, UpsertOutcome};
pub use release_cache::{ReleaseCache, ReleaseCacheError};
pub use writer::{ManifestWriter, WriteError};
