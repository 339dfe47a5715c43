//! Pipeline orchestration
//!
//! One batch invocation per build: package the binary, describe it, fold
//! it into the history catalog (release mode) or the channel view
//! (nightly mode), and only then write the persisted documents. All
//! document writes are buffered in the manifest writer, so a fatal error
//! anywhere leaves both persisted documents untouched.

use std::path::PathBuf;

use relman_manifest::{Channel, PublishedManifest, ReleaseVersion, VersionEntry, VersionError};

use crate::artifact::{
    archive_name, describe_artifact, expand_urls, package_binary, ArtifactError, PackageError,
};
use crate::buildinfo::{BuildContext, BuildInfoError};
use crate::config::{ConfigError, GeneratorConfig};
use crate::publish::{copy_artifacts, PublishReport};
use crate::reconcile::{is_tagged_build, reconcile};
use crate::store::{
    HistoryError, HistoryStore, ManifestWriter, ReleaseCache, ReleaseCacheError, UpsertOutcome,
    WriteError,
};

/// Pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("build metadata error: {0}")]
    BuildInfo(#[from] BuildInfoError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("packaging error: {0}")]
    Package(#[from] PackageError),

    #[error("history catalog error: {0}")]
    History(#[from] HistoryError),

    #[error("release cache error: {0}")]
    ReleaseCache(#[from] ReleaseCacheError),

    #[error("write error: {0}")]
    Write(#[from] WriteError),
}

impl PipelineError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 1,
            PipelineError::Version(_) => 10,
            PipelineError::BuildInfo(_) => 11,
            PipelineError::Artifact(_) => 12,
            PipelineError::Package(_) => 13,
            PipelineError::History(_) => 40,
            PipelineError::ReleaseCache(_) => 41,
            PipelineError::Write(_) => 42,
        }
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Invocation options carried alongside the generator config.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Verbose progress on stderr.
    pub verbose: bool,

    /// Compute and report everything, write no documents and publish
    /// nothing.
    pub dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            dry_run: false,
        }
    }
}

/// Where the release half of a published manifest came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseSource {
    /// Rebuilt from the current (tagged) build.
    Fresh,
    /// Taken unchanged from the release cache.
    Cached,
    /// No release entry available this run.
    Absent,
}

/// Report of a history-mode (release) run.
#[derive(Debug)]
pub struct ReleaseRunReport {
    pub version: String,
    pub outcome: UpsertOutcome,
    pub catalog_len: usize,
    pub written: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Report of a channel-mode (nightly) run.
#[derive(Debug)]
pub struct NightlyRunReport {
    pub version: String,
    pub tagged: bool,
    pub release_source: ReleaseSource,
    pub published: PublishedManifest,
    pub written: Vec<PathBuf>,
    pub publish: PublishReport,
    pub dry_run: bool,
}

/// Pipeline execution context for one run.
pub struct Pipeline {
    config: GeneratorConfig,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline from an already-loaded config.
    pub fn new(config: GeneratorConfig, options: PipelineOptions) -> Self {
        Self { config, options }
    }

    /// The generator config this pipeline runs with.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// History mode: upsert the current build as a release entry into the
    /// catalog and emit the full-catalog manifest.
    pub fn run_release(&self, ctx: &BuildContext) -> PipelineResult<ReleaseRunReport> {
        // Reject unparsable versions before any document is loaded.
        ReleaseVersion::parse(&ctx.version)?;

        let (entry, _archive) = self.build_entry(Channel::Release, ctx)?;

        let mut history = HistoryStore::load(&self.config.history_path)?;
        let outcome = history.upsert(entry)?;

        if self.options.verbose {
            eprintln!(
                "Catalog upsert for {}: {:?} ({} entries)",
                ctx.version,
                outcome,
                history.entries().len()
            );
        }

        let mut writer = ManifestWriter::new();
        writer.stage(&self.config.history_path, &history.entries())?;
        writer.stage(
            &self.config.manifest_path,
            &PublishedManifest {
                versions: history.entries().to_vec(),
            },
        )?;

        let written = if self.options.dry_run {
            if self.options.verbose {
                eprintln!("Dry-run: skipping document writes");
            }
            Vec::new()
        } else {
            writer.commit()?
        };

        Ok(ReleaseRunReport {
            version: ctx.version.clone(),
            outcome,
            catalog_len: history.entries().len(),
            written,
            dry_run: self.options.dry_run,
        })
    }

    /// Channel mode: reconcile the fresh nightly entry with at most one
    /// release entry into the published manifest.
    pub fn run_nightly(&self, ctx: &BuildContext) -> PipelineResult<NightlyRunReport> {
        ReleaseVersion::parse(&ctx.version)?;

        let (nightly_entry, nightly_archive) = self.build_entry(Channel::Nightly, ctx)?;

        let tagged = is_tagged_build(ctx.commit.commit_time, ctx.latest_tag_time);
        if self.options.verbose {
            eprintln!(
                "Commit {} at {}: {}",
                ctx.commit.commit_hash_short,
                ctx.commit.commit_time.to_rfc3339(),
                if tagged { "tagged release" } else { "nightly only" }
            );
        }

        let fresh = if tagged {
            Some(self.build_entry(Channel::Release, ctx)?)
        } else {
            None
        };

        let cache = ReleaseCache::load(&self.config.release_cache_path)?;

        let mut produced = vec![(nightly_archive, nightly_entry.files[0].name.clone())];
        let fresh_entry = fresh.map(|(entry, archive)| {
            produced.push((archive, entry.files[0].name.clone()));
            entry
        });

        let release_source = if fresh_entry.is_some() {
            ReleaseSource::Fresh
        } else if cache.cached().is_some() {
            ReleaseSource::Cached
        } else {
            ReleaseSource::Absent
        };

        let rec = reconcile(nightly_entry, fresh_entry, cache.cached());

        let mut writer = ManifestWriter::new();
        writer.stage(&self.config.manifest_path, &rec.published)?;
        if let Some(ref refreshed) = rec.refreshed_release {
            // The cache document is touched only by the tagged run.
            writer.stage(&self.config.release_cache_path, refreshed)?;
        }

        let (written, publish) = if self.options.dry_run {
            if self.options.verbose {
                eprintln!("Dry-run: skipping document writes and publish copies");
            }
            (Vec::new(), PublishReport::default())
        } else {
            let written = writer.commit()?;
            let publish = match &self.config.publish_dir {
                Some(dir) => {
                    let report = copy_artifacts(dir, &produced);
                    if self.options.verbose {
                        for (source, message) in &report.failed {
                            eprintln!(
                                "Warning: could not publish {}: {}",
                                source.display(),
                                message
                            );
                        }
                    }
                    report
                }
                None => PublishReport {
                    skipped: true,
                    ..PublishReport::default()
                },
            };
            (written, publish)
        };

        Ok(NightlyRunReport {
            version: rec.published.versions[0].version.clone(),
            tagged,
            release_source,
            published: rec.published,
            written,
            publish,
            dry_run: self.options.dry_run,
        })
    }

    /// Package the binary for `channel` and describe the archive.
    fn build_entry(
        &self,
        channel: Channel,
        ctx: &BuildContext,
    ) -> PipelineResult<(VersionEntry, PathBuf)> {
        let name = archive_name(
            &self.config.product,
            &ctx.version,
            &self.config.os,
            &self.config.arch,
            channel,
            &ctx.commit.commit_hash_short,
        );
        let archive_path = self.config.effective_archive_dir().join(&name);

        if self.options.verbose {
            eprintln!("Packaging {} -> {}", self.config.binary_path.display(), name);
        }
        package_binary(&self.config.binary_path, &archive_path)?;

        let urls = expand_urls(&self.config.url_templates, &ctx.version, &name);
        let artifact = describe_artifact(&archive_path, &name, urls)?;

        let entry = VersionEntry {
            version: ctx.version.clone(),
            channel,
            pub_time: ctx.commit.commit_time.to_rfc3339(),
            files: vec![artifact],
        };

        Ok((entry, archive_path))
    }
}
