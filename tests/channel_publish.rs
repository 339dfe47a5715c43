//! Channel reconciliation integration tests
//!
//! Drives the nightly (channel-mode) pipeline across simulated runs and
//! verifies the published manifest document, the release cache
//! lifecycle, and the publish-directory side effect.

use std::fs;
use std::path::Path;

use chrono::DateTime;
use relman::buildinfo::{BuildContext, CommitMetadata};
use relman::pipeline::ReleaseSource;
use relman::{Channel, GeneratorConfig, Pipeline, PipelineOptions};
use tempfile::TempDir;

fn write_config(root: &Path) -> GeneratorConfig {
    let binary = root.join("app");
    fs::write(&binary, b"built binary bytes").unwrap();

    GeneratorConfig::parse(&format!(
        r#"
        product = "app"
        binary_path = "{}"
        url_templates = ["https://downloads.example/{{version}}/{{name}}"]
        history_path = "{}"
        manifest_path = "{}"
        release_cache_path = "{}"
        archive_dir = "{}"
        os = "linux"
        arch = "x86_64"
        "#,
        binary.display(),
        root.join("state/update_db.json").display(),
        root.join("state/update.json").display(),
        root.join("state/release_cache.json").display(),
        root.join("archives").display(),
    ))
    .unwrap()
}

fn build_context(version: &str, commit_time: &str, tag_time: Option<&str>) -> BuildContext {
    BuildContext {
        version: version.to_string(),
        commit: CommitMetadata {
            commit_time: DateTime::parse_from_rfc3339(commit_time).unwrap(),
            commit_hash_short: "abc1234".to_string(),
        },
        latest_tag_time: tag_time.map(|t| DateTime::parse_from_rfc3339(t).unwrap()),
    }
}

/// Each "run" constructs a fresh pipeline so cache state round-trips
/// through the persisted document, like separate process invocations.
fn run_nightly(
    config: &GeneratorConfig,
    version: &str,
    commit_time: &str,
    tag_time: Option<&str>,
) -> relman::pipeline::NightlyRunReport {
    let pipeline = Pipeline::new(config.clone(), PipelineOptions::default());
    pipeline
        .run_nightly(&build_context(version, commit_time, tag_time))
        .unwrap()
}

// =============================================================================
// End-to-end example
// =============================================================================

#[test]
fn test_first_nightly_with_no_cache_publishes_single_entry() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    // Commit time differs from the tag time and no cache exists yet.
    let report = run_nightly(
        &config,
        "1.2.3",
        "2024-01-01T00:00:00Z",
        Some("2023-12-01T00:00:00Z"),
    );

    assert!(!report.tagged);
    assert_eq!(report.published.versions.len(), 1);
    assert_eq!(report.published.versions[0].version, "1.2.3");
    assert_eq!(report.published.versions[0].channel, Channel::Nightly);

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.manifest_path).unwrap()).unwrap();
    assert_eq!(raw["versions"].as_array().unwrap().len(), 1);
    assert_eq!(raw["versions"][0]["channel"], "nightly");
}

// =============================================================================
// Release cache lifecycle
// =============================================================================

#[test]
fn test_tagged_run_seeds_cache_for_later_nightlies() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    // Tagged run: commit time equals the tag time.
    let tagged = run_nightly(
        &config,
        "2.0.0",
        "2024-01-01T00:00:00Z",
        Some("2024-01-01T00:00:00Z"),
    );
    assert!(tagged.tagged);
    assert_eq!(tagged.release_source, ReleaseSource::Fresh);
    assert!(config.release_cache_path.exists());

    // Later nightly: new pipeline, cache comes from disk.
    let nightly = run_nightly(
        &config,
        "2.1.0-dev",
        "2024-02-01T00:00:00Z",
        Some("2024-01-01T00:00:00Z"),
    );
    assert!(!nightly.tagged);
    assert_eq!(nightly.release_source, ReleaseSource::Cached);

    let channels: Vec<(String, Channel)> = nightly
        .published
        .versions
        .iter()
        .map(|e| (e.version.clone(), e.channel))
        .collect();
    assert_eq!(
        channels,
        [
            ("2.1.0-dev".to_string(), Channel::Nightly),
            ("2.0.0".to_string(), Channel::Release),
        ]
    );
}

#[test]
fn test_new_tagged_run_overwrites_cached_release() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    run_nightly(
        &config,
        "2.0.0",
        "2024-01-01T00:00:00Z",
        Some("2024-01-01T00:00:00Z"),
    );
    let report = run_nightly(
        &config,
        "2.1.0",
        "2024-03-01T00:00:00Z",
        Some("2024-03-01T00:00:00Z"),
    );

    // The published release half is the fresh build, not the old cache.
    assert_eq!(report.release_source, ReleaseSource::Fresh);
    assert_eq!(report.published.versions[1].version, "2.1.0");

    let cached: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.release_cache_path).unwrap()).unwrap();
    assert_eq!(cached["version"], "2.1.0");
    assert_eq!(cached["channel"], "release");
}

#[test]
fn test_untagged_run_never_touches_cache_document() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    run_nightly(
        &config,
        "2.0.0",
        "2024-01-01T00:00:00Z",
        Some("2024-01-01T00:00:00Z"),
    );
    let before = fs::read_to_string(&config.release_cache_path).unwrap();

    run_nightly(
        &config,
        "2.0.1-dev",
        "2024-01-15T00:00:00Z",
        Some("2024-01-01T00:00:00Z"),
    );

    let after = fs::read_to_string(&config.release_cache_path).unwrap();
    assert_eq!(before, after);
}

// =============================================================================
// Published manifest ordering and publish copies
// =============================================================================

#[test]
fn test_published_manifest_is_a_view_not_history() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    run_nightly(&config, "1.0.0-dev", "2024-01-01T00:00:00Z", None);
    run_nightly(&config, "1.0.1-dev", "2024-01-02T00:00:00Z", None);

    // The document holds only the current run's view, not accumulated
    // nightly entries.
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.manifest_path).unwrap()).unwrap();
    let versions = raw["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0]["version"], "1.0.1-dev");
}

#[test]
fn test_tagged_run_publishes_both_archives() {
    let dir = TempDir::new().unwrap();
    let mut config = write_config(dir.path());
    let publish_dir = dir.path().join("publish");
    fs::create_dir(&publish_dir).unwrap();
    config.publish_dir = Some(publish_dir.clone());

    let report = run_nightly(
        &config,
        "3.0.0",
        "2024-05-01T00:00:00Z",
        Some("2024-05-01T00:00:00Z"),
    );

    assert_eq!(report.publish.copied.len(), 2);
    assert!(publish_dir
        .join("app_3.0.0_linux_x86_64_nightly_abc1234.tar")
        .exists());
    assert!(publish_dir
        .join("app_3.0.0_linux_x86_64_release_abc1234.tar")
        .exists());
}
