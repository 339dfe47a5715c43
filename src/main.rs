//! Relman CLI
//!
//! Entry point for the `relman` command-line tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use relman::buildinfo::BuildContext;
use relman::pipeline::{NightlyRunReport, ReleaseRunReport, ReleaseSource};
use relman::store::{HistoryStore, ReleaseCache};
use relman::{GeneratorConfig, Pipeline, PipelineOptions};

#[derive(Parser)]
#[command(name = "relman")]
#[command(about = "Update manifest lane", version)]
struct Cli {
    /// Path to the generator config file (default: .relman/relman.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Repository the commit/tag metadata is read from
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Verbose progress on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Compute everything, write no documents
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record the current build in the history catalog (release channel)
    Release,

    /// Publish the current build as a nightly, alongside the last release
    Nightly,

    /// Print the current catalog and release cache state
    Show {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(GeneratorConfig::default_path);

    let config = match GeneratorConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Release => run_release(config, &cli),
        Commands::Nightly => run_nightly(config, &cli),
        Commands::Show { json } => run_show(&config, json),
    }
}

fn gather_context(config: &GeneratorConfig, cli: &Cli) -> BuildContext {
    match BuildContext::gather(&config.build_manifest, &cli.repo) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error gathering build metadata: {}", e);
            process::exit(11);
        }
    }
}

fn pipeline_options(cli: &Cli) -> PipelineOptions {
    PipelineOptions {
        verbose: cli.verbose,
        dry_run: cli.dry_run,
    }
}

fn run_release(config: GeneratorConfig, cli: &Cli) {
    let ctx = gather_context(&config, cli);
    let pipeline = Pipeline::new(config, pipeline_options(cli));

    match pipeline.run_release(&ctx) {
        Ok(report) => print_release_report(&report),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run_nightly(config: GeneratorConfig, cli: &Cli) {
    let ctx = gather_context(&config, cli);
    let pipeline = Pipeline::new(config, pipeline_options(cli));

    match pipeline.run_nightly(&ctx) {
        Ok(report) => print_nightly_report(&report),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn print_release_report(report: &ReleaseRunReport) {
    println!(
        "Release {}: {:?} ({} catalog entries)",
        report.version, report.outcome, report.catalog_len
    );
    if report.dry_run {
        println!("Dry-run: no documents written.");
        return;
    }
    for path in &report.written {
        println!("  Wrote: {}", path.display());
    }
}

fn print_nightly_report(report: &NightlyRunReport) {
    let release = match report.release_source {
        ReleaseSource::Fresh => "fresh release (tagged build)",
        ReleaseSource::Cached => "cached release",
        ReleaseSource::Absent => "no release entry",
    };
    println!(
        "Nightly {}: {} published version(s), {}",
        report.version,
        report.published.versions.len(),
        release
    );
    if report.dry_run {
        println!("Dry-run: no documents written.");
        return;
    }
    for path in &report.written {
        println!("  Wrote: {}", path.display());
    }
    for path in &report.publish.copied {
        println!("  Published: {}", path.display());
    }
    for (source, message) in &report.publish.failed {
        eprintln!("  Publish failed for {}: {}", source.display(), message);
    }
}

fn run_show(config: &GeneratorConfig, json: bool) {
    let history = match HistoryStore::load(&config.history_path) {
        Ok(history) => history,
        Err(e) => {
            eprintln!("Error loading history catalog: {}", e);
            process::exit(40);
        }
    };

    let cache = match ReleaseCache::load(&config.release_cache_path) {
        Ok(cache) => cache,
        Err(e) => {
            eprintln!("Error loading release cache: {}", e);
            process::exit(41);
        }
    };

    if json {
        let output = serde_json::json!({
            "history": history.entries(),
            "release_cache": cache.cached(),
        });
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    if history.entries().is_empty() {
        println!("History catalog is empty.");
    } else {
        println!("History catalog ({} entries):\n", history.entries().len());
        for entry in history.entries() {
            println!("  {} [{}] published {}", entry.version, entry.channel, entry.pub_time);
            for file in &entry.files {
                println!("    {} ({} bytes)", file.name, file.size);
            }
        }
        println!();
    }

    match cache.cached() {
        Some(entry) => println!(
            "Release cache: {} published {}",
            entry.version, entry.pub_time
        ),
        None => println!("Release cache: empty"),
    }
}
