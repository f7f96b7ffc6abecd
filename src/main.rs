//! git-times - print the latest commit time of every tracked file
//!
//! # Usage
//! ```bash
//! git-times                                  # Current repository, epoch seconds
//! git-times ~/site --subtree ~/site/docs     # Only files under docs/
//! git-times . --exclude '*.png' --format iso # RFC 3339 timestamps
//! git-times . --clear-cache                  # Drop the cached result first
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_times::output::{self, TimeFormat};
use git_times::{FindOptions, GitTimes};

/// Print the latest commit time of every tracked file under a repository subtree
#[derive(Parser)]
#[command(name = "git-times")]
#[command(about = "Latest commit time per tracked file", long_about = None)]
struct Cli {
    /// Repository root
    #[arg(value_name = "REPO_PATH", default_value = ".")]
    repo_path: PathBuf,

    /// Directory to report on, defaults to the repository root
    #[arg(short, long)]
    subtree: Option<PathBuf>,

    /// Only report paths matching one of these globs
    #[arg(long = "timestamps-for", value_name = "GLOB")]
    timestamps_for: Vec<String>,

    /// Keep paths matching these globs, even when excluded
    #[arg(short, long, value_name = "GLOB")]
    include: Vec<String>,

    /// Drop paths matching these globs
    #[arg(short, long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Do not read or write the commit cache
    #[arg(long)]
    no_cache: bool,

    /// Remove the cached result for this subtree before resolving
    #[arg(long)]
    clear_cache: bool,

    /// Output format for times
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Log every commit visited by the history walk (needs -v)
    #[arg(long)]
    debug: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Iso,
    Relative,
}

impl From<Format> for TimeFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => TimeFormat::Epoch,
            Format::Iso => TimeFormat::Iso,
            Format::Relative => TimeFormat::Relative,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let subtree = cli.subtree.clone().unwrap_or_else(|| cli.repo_path.clone());
    let mut times = match GitTimes::open(&cli.repo_path, &subtree) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("✗ {}", e);
            eprintln!("  Repo:    {}", cli.repo_path.display());
            eprintln!("  Subtree: {}", subtree.display());
            std::process::exit(2);
        }
    };

    if cli.clear_cache {
        let root = times.root().to_string_lossy().to_string();
        let subtree = times.subtree().to_string_lossy().to_string();
        if times.cache().clear(&root, &subtree)? {
            tracing::info!("Cleared commit cache for {}", subtree);
        }
    }

    let options = FindOptions {
        timestamps_for: cli.timestamps_for,
        include: cli.include,
        exclude: cli.exclude,
        with_cache: !cli.no_cache,
        debug: cli.debug,
    };
    let result = times.find(&options)?;

    let rendered = output::render(&result, cli.format.into());
    println!("{}", serde_json::to_string_pretty(&rendered)?);

    Ok(())
}
