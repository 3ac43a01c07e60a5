//! starsel - Star selection for constellation maps
//!
//! Usage:
//!   starsel <candidates.json>                    # Uses constellation.toml if present
//!   starsel --config <path> <candidates.json>    # Uses custom config

use anyhow::{Context, Result};
use clap::Parser;
use constellation_cli::input::CandidateFile;
use constellation_cli::output::{print_json_output, SelectionOutput};
use constellation_core::ConstellationConfig;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "constellation.toml";

#[derive(Parser, Debug)]
#[command(name = "starsel")]
#[command(about = "Select the stars worth keeping from candidate spectrogram peaks", long_about = None)]
struct Args {
    /// Path to configuration file (TOML). Defaults to constellation.toml when it exists
    #[arg(short, long)]
    config: Option<String>,

    /// Candidate star file (JSON)
    candidates: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    // Default: no logs (clean JSON output for parsing)
    // Verbose: show Info level logs for debugging
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    let config = load_config(args.config.as_deref())?;
    run_starsel(&args.candidates, &config)?;

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<ConstellationConfig> {
    match path {
        Some(path) => ConstellationConfig::load(Path::new(path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            log::info!("Using {}", DEFAULT_CONFIG_PATH);
            ConstellationConfig::load(Path::new(DEFAULT_CONFIG_PATH))
        }
        None => {
            log::info!("No config file, using defaults");
            Ok(ConstellationConfig::default())
        }
    }
}

fn run_starsel(candidates_path: &str, config: &ConstellationConfig) -> Result<()> {
    let candidates_path = Path::new(candidates_path);
    if !candidates_path.exists() {
        anyhow::bail!("Candidate file not found: {}", candidates_path.display());
    }

    let candidates = CandidateFile::load(candidates_path)?;
    log::info!(
        "Loaded {} candidates for a {}x{} spectrogram",
        candidates.stars.len(),
        candidates.num_frames,
        candidates.num_bins
    );

    let start = std::time::Instant::now();
    let buffer = config
        .buffer
        .create(&candidates.dims())
        .context("Failed to create star buffer")?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.scan.threads)
        .build()
        .context("Failed to build worker pool")?;
    pool.install(|| buffer.par_offer_all(&candidates.stars));

    let map = buffer.flush();
    let elapsed = start.elapsed();

    log::info!(
        "Retained {} of {} candidates in {:.3}s ({} strategy, {} dropped)",
        map.len(),
        candidates.stars.len(),
        elapsed.as_secs_f64(),
        buffer.strategy_name(),
        buffer.dropped()
    );

    let output = SelectionOutput::new(&buffer, candidates.stars.len(), map, elapsed.as_secs_f64());
    print_json_output(&output);

    Ok(())
}
