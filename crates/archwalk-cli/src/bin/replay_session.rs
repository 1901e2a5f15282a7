//! Replay a recorded sensor session through position fusion.

use anyhow::{Context, Result};
use archwalk_cli::sim::{read_samples, SessionReplay};
use archwalk_cli::{init_tracing, Config};
use archwalk_core::FusionConfig;
use clap::Parser;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

/// Feed a JSON-lines sensor log through a fusion session
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Sensor log, one timestamped sample per line
    #[arg(long)]
    input: PathBuf,

    /// Fusion tunables as JSON (missing fields keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_tracing(&config.log_directive)?;

    let fusion_config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read fusion config {}", path.display()))?;
            serde_json::from_str::<FusionConfig>(&raw)
                .with_context(|| format!("failed to parse fusion config {}", path.display()))?
        }
        None => FusionConfig::default(),
    };

    let file = File::open(&args.input)
        .with_context(|| format!("failed to open sensor log {}", args.input.display()))?;
    let samples = read_samples(BufReader::new(file))?;
    tracing::info!(samples = samples.len(), "replaying session");

    let mut replay = SessionReplay::for_samples(fusion_config, &samples);
    for timed in &samples {
        let record = replay.step(timed);
        println!("{}", serde_json::to_string(&record)?);
    }

    match replay.fusion().current_position() {
        Some(position) => tracing::info!(
            lat = position.lat,
            lng = position.lng,
            confidence = replay.fusion().confidence(),
            "session finished"
        ),
        None => tracing::warn!("session finished without a GPS fix"),
    }

    Ok(())
}
