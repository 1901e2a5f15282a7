//! Order a walk from a JSON file and print the route as JSON.

use anyhow::{Context, Result};
use archwalk_cli::sim::WalkInput;
use archwalk_cli::{init_tracing, Config};
use archwalk_core::{try_derive_route, RouteOptions};
use clap::Parser;
use std::path::PathBuf;

/// Derive a walking route through a set of buildings
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Walk file: {"start": {...}, "waypoints": [...]}
    #[arg(long)]
    input: PathBuf,

    /// Walking speed in km/h (overrides file and ARCHWALK_SPEED_KMH)
    #[arg(long)]
    speed_kmh: Option<f64>,

    /// 2-opt swap budget (overrides file and ARCHWALK_MAX_SWAPS)
    #[arg(long)]
    max_swaps: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_tracing(&config.log_directive)?;

    let input = WalkInput::load(&args.input)?;
    let file_options = input.options.unwrap_or_else(|| config.route_options(None, None));
    let options = RouteOptions {
        speed_kmh: args.speed_kmh.unwrap_or(file_options.speed_kmh),
        max_swaps: args.max_swaps.unwrap_or(file_options.max_swaps),
    };

    tracing::info!(
        stops = input.waypoints.len(),
        speed_kmh = options.speed_kmh,
        max_swaps = options.max_swaps,
        "deriving route"
    );
    let result = try_derive_route(&input.waypoints, &input.start, &options)
        .with_context(|| format!("invalid walk in {}", args.input.display()))?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);

    Ok(())
}
