//! Time the route engine on random waypoint sets.

use anyhow::Result;
use archwalk_cli::sim::{random_point_near, random_waypoints};
use archwalk_cli::{init_tracing, Config};
use archwalk_core::route_engine::{nearest_neighbor_order, route_length_km};
use archwalk_core::{derive_route, Coordinate};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

/// Stress the nearest-neighbor + 2-opt route engine
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Waypoints per case
    #[arg(long, default_value_t = 50)]
    count: usize,

    /// Number of random cases
    #[arg(long, default_value_t = 5)]
    cases: usize,

    /// RNG seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 40.7128)]
    center_lat: f64,

    #[arg(long, default_value_t = -74.0060, allow_hyphen_values = true)]
    center_lng: f64,

    /// Half-width of the scatter square in degrees (~2 km at 0.02)
    #[arg(long, default_value_t = 0.02)]
    radius_deg: f64,

    /// 2-opt swap budget (overrides ARCHWALK_MAX_SWAPS)
    #[arg(long)]
    max_swaps: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_tracing(&config.log_directive)?;

    let options = config.route_options(None, args.max_swaps);
    let center = Coordinate::new(args.center_lat, args.center_lng);
    let mut rng = StdRng::seed_from_u64(args.seed);

    for case in 1..=args.cases {
        let waypoints = random_waypoints(&mut rng, &center, args.radius_deg, args.count);
        let start = random_point_near(&mut rng, &center, args.radius_deg);

        println!("\n=== case {} ({} stops) ===", case, waypoints.len());

        let greedy = nearest_neighbor_order(&waypoints, &start);
        let greedy_km = route_length_km(&start, greedy.iter().copied());

        let started = Instant::now();
        let result = derive_route(&waypoints, &start, &options);
        let elapsed = started.elapsed();

        let refined_km = route_length_km(&start, result.route.iter().map(|stop| &stop.waypoint));
        let saved_pct = if greedy_km > 0.0 {
            (greedy_km - refined_km) / greedy_km * 100.0
        } else {
            0.0
        };

        println!(
            "Result: OK | swaps={} budget={} elapsed={:.2}ms",
            result.swaps_applied,
            options.max_swaps,
            elapsed.as_secs_f64() * 1000.0
        );
        println!(
            "Distance: nearest-neighbor={:.3}km 2-opt={:.3}km saved={:.1}% est={}min",
            greedy_km, refined_km, saved_pct, result.est_duration_min
        );
        if refined_km > greedy_km + 1e-9 {
            println!("Non-regression check: FAIL");
        } else {
            println!("Non-regression check: PASS");
        }
    }

    Ok(())
}
