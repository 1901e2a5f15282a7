//! Walk files and sensor logs on disk, loaded the way the binaries load them.

use archwalk_cli::sim::{read_samples, SessionReplay, WalkInput};
use archwalk_core::{derive_route, FusionConfig, FusionUpdate};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

#[test]
fn demo_walk_derives_full_route() {
    let input = WalkInput::load(&demo("lower_manhattan_walk.json")).expect("demo walk loads");
    let options = input.options.unwrap_or_default();
    let result = derive_route(&input.waypoints, &input.start, &options);

    assert_eq!(result.route.len(), input.waypoints.len());
    assert_eq!(result.legs.len(), input.waypoints.len());
    assert!(result.total_distance_km > 0.0);
    // Extra building attributes survive into the ordered route
    assert!(result
        .route
        .iter()
        .all(|stop| stop.waypoint.attributes.contains_key("style")));
}

#[test]
fn missing_walk_file_names_the_path() {
    let path = std::env::temp_dir().join("archwalk-missing-walk.json");
    let _ = fs::remove_file(&path);

    let err = WalkInput::load(&path).unwrap_err();
    assert!(err.to_string().contains("archwalk-missing-walk.json"));
}

#[test]
fn demo_session_replays_to_a_fix() {
    let file = File::open(demo("flatiron_session.jsonl")).expect("demo log present");
    let samples = read_samples(BufReader::new(file)).expect("demo log parses");

    let mut replay = SessionReplay::for_samples(FusionConfig::default(), &samples);
    let records = replay.run(&samples);

    assert_eq!(records.len(), samples.len());
    assert!(replay.fusion().current_position().is_some());
    let reached_upper_floor = records.iter().any(|record| {
        matches!(record.update, FusionUpdate::Altitude(estimate) if estimate.floor > 0)
    });
    assert!(reached_upper_floor);
}
