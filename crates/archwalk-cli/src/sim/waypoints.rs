//! Random waypoint sets around a centre point.

use archwalk_core::{Coordinate, Waypoint};
use rand::Rng;

/// Smallest spread used when the caller asks for a zero radius.
const MIN_RADIUS_DEG: f64 = 1e-6;

/// A point uniformly inside the `radius_deg` square around `center`.
pub fn random_point_near<R: Rng + ?Sized>(
    rng: &mut R,
    center: &Coordinate,
    radius_deg: f64,
) -> Coordinate {
    let radius = radius_deg.abs().max(MIN_RADIUS_DEG);
    Coordinate::new(
        center.lat + rng.random_range(-radius..radius),
        center.lng + rng.random_range(-radius..radius),
    )
}

/// `count` waypoints named `stop-1..=stop-count` scattered around `center`.
pub fn random_waypoints<R: Rng + ?Sized>(
    rng: &mut R,
    center: &Coordinate,
    radius_deg: f64,
    count: usize,
) -> Vec<Waypoint> {
    (1..=count)
        .map(|i| {
            let point = random_point_near(rng, center, radius_deg);
            Waypoint::new(format!("stop-{i}"), point.lat, point.lng)
        })
        .collect()
}
