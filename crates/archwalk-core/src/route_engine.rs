//! Walking-tour ordering: nearest-neighbor construction refined by 2-opt.
//!
//! The route is an open path from the walker's start point; there is no
//! return leg. Both phases use haversine distances and resolve ties in
//! favour of the earliest candidate.

use crate::error::{validate_coordinate, InputError, InputResult};
use crate::models::{
    Coordinate, LegEndpoint, OrderedWaypoint, RouteLeg, RouteResult, StartPoint, Waypoint,
};
use crate::spatial::{distance_km, round2};
use serde::{Deserialize, Serialize};

/// Method tag reported on every [`RouteResult`].
pub const ROUTE_METHOD: &str = "nearest-neighbor+2opt";

/// Improvements smaller than this are treated as floating-point noise.
const TWO_OPT_EPSILON_KM: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    /// Average walking speed used for the duration estimate
    pub speed_kmh: f64,
    /// Upper bound on accepted 2-opt reversals
    pub max_swaps: usize,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            speed_kmh: 4.5,
            max_swaps: 2000,
        }
    }
}

/// Order `waypoints` into a walk starting at `start`.
///
/// Never fails: an empty waypoint set produces an empty route, and
/// non-finite coordinates propagate into the distances. Use
/// [`try_derive_route`] to reject such input instead.
pub fn derive_route(
    waypoints: &[Waypoint],
    start: &StartPoint,
    options: &RouteOptions,
) -> RouteResult {
    if waypoints.is_empty() {
        return RouteResult {
            start: *start,
            route: Vec::new(),
            legs: Vec::new(),
            total_distance_km: 0.0,
            est_duration_min: 0,
            method: ROUTE_METHOD.to_string(),
            swaps_applied: 0,
        };
    }

    let mut route = nearest_neighbor_order(waypoints, start);
    let swaps_applied = two_opt(&mut route, options.max_swaps);

    let mut legs = Vec::with_capacity(route.len());
    let mut total_km = 0.0;

    let first = route[0];
    let d0 = distance_km(start, &first.coordinate());
    total_km += d0;
    legs.push(RouteLeg {
        from: LegEndpoint::from_start(start),
        to: LegEndpoint::from_waypoint(first),
        distance_km: round2(d0),
    });

    for pair in route.windows(2) {
        let d = distance_km(&pair[0].coordinate(), &pair[1].coordinate());
        total_km += d;
        legs.push(RouteLeg {
            from: LegEndpoint::from_waypoint(pair[0]),
            to: LegEndpoint::from_waypoint(pair[1]),
            distance_km: round2(d),
        });
    }

    let est_duration_min = estimate_minutes(total_km, options.speed_kmh);

    tracing::debug!(
        stops = route.len(),
        swaps = swaps_applied,
        total_km,
        est_duration_min,
        "derived walking route"
    );

    RouteResult {
        start: *start,
        route: route
            .into_iter()
            .enumerate()
            .map(|(i, waypoint)| OrderedWaypoint {
                order: i + 1,
                waypoint: waypoint.clone(),
            })
            .collect(),
        legs,
        total_distance_km: round2(total_km),
        est_duration_min,
        method: ROUTE_METHOD.to_string(),
        swaps_applied,
    }
}

/// Validating wrapper around [`derive_route`].
pub fn try_derive_route(
    waypoints: &[Waypoint],
    start: &StartPoint,
    options: &RouteOptions,
) -> InputResult<RouteResult> {
    let checked = validate_route_input(waypoints, start, options);
    if let Err(err) = &checked {
        tracing::warn!(error = %err, "rejected route input");
    }
    checked.map(|()| derive_route(waypoints, start, options))
}

fn validate_route_input(
    waypoints: &[Waypoint],
    start: &StartPoint,
    options: &RouteOptions,
) -> InputResult<()> {
    if !options.speed_kmh.is_finite() || options.speed_kmh <= 0.0 {
        return Err(InputError::InvalidSpeed(options.speed_kmh));
    }
    validate_coordinate("start", start.lat, start.lng)?;
    for waypoint in waypoints {
        validate_coordinate(&format!("waypoint {}", waypoint.id), waypoint.lat, waypoint.lng)?;
    }
    Ok(())
}

/// Greedy construction: nearest stop to `start` first, then repeatedly the
/// nearest unvisited stop to the last one.
pub fn nearest_neighbor_order<'a>(
    waypoints: &'a [Waypoint],
    start: &StartPoint,
) -> Vec<&'a Waypoint> {
    let mut pool: Vec<&Waypoint> = waypoints.iter().collect();
    let mut route = Vec::with_capacity(pool.len());
    let mut current = *start;

    while !pool.is_empty() {
        let idx = arg_min(&pool, |candidate| distance_km(&current, &candidate.coordinate()));
        let next = pool.remove(idx);
        current = next.coordinate();
        route.push(next);
    }

    route
}

/// Index of the first element minimizing `cost` (strict `<`). Falls back to
/// 0 when no cost compares below infinity, e.g. all NaN.
fn arg_min<T>(items: &[T], mut cost: impl FnMut(&T) -> f64) -> usize {
    let mut best = 0;
    let mut best_value = f64::INFINITY;
    for (i, item) in items.iter().enumerate() {
        let value = cost(item);
        if value < best_value {
            best = i;
            best_value = value;
        }
    }
    best
}

/// Path 2-opt that never moves `route[0]`. Returns the number of accepted swaps.
fn two_opt(route: &mut [&Waypoint], max_swaps: usize) -> usize {
    let n = route.len();
    if n < 4 {
        return 0;
    }

    fn dist(route: &[&Waypoint], i: usize, j: usize) -> f64 {
        distance_km(&route[i].coordinate(), &route[j].coordinate())
    }

    let mut swaps = 0;
    let mut improved = true;
    while improved && swaps < max_swaps {
        improved = false;
        for i in 0..n - 3 {
            if swaps >= max_swaps {
                break;
            }
            for k in i + 2..n - 1 {
                if swaps >= max_swaps {
                    break;
                }
                let current = dist(route, i, i + 1) + dist(route, k, k + 1);
                let swapped = dist(route, i, k) + dist(route, i + 1, k + 1);
                if swapped + TWO_OPT_EPSILON_KM < current {
                    route[i + 1..=k].reverse();
                    improved = true;
                    swaps += 1;
                }
            }
        }
    }

    swaps
}

/// Length of the walk `start -> route[0] -> route[1] -> ...` in kilometers (unrounded).
pub fn route_length_km<'a, I>(start: &StartPoint, route: I) -> f64
where
    I: IntoIterator<Item = &'a Waypoint>,
{
    let mut previous: Coordinate = *start;
    let mut total = 0.0;
    for waypoint in route {
        let here = waypoint.coordinate();
        total += distance_km(&previous, &here);
        previous = here;
    }
    total
}

fn estimate_minutes(total_km: f64, speed_kmh: f64) -> u64 {
    let minutes = (total_km / speed_kmh * 60.0).round();
    if minutes.is_finite() && minutes > 0.0 {
        minutes as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(id: &str, lat: f64, lng: f64) -> Waypoint {
        Waypoint::new(id, lat, lng)
    }

    #[test]
    fn empty_input_reports_method_and_zeroes() {
        let start = Coordinate::new(40.7128, -74.0060);
        let result = derive_route(&[], &start, &RouteOptions::default());

        assert!(result.route.is_empty());
        assert!(result.legs.is_empty());
        assert_eq!(result.total_distance_km, 0.0);
        assert_eq!(result.est_duration_min, 0);
        assert_eq!(result.method, ROUTE_METHOD);
        assert_eq!(result.start, start);
    }

    #[test]
    fn single_waypoint_has_one_leg_from_start() {
        let start = Coordinate::new(0.0, 0.0);
        let result = derive_route(&[wp("a", 0.01, 0.0)], &start, &RouteOptions::default());

        assert_eq!(result.route.len(), 1);
        assert_eq!(result.route[0].order, 1);
        assert_eq!(result.legs.len(), 1);
        assert_eq!(result.legs[0].from.id, crate::models::START_ID);
        assert_eq!(result.legs[0].to.id, "a");
        assert!((result.legs[0].distance_km - 1.11).abs() < 1e-9);
    }

    #[test]
    fn tie_goes_to_first_in_input_order() {
        let start = Coordinate::new(0.0, 0.0);
        let waypoints = vec![wp("east", 0.0, 0.01), wp("west", 0.0, -0.01)];
        let result = derive_route(&waypoints, &start, &RouteOptions::default());

        assert_eq!(result.ids(), vec!["east", "west"]);
    }

    #[test]
    fn arg_min_prefers_earliest_minimum() {
        let values = [3.0, 1.0, 1.0, 2.0];
        assert_eq!(arg_min(&values, |v| *v), 1);
        assert_eq!(arg_min(&[f64::NAN, f64::NAN], |v| *v), 0);
    }

    #[test]
    fn two_opt_untangles_crossing() {
        // Along a line: 0, 3, 2, 1, 4 -> reversal should restore 0,1,2,3,4
        let points = [
            wp("p0", 0.0, 0.000),
            wp("p3", 0.0, 0.003),
            wp("p2", 0.0, 0.002),
            wp("p1", 0.0, 0.001),
            wp("p4", 0.0, 0.004),
        ];
        let mut route: Vec<&Waypoint> = points.iter().collect();
        let swaps = two_opt(&mut route, 2000);

        let ids: Vec<&str> = route.iter().map(|w| w.id.as_str()).collect();
        assert!(swaps >= 1);
        assert_eq!(ids, vec!["p0", "p1", "p2", "p3", "p4"]);
    }

    #[test]
    fn two_opt_respects_zero_budget() {
        let points = [
            wp("p0", 0.0, 0.000),
            wp("p3", 0.0, 0.003),
            wp("p2", 0.0, 0.002),
            wp("p1", 0.0, 0.001),
            wp("p4", 0.0, 0.004),
        ];
        let mut route: Vec<&Waypoint> = points.iter().collect();
        assert_eq!(two_opt(&mut route, 0), 0);
        assert_eq!(route[1].id, "p3");
    }

    #[test]
    fn duration_uses_walking_speed() {
        let start = Coordinate::new(0.0, 0.0);
        let options = RouteOptions {
            speed_kmh: 5.0,
            max_swaps: 10,
        };
        let result = derive_route(&[wp("a", 0.0, 0.09)], &start, &options);
        // 0.09 deg of longitude at the equator is ~10.008 km -> ~120 minutes
        assert_eq!(result.est_duration_min, 120);
    }

    #[test]
    fn try_derive_route_rejects_nan_waypoint() {
        let start = Coordinate::new(0.0, 0.0);
        let err = try_derive_route(
            &[wp("ok", 0.0, 0.0), wp("bad", f64::NAN, 0.0)],
            &start,
            &RouteOptions::default(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn try_derive_route_rejects_non_positive_speed() {
        let start = Coordinate::new(0.0, 0.0);
        let options = RouteOptions {
            speed_kmh: 0.0,
            ..RouteOptions::default()
        };
        assert_eq!(
            try_derive_route(&[], &start, &options),
            Err(InputError::InvalidSpeed(0.0))
        );
    }
}
