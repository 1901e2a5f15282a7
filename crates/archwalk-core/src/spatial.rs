//! Spatial math for walking distances and small local offsets.

use crate::models::Coordinate;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Flat-Earth scale used for dead reckoning: meters per degree of latitude.
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Calculate great-circle distance between two points in kilometers (Haversine formula).
///
/// # Arguments
/// * `lat1`, `lng1` - First point coordinates in decimal degrees
/// * `lat2`, `lng2` - Second point coordinates in decimal degrees
///
/// The intermediate `sqrt(h)` is clamped to 1.0 before `asin`; rounding can
/// push it marginally above 1 for near-antipodal points.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lng2 - lng1).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Haversine distance between two coordinates in kilometers.
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    haversine_km(a.lat, a.lng, b.lat, b.lng)
}

/// Round to two decimal places (the precision reported for distances).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_deg(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Initial great-circle bearing from `from` to `to`, degrees clockwise from north.
pub fn initial_bearing_deg(from: &Coordinate, to: &Coordinate) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let dlambda = (to.lng - from.lng).to_radians();
    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    normalize_deg(y.atan2(x).to_degrees())
}

/// Direction of a target relative to where the device points, in `[0, 360)`.
///
/// 0 means straight ahead, 90 means to the right.
pub fn relative_bearing_deg(bearing_deg: f64, heading_deg: f64) -> f64 {
    normalize_deg(bearing_deg - heading_deg)
}

/// Human-readable walking distance: whole meters below 1 km, then km with
/// two decimals below 10 km and one above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        return format!("{} m", meters.round());
    }
    let km = meters / 1000.0;
    if km < 10.0 {
        format!("{km:.2} km")
    } else {
        format!("{km:.1} km")
    }
}

// ==== Flat-Earth conversion ====
// Good enough for the few meters a walker covers between GPS fixes.

/// Meters per degree of longitude at a given latitude.
pub fn meters_per_deg_lng(lat_deg: f64) -> f64 {
    METERS_PER_DEG_LAT * lat_deg.to_radians().cos()
}

/// Convert a north/south offset in meters to degrees latitude.
pub fn meters_to_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

/// Convert an east/west offset in meters to degrees longitude at `ref_lat_deg`.
pub fn meters_to_lng(meters: f64, ref_lat_deg: f64) -> f64 {
    meters / meters_per_deg_lng(ref_lat_deg)
}

/// Offset a position by meters in the north and east directions.
///
/// # Returns
/// The shifted coordinate in degrees
pub fn offset_position(origin: &Coordinate, north_m: f64, east_m: f64) -> Coordinate {
    Coordinate::new(
        origin.lat + meters_to_lat(north_m),
        origin.lng + meters_to_lng(east_m, origin.lat),
    )
}
