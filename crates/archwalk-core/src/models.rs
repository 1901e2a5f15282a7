//! Core data models for route derivation and sensor fusion.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Synthetic id given to the walker's start point when it appears in a leg.
pub const START_ID: &str = "__user__";

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude", alias = "lon")]
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Where the walker stands when the route is computed.
pub type StartPoint = Coordinate;

/// A point of interest to visit (a building, in practice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude", alias = "lon")]
    pub lng: f64,
    /// Caller attributes carried through to the ordered route untouched.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Waypoint {
    /// Create a waypoint with only the required fields.
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            lat,
            lng,
            attributes: Map::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// A waypoint tagged with its 1-based position in the walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedWaypoint {
    pub order: usize,
    #[serde(flatten)]
    pub waypoint: Waypoint,
}

/// One end of a route leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegEndpoint {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
}

impl LegEndpoint {
    pub fn from_start(start: &StartPoint) -> Self {
        Self {
            id: START_ID.to_string(),
            lat: start.lat,
            lng: start.lng,
        }
    }

    pub fn from_waypoint(waypoint: &Waypoint) -> Self {
        Self {
            id: waypoint.id.clone(),
            lat: waypoint.lat,
            lng: waypoint.lng,
        }
    }
}

/// A single walking segment between two stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub from: LegEndpoint,
    pub to: LegEndpoint,
    /// Great-circle distance rounded to 2 decimals
    pub distance_km: f64,
}

/// Output of [`crate::route_engine::derive_route`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub start: StartPoint,
    pub route: Vec<OrderedWaypoint>,
    pub legs: Vec<RouteLeg>,
    pub total_distance_km: f64,
    pub est_duration_min: u64,
    pub method: String,
    /// Accepted 2-opt reversals
    #[serde(default)]
    pub swaps_applied: usize,
}

impl RouteResult {
    /// Waypoint ids in visiting order.
    pub fn ids(&self) -> Vec<&str> {
        self.route.iter().map(|stop| stop.waypoint.id.as_str()).collect()
    }
}

// ==== Sensor samples ====

/// Three-axis reading in device coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude", alias = "lon")]
    pub lng: f64,
    #[serde(default)]
    pub altitude_m: Option<f64>,
    /// Horizontal accuracy radius in meters
    pub accuracy_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarometerSample {
    pub pressure_hpa: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    /// m/s², gravity included
    pub acceleration: Vector3,
    /// Gyroscope rates; accepted but not used numerically
    #[serde(default)]
    pub rotation: Vector3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetometerSample {
    pub x: f64,
    pub y: f64,
}

/// A raw reading forwarded by the sensor layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SensorSample {
    Gps(GpsSample),
    Barometer(BarometerSample),
    Imu(ImuSample),
    Magnetometer(MagnetometerSample),
}

/// A sensor sample stamped with the time it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedSample {
    pub timestamp_ms: i64,
    #[serde(flatten)]
    pub sample: SensorSample,
}
