//! Walking-tour route ordering and multi-sensor position fusion.
//!
//! Two independent components:
//! - [`route_engine`]: orders points of interest into a short walk from the
//!   user's position (nearest neighbor + 2-opt over haversine distances).
//! - [`fusion`]: a per-session tracker combining GPS, barometer and IMU
//!   readings through scalar Kalman filters and dead reckoning.

pub mod barometer;
pub mod clock;
pub mod confidence;
pub mod error;
pub mod fusion;
pub mod kalman;
pub mod models;
pub mod motion;
pub mod route_engine;
pub mod spatial;

pub use barometer::{altitude_to_floor, pressure_to_altitude, sea_level_pressure_for};
pub use clock::{Clock, ManualClock, SystemClock};
pub use confidence::{calculate_position_confidence, SensorStatus};
pub use error::{InputError, InputResult};
pub use fusion::{
    AltitudeEstimate, DeadReckonedPosition, FusionConfig, FusionUpdate, PositionFusion,
};
pub use kalman::{KalmanFilter, KalmanTuning};
pub use models::{
    BarometerSample, Coordinate, GpsSample, ImuSample, LegEndpoint, MagnetometerSample,
    OrderedWaypoint, RouteLeg, RouteResult, SensorSample, StartPoint, TimedSample, Vector3,
    Waypoint,
};
pub use motion::{detect_movement_type, magnetometer_heading, MovementType};
pub use route_engine::{derive_route, try_derive_route, RouteOptions, ROUTE_METHOD};
pub use spatial::{
    format_distance, haversine_km, initial_bearing_deg, normalize_deg, relative_bearing_deg,
};
