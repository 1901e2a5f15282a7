//! Movement classification and compass heading from raw sensor readings.

use crate::models::Vector3;
use crate::spatial::normalize_deg;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard gravity in m/s².
pub const STANDARD_GRAVITY: f64 = 9.81;

const STATIONARY_BELOW: f64 = 0.1;
const WALKING_BELOW: f64 = 0.5;
const RUNNING_BELOW: f64 = 2.0;
const ELEVATOR_ABOVE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Stationary,
    Walking,
    Running,
    /// Sudden large vertical acceleration
    Elevator,
    Unknown,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Stationary => "stationary",
            MovementType::Walking => "walking",
            MovementType::Running => "running",
            MovementType::Elevator => "elevator",
            MovementType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket an accelerometer sample by how far its magnitude departs from 1 g.
///
/// Deviations in `[2.0, 5.0]` m/s² (and non-finite input) are `Unknown`.
pub fn detect_movement_type(acceleration: &Vector3) -> MovementType {
    let deviation = (acceleration.magnitude() - STANDARD_GRAVITY).abs();

    if deviation < STATIONARY_BELOW {
        MovementType::Stationary
    } else if deviation < WALKING_BELOW {
        MovementType::Walking
    } else if deviation < RUNNING_BELOW {
        MovementType::Running
    } else if deviation > ELEVATOR_ABOVE {
        MovementType::Elevator
    } else {
        MovementType::Unknown
    }
}

/// Compass heading in degrees `[0, 360)` from the horizontal magnetometer axes.
pub fn magnetometer_heading(x: f64, y: f64) -> f64 {
    normalize_deg(90.0 - y.atan2(x).to_degrees())
}
