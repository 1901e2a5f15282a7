//! Heuristic confidence score for a fused position.

use serde::{Deserialize, Serialize};

const BAROMETER_POINTS: i64 = 30;
const IMU_POINTS: i64 = 20;
const MAX_STALE_PENALTY: i64 = 30;

/// Snapshot of which sensors are feeding the estimate and how fresh GPS is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorStatus {
    pub has_gps: bool,
    /// Horizontal accuracy of the last fix in meters
    pub gps_accuracy_m: f64,
    pub has_barometer: bool,
    pub has_imu: bool,
    pub time_since_last_gps_ms: u64,
}

impl Default for SensorStatus {
    fn default() -> Self {
        Self {
            has_gps: false,
            gps_accuracy_m: 100.0,
            has_barometer: false,
            has_imu: false,
            time_since_last_gps_ms: 0,
        }
    }
}

/// Score in `0..=100`.
///
/// GPS contributes up to 50 points by accuracy tier, a barometer 30 and an
/// IMU 20. One point is lost per whole second since the last GPS fix, at
/// most 30.
pub fn calculate_position_confidence(status: &SensorStatus) -> u8 {
    let mut score: i64 = 0;

    if status.has_gps {
        score += gps_points(status.gps_accuracy_m);
    }
    if status.has_barometer {
        score += BAROMETER_POINTS;
    }
    if status.has_imu {
        score += IMU_POINTS;
    }

    let stale_secs = (status.time_since_last_gps_ms / 1000).min(MAX_STALE_PENALTY as u64);
    score -= stale_secs as i64;

    score.clamp(0, 100) as u8
}

fn gps_points(accuracy_m: f64) -> i64 {
    if accuracy_m < 10.0 {
        50
    } else if accuracy_m < 20.0 {
        40
    } else if accuracy_m < 50.0 {
        30
    } else {
        20
    }
}
