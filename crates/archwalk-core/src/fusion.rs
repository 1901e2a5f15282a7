//! Multi-sensor position fusion for a single sensing session.
//!
//! GPS latitude/longitude and barometric altitude each run through their own
//! scalar Kalman filter (no cross-covariance). Accelerometer samples drive a
//! damped dead-reckoning offset from the last fused GPS position so short
//! GPS outages can be bridged.

use crate::barometer::{
    altitude_to_floor, pressure_to_altitude, sea_level_pressure_for, BAROMETRIC_SCALE_M,
    DEFAULT_FLOOR_HEIGHT_M, STANDARD_SEA_LEVEL_HPA,
};
use crate::clock::{Clock, SystemClock};
use crate::confidence::{calculate_position_confidence, SensorStatus};
use crate::error::{validate_coordinate, InputError, InputResult};
use crate::kalman::{KalmanFilter, KalmanTuning};
use crate::models::{Coordinate, SensorSample, Vector3};
use crate::motion::{magnetometer_heading, STANDARD_GRAVITY};
use crate::spatial::{meters_to_lat, meters_to_lng};
use serde::{Deserialize, Serialize};

/// Tunables for a [`PositionFusion`] session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub lat_tuning: KalmanTuning,
    pub lng_tuning: KalmanTuning,
    pub altitude_tuning: KalmanTuning,
    /// Start each filter at its first measurement instead of 0
    pub seed_filters_with_first_sample: bool,
    /// Sea-level reference before any calibration (hPa)
    pub sea_level_pressure_hpa: f64,
    pub floor_height_m: f64,
    /// GPS fixes better than this (meters) recalibrate ground altitude
    pub calibration_accuracy_m: f64,
    /// Horizontal acceleration below this (m/s²) is treated as noise
    pub horizontal_accel_threshold: f64,
    /// Vertical acceleration, after removing gravity, below this is noise
    pub vertical_accel_threshold: f64,
    pub gravity: f64,
    /// Per-update velocity decay factor
    pub velocity_damping: f64,
    /// GPS age after which the dead-reckoned position should be shown
    pub dead_reckoning_after_ms: u64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            lat_tuning: KalmanTuning::new(0.001, 0.01),
            lng_tuning: KalmanTuning::new(0.001, 0.01),
            altitude_tuning: KalmanTuning::new(0.01, 0.05),
            seed_filters_with_first_sample: true,
            sea_level_pressure_hpa: STANDARD_SEA_LEVEL_HPA,
            floor_height_m: DEFAULT_FLOOR_HEIGHT_M,
            calibration_accuracy_m: 20.0,
            horizontal_accel_threshold: 0.1,
            vertical_accel_threshold: 0.2,
            gravity: STANDARD_GRAVITY,
            velocity_damping: 0.9,
            dead_reckoning_after_ms: 5_000,
        }
    }
}

/// Smoothed barometric altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltitudeEstimate {
    pub altitude_m: f64,
    /// Altitude above the calibrated ground level
    pub relative_altitude_m: f64,
    pub floor: u32,
}

/// Position extrapolated from inertial data since the last GPS fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeadReckonedPosition {
    pub lat: f64,
    pub lng: f64,
    pub is_dead_reckoning: bool,
}

impl DeadReckonedPosition {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Result of feeding one [`SensorSample`] through [`PositionFusion::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FusionUpdate {
    Position(Coordinate),
    Altitude(AltitudeEstimate),
    DeadReckoned {
        position: Option<DeadReckonedPosition>,
    },
    Heading {
        degrees: f64,
    },
}

/// Per-session fusion state.
///
/// Owned by the session that created it; every update takes `&mut self`.
#[derive(Debug, Clone)]
pub struct PositionFusion<C: Clock = SystemClock> {
    config: FusionConfig,
    lat_filter: Option<KalmanFilter>,
    lng_filter: Option<KalmanFilter>,
    altitude_filter: Option<KalmanFilter>,

    // Dead reckoning
    last_position: Option<Coordinate>,
    velocity: Vector3,
    last_update_ms: i64,

    // Calibration
    sea_level_pressure_hpa: f64,
    ground_altitude_m: f64,
    calibrated: bool,

    // Sensor bookkeeping for confidence
    last_gps_ms: Option<i64>,
    last_gps_accuracy_m: Option<f64>,
    seen_barometer: bool,
    seen_imu: bool,

    clock: C,
}

impl PositionFusion<SystemClock> {
    pub fn new() -> Self {
        Self::with_config(FusionConfig::default())
    }

    pub fn with_config(config: FusionConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for PositionFusion<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PositionFusion<C> {
    pub fn with_clock(config: FusionConfig, clock: C) -> Self {
        let now = clock.now_ms();
        Self {
            sea_level_pressure_hpa: config.sea_level_pressure_hpa,
            config,
            lat_filter: None,
            lng_filter: None,
            altitude_filter: None,
            last_position: None,
            velocity: Vector3::ZERO,
            last_update_ms: now,
            ground_altitude_m: 0.0,
            calibrated: false,
            last_gps_ms: None,
            last_gps_accuracy_m: None,
            seen_barometer: false,
            seen_imu: false,
            clock,
        }
    }

    /// Fold in a GPS fix and return the fused coordinate.
    ///
    /// A fix more accurate than `calibration_accuracy_m` that carries an
    /// altitude becomes the session's ground level.
    pub fn update_gps(
        &mut self,
        lat: f64,
        lng: f64,
        altitude_m: Option<f64>,
        accuracy_m: f64,
    ) -> Coordinate {
        let seed = self.config.seed_filters_with_first_sample;
        let fused_lat = smooth(&mut self.lat_filter, &self.config.lat_tuning, seed, lat);
        let fused_lng = smooth(&mut self.lng_filter, &self.config.lng_tuning, seed, lng);

        if accuracy_m < self.config.calibration_accuracy_m {
            if let Some(altitude) = altitude_m.filter(|a| a.is_finite()) {
                self.ground_altitude_m = altitude;
                self.calibrated = true;
                tracing::debug!(altitude, accuracy_m, "ground altitude set from GPS fix");
            }
        }

        let now = self.clock.now_ms();
        let fused = Coordinate::new(fused_lat, fused_lng);
        self.last_position = Some(fused);
        self.last_update_ms = now;
        self.last_gps_ms = Some(now);
        self.last_gps_accuracy_m = Some(accuracy_m);

        tracing::trace!(lat = fused.lat, lng = fused.lng, accuracy_m, "gps update");
        fused
    }

    /// Validating wrapper around [`Self::update_gps`].
    pub fn try_update_gps(
        &mut self,
        lat: f64,
        lng: f64,
        altitude_m: Option<f64>,
        accuracy_m: f64,
    ) -> InputResult<Coordinate> {
        let checked = validate_gps(lat, lng, altitude_m, accuracy_m);
        if let Err(err) = &checked {
            tracing::warn!(error = %err, "rejected GPS fix");
        }
        checked.map(|()| self.update_gps(lat, lng, altitude_m, accuracy_m))
    }

    /// Fold in a pressure reading and return the smoothed altitude and floor.
    pub fn update_barometer(&mut self, pressure_hpa: f64) -> AltitudeEstimate {
        self.seen_barometer = true;

        let raw_altitude = pressure_to_altitude(pressure_hpa, self.sea_level_pressure_hpa);
        let altitude_m = smooth(
            &mut self.altitude_filter,
            &self.config.altitude_tuning,
            self.config.seed_filters_with_first_sample,
            raw_altitude,
        );
        let relative_altitude_m = altitude_m - self.ground_altitude_m;
        let floor =
            altitude_to_floor(altitude_m, self.ground_altitude_m, self.config.floor_height_m);

        tracing::trace!(pressure_hpa, altitude_m, floor, "barometer update");
        AltitudeEstimate {
            altitude_m,
            relative_altitude_m,
            floor,
        }
    }

    /// Validating wrapper around [`Self::update_barometer`].
    ///
    /// Also refuses to run while the sea-level reference is unusable (left
    /// behind by an unchecked [`Self::calibrate`]), so the altitude filter
    /// never absorbs a NaN.
    pub fn try_update_barometer(&mut self, pressure_hpa: f64) -> InputResult<AltitudeEstimate> {
        let checked = validate_pressure(pressure_hpa).and_then(|()| {
            let reference = self.sea_level_pressure_hpa;
            if reference.is_finite() && reference > 0.0 {
                Ok(())
            } else {
                Err(InputError::InvalidReferencePressure(reference))
            }
        });
        if let Err(err) = &checked {
            tracing::warn!(error = %err, "rejected barometer reading");
        }
        checked.map(|()| self.update_barometer(pressure_hpa))
    }

    /// Dead-reckon from the last GPS position.
    ///
    /// Returns `None` until a GPS fix has been applied. `rotation` is accepted
    /// for interface completeness; orientation is not modelled.
    pub fn update_imu(
        &mut self,
        acceleration: &Vector3,
        _rotation: &Vector3,
    ) -> Option<DeadReckonedPosition> {
        self.seen_imu = true;
        let base = self.last_position?;

        let dt = (self.clock.now_ms() - self.last_update_ms) as f64 / 1000.0;
        let filtered = self.reject_noise(acceleration);

        let damping = self.config.velocity_damping;
        self.velocity.x = (self.velocity.x + filtered.x * dt) * damping;
        self.velocity.y = (self.velocity.y + filtered.y * dt) * damping;
        self.velocity.z = (self.velocity.z + filtered.z * dt) * damping;

        // x is east, y is north in the device frame; orientation is ignored.
        let north_m = self.velocity.y * dt;
        let east_m = self.velocity.x * dt;
        let position = DeadReckonedPosition {
            lat: base.lat + meters_to_lat(north_m),
            lng: base.lng + meters_to_lng(east_m, base.lat),
            is_dead_reckoning: true,
        };

        tracing::trace!(dt, north_m, east_m, "imu dead reckoning");
        Some(position)
    }

    /// High-pass each axis: drop readings inside the noise band, remove gravity from z.
    fn reject_noise(&self, acceleration: &Vector3) -> Vector3 {
        let horizontal = |value: f64| {
            if value.abs() > self.config.horizontal_accel_threshold {
                value
            } else {
                0.0
            }
        };
        let vertical = acceleration.z - self.config.gravity;

        Vector3 {
            x: horizontal(acceleration.x),
            y: horizontal(acceleration.y),
            z: if vertical.abs() > self.config.vertical_accel_threshold {
                vertical
            } else {
                0.0
            },
        }
    }

    /// Solve for the sea-level pressure that makes `pressure_hpa` read as
    /// `gps_altitude_m`, and treat that altitude as ground level.
    pub fn calibrate(&mut self, gps_altitude_m: f64, pressure_hpa: f64) {
        self.sea_level_pressure_hpa = sea_level_pressure_for(gps_altitude_m, pressure_hpa);
        self.ground_altitude_m = gps_altitude_m;
        self.calibrated = true;
        tracing::debug!(
            sea_level_pressure_hpa = self.sea_level_pressure_hpa,
            ground_altitude_m = gps_altitude_m,
            "barometer calibrated"
        );
    }

    /// Validating wrapper around [`Self::calibrate`].
    ///
    /// The altitude must be finite and below the barometric scale height
    /// (44 330 m), the pressure finite and positive.
    pub fn try_calibrate(&mut self, gps_altitude_m: f64, pressure_hpa: f64) -> InputResult<()> {
        let checked = validate_calibration_altitude(gps_altitude_m)
            .and_then(|()| validate_pressure(pressure_hpa));
        if let Err(err) = &checked {
            tracing::warn!(error = %err, "rejected calibration");
        }
        checked.map(|()| self.calibrate(gps_altitude_m, pressure_hpa))
    }

    /// Dispatch a raw sample to the matching update.
    pub fn apply(&mut self, sample: &SensorSample) -> FusionUpdate {
        match sample {
            SensorSample::Gps(gps) => FusionUpdate::Position(self.update_gps(
                gps.lat,
                gps.lng,
                gps.altitude_m,
                gps.accuracy_m,
            )),
            SensorSample::Barometer(baro) => {
                FusionUpdate::Altitude(self.update_barometer(baro.pressure_hpa))
            }
            SensorSample::Imu(imu) => FusionUpdate::DeadReckoned {
                position: self.update_imu(&imu.acceleration, &imu.rotation),
            },
            SensorSample::Magnetometer(mag) => FusionUpdate::Heading {
                degrees: magnetometer_heading(mag.x, mag.y),
            },
        }
    }

    /// Last fused GPS position, `None` before the first fix.
    pub fn current_position(&self) -> Option<Coordinate> {
        self.last_position
    }

    pub fn ground_altitude_m(&self) -> f64 {
        self.ground_altitude_m
    }

    pub fn sea_level_pressure_hpa(&self) -> f64 {
        self.sea_level_pressure_hpa
    }

    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    /// Whether ground level came from a good GPS fix or [`Self::calibrate`].
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Milliseconds since the last GPS fix, `None` before the first one.
    pub fn time_since_last_gps_ms(&self) -> Option<u64> {
        self.last_gps_ms
            .map(|at| self.clock.now_ms().saturating_sub(at).max(0) as u64)
    }

    /// True once GPS has gone quiet for longer than `dead_reckoning_after_ms`.
    pub fn prefers_dead_reckoning(&self) -> bool {
        self.time_since_last_gps_ms()
            .is_some_and(|age| age > self.config.dead_reckoning_after_ms)
    }

    /// Sensors feeding this session, as of now.
    pub fn sensor_status(&self) -> SensorStatus {
        SensorStatus {
            has_gps: self.last_position.is_some(),
            gps_accuracy_m: self
                .last_gps_accuracy_m
                .unwrap_or(SensorStatus::default().gps_accuracy_m),
            has_barometer: self.seen_barometer,
            has_imu: self.seen_imu,
            time_since_last_gps_ms: self.time_since_last_gps_ms().unwrap_or(0),
        }
    }

    pub fn confidence(&self) -> u8 {
        calculate_position_confidence(&self.sensor_status())
    }
}

fn smooth(
    slot: &mut Option<KalmanFilter>,
    tuning: &KalmanTuning,
    seed: bool,
    measurement: f64,
) -> f64 {
    slot.get_or_insert_with(|| tuning.build(if seed { measurement } else { 0.0 }))
        .update(measurement)
}

fn validate_gps(lat: f64, lng: f64, altitude_m: Option<f64>, accuracy_m: f64) -> InputResult<()> {
    validate_coordinate("gps fix", lat, lng)?;
    if let Some(altitude) = altitude_m.filter(|a| !a.is_finite()) {
        return Err(InputError::NonFiniteCoordinate {
            subject: "gps fix".to_string(),
            field: "altitude",
            value: altitude,
        });
    }
    if !accuracy_m.is_finite() || accuracy_m < 0.0 {
        return Err(InputError::InvalidAccuracy(accuracy_m));
    }
    Ok(())
}

fn validate_pressure(pressure_hpa: f64) -> InputResult<()> {
    if pressure_hpa.is_finite() && pressure_hpa > 0.0 {
        Ok(())
    } else {
        Err(InputError::InvalidPressure(pressure_hpa))
    }
}

fn validate_calibration_altitude(altitude_m: f64) -> InputResult<()> {
    if !altitude_m.is_finite() {
        return Err(InputError::NonFiniteCoordinate {
            subject: "calibration".to_string(),
            field: "altitude",
            value: altitude_m,
        });
    }
    if altitude_m >= BAROMETRIC_SCALE_M {
        return Err(InputError::CoordinateOutOfRange {
            subject: "calibration".to_string(),
            field: "altitude",
            value: altitude_m,
        });
    }
    Ok(())
}
