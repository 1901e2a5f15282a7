//! Scalar Kalman filter for slowly varying quantities.

use serde::{Deserialize, Serialize};

/// Initial estimation error covariance of a fresh filter.
const INITIAL_ERROR_COVARIANCE: f64 = 1.0;

/// One-dimensional Kalman filter with a static state model and no control input.
///
/// Suits quantities that are roughly constant between updates (a walker's
/// latitude over a fraction of a second, building altitude). The process
/// noise `Q` says how much the true value may wander between updates; the
/// measurement noise `R` says how far a single reading may be off.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanFilter {
    process_noise: f64,
    measurement_noise: f64,
    estimate: f64,
    error_covariance: f64,
}

/// Noise pair used to build a [`KalmanFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KalmanTuning {
    /// Q
    pub process_noise: f64,
    /// R
    pub measurement_noise: f64,
}

impl KalmanTuning {
    pub const fn new(process_noise: f64, measurement_noise: f64) -> Self {
        Self {
            process_noise,
            measurement_noise,
        }
    }

    pub fn build(&self, initial_estimate: f64) -> KalmanFilter {
        KalmanFilter::new(self.process_noise, self.measurement_noise, initial_estimate)
    }
}

impl KalmanFilter {
    pub fn new(process_noise: f64, measurement_noise: f64, initial_estimate: f64) -> Self {
        Self {
            process_noise,
            measurement_noise,
            estimate: initial_estimate,
            error_covariance: INITIAL_ERROR_COVARIANCE,
        }
    }

    /// Fold in one measurement and return the new estimate.
    pub fn update(&mut self, measurement: f64) -> f64 {
        let predicted = self.error_covariance + self.process_noise;
        let gain = predicted / (predicted + self.measurement_noise);
        self.estimate += gain * (measurement - self.estimate);
        self.error_covariance = (1.0 - gain) * predicted;
        self.estimate
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    pub fn error_covariance(&self) -> f64 {
        self.error_covariance
    }

    pub fn process_noise(&self) -> f64 {
        self.process_noise
    }

    pub fn measurement_noise(&self) -> f64 {
        self.measurement_noise
    }
}
