//! Input validation errors for the checked entry points.

use thiserror::Error;

/// Rejected numeric input.
///
/// Only the `try_*` entry points produce these; the plain entry points keep
/// their no-throw contract and let non-finite values flow through.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{field} of {subject} is not finite ({value})")]
    NonFiniteCoordinate {
        subject: String,
        field: &'static str,
        value: f64,
    },

    #[error("{field} of {subject} is out of range ({value})")]
    CoordinateOutOfRange {
        subject: String,
        field: &'static str,
        value: f64,
    },

    #[error("walking speed must be finite and positive, got {0}")]
    InvalidSpeed(f64),

    #[error("GPS accuracy must be finite and non-negative, got {0}")]
    InvalidAccuracy(f64),

    #[error("pressure must be finite and positive, got {0} hPa")]
    InvalidPressure(f64),

    #[error("sea-level reference pressure is unusable ({0} hPa); recalibrate first")]
    InvalidReferencePressure(f64),
}

pub type InputResult<T> = Result<T, InputError>;

/// Check that a latitude/longitude pair is finite and inside WGS84 bounds.
pub fn validate_coordinate(subject: &str, lat: f64, lng: f64) -> InputResult<()> {
    for (field, value, limit) in [("lat", lat, 90.0), ("lng", lng, 180.0)] {
        if !value.is_finite() {
            return Err(InputError::NonFiniteCoordinate {
                subject: subject.to_string(),
                field,
                value,
            });
        }
        if value.abs() > limit {
            return Err(InputError::CoordinateOutOfRange {
                subject: subject.to_string(),
                field,
                value,
            });
        }
    }
    Ok(())
}
