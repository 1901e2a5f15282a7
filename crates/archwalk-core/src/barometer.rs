//! Barometric altitude and floor estimation.

/// Standard atmosphere sea-level pressure in hPa.
pub const STANDARD_SEA_LEVEL_HPA: f64 = 1013.25;

/// Typical storey height used to turn relative altitude into a floor index.
pub const DEFAULT_FLOOR_HEIGHT_M: f64 = 3.5;

/// Altitude at which the barometric formula reaches zero pressure.
pub const BAROMETRIC_SCALE_M: f64 = 44_330.0;
const BAROMETRIC_EXPONENT: f64 = 5.255;

/// Convert pressure to altitude with the international barometric formula.
///
/// `h = 44330 * (1 - (P / P0)^(1 / 5.255))`
pub fn pressure_to_altitude(pressure_hpa: f64, sea_level_hpa: f64) -> f64 {
    BAROMETRIC_SCALE_M * (1.0 - (pressure_hpa / sea_level_hpa).powf(1.0 / BAROMETRIC_EXPONENT))
}

/// Invert [`pressure_to_altitude`]: the sea-level pressure at which
/// `pressure_hpa` reads as `altitude_m`.
pub fn sea_level_pressure_for(altitude_m: f64, pressure_hpa: f64) -> f64 {
    pressure_hpa / (1.0 - altitude_m / BAROMETRIC_SCALE_M).powf(BAROMETRIC_EXPONENT)
}

/// Floor index (0 = ground) for an altitude relative to the building's ground level.
///
/// Never negative; below-ground and non-finite inputs map to 0.
pub fn altitude_to_floor(altitude_m: f64, ground_altitude_m: f64, floor_height_m: f64) -> u32 {
    let floors = ((altitude_m - ground_altitude_m) / floor_height_m).floor();
    if floors.is_nan() || floors <= 0.0 {
        0
    } else {
        floors as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pressure_is_sea_level() {
        let h = pressure_to_altitude(STANDARD_SEA_LEVEL_HPA, STANDARD_SEA_LEVEL_HPA);
        assert!(h.abs() < 1e-9);
    }

    #[test]
    fn lower_pressure_is_higher() {
        let low = pressure_to_altitude(1000.0, STANDARD_SEA_LEVEL_HPA);
        let high = pressure_to_altitude(900.0, STANDARD_SEA_LEVEL_HPA);
        assert!(high > low);
        // ~111 m at 1000 hPa
        assert!((low - 110.9).abs() < 1.0, "got {low}");
    }

    #[test]
    fn sea_level_inversion_round_trips() {
        for (altitude, pressure) in [(10.0, 1012.0), (250.0, 985.3), (-20.0, 1015.0)] {
            let p0 = sea_level_pressure_for(altitude, pressure);
            let back = pressure_to_altitude(pressure, p0);
            assert!((back - altitude).abs() < 1e-6, "{altitude} -> {back}");
        }
    }

    #[test]
    fn floor_from_relative_altitude() {
        assert_eq!(altitude_to_floor(10.0, 10.0, 3.5), 0);
        assert_eq!(altitude_to_floor(13.4, 10.0, 3.5), 0);
        assert_eq!(altitude_to_floor(13.5, 10.0, 3.5), 1);
        assert_eq!(altitude_to_floor(45.0, 10.0, 3.5), 10);
    }

    #[test]
    fn floor_is_never_negative() {
        assert_eq!(altitude_to_floor(-50.0, 0.0, 3.5), 0);
        assert_eq!(altitude_to_floor(f64::NAN, 0.0, 3.5), 0);
    }

    #[test]
    fn floor_is_monotonic_in_altitude() {
        let mut previous = 0;
        for step in -100..400 {
            let floor = altitude_to_floor(step as f64 * 0.25, 0.0, DEFAULT_FLOOR_HEIGHT_M);
            assert!(floor >= previous);
            previous = floor;
        }
    }
}
