//! Barometric altitude conversion.

/// Standard atmospheric pressure at sea level, hPa.
pub const STANDARD_SEA_LEVEL_HPA: f64 = 1013.25;

/// Convert an atmospheric pressure to altitude above sea level in meters
/// using the international barometric formula against the standard
/// sea-level reference:
///
/// ```text
/// h = 44330 * (1 - (p / p0)^(1/5.255))
/// ```
///
/// The same formula mobile sensor stacks use, so altitudes line up with
/// what carriers of consumer devices see.
pub fn pressure_to_altitude(pressure_hpa: f64) -> f64 {
    44_330.0 * (1.0 - (pressure_hpa / STANDARD_SEA_LEVEL_HPA).powf(1.0 / 5.255))
}
