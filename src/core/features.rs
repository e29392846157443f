//! Feature schema shared with the classifier model artifact.
//!
//! The model was trained against a fixed 3-attribute schema; the names,
//! order, and class labels here are a binding contract with that
//! artifact and must not drift.

use crate::core::windowing::WindowSample;
use serde::{Deserialize, Serialize};

/// Name of the altitude-speed attribute in the model schema.
pub const ATTR_ALTITUDE_SPEED: &str = "current_speed";
/// Name of the pressure-speed attribute in the model schema.
pub const ATTR_PRESSURE_SPEED: &str = "current_pressure_speed";
/// Name of the class attribute in the model schema.
pub const ATTR_CLASS: &str = "class";
/// Nominal class labels in model-training order.
pub const CLASS_LABELS: [&str; 3] = ["idle", "up", "down"];

/// The two scalar features handed to the direction model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Speed of altitude change, meters per second
    pub altitude_rate: f64,
    /// Speed of pressure change, hPa per second
    pub pressure_rate: f64,
}

impl FeatureVector {
    pub fn new(altitude_rate: f64, pressure_rate: f64) -> Self {
        Self {
            altitude_rate,
            pressure_rate,
        }
    }

    /// Extract the model features from a window sample.
    pub fn from_sample(sample: &WindowSample) -> Self {
        Self::new(sample.altitude_rate, sample.pressure_rate)
    }

    /// The features in model attribute order.
    pub fn as_array(&self) -> [f64; 2] {
        [self.altitude_rate, self.pressure_rate]
    }

    /// Whether both features are usable numbers.
    pub fn is_finite(&self) -> bool {
        self.altitude_rate.is_finite() && self.pressure_rate.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_order_matches_schema() {
        // current_speed first, current_pressure_speed second.
        let features = FeatureVector::new(1.5, -0.2);
        assert_eq!(features.as_array(), [1.5, -0.2]);
    }

    #[test]
    fn test_non_finite_detection() {
        assert!(FeatureVector::new(0.0, 0.0).is_finite());
        assert!(!FeatureVector::new(f64::NAN, 0.0).is_finite());
        assert!(!FeatureVector::new(0.0, f64::INFINITY).is_finite());
    }
}
