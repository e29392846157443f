//! Core functionality for the baromotion agent.
//!
//! This module contains:
//! - Trailing-window aggregation of pressure readings
//! - Barometric altitude conversion
//! - The feature schema shared with the classifier model

pub mod altitude;
pub mod features;
pub mod windowing;

// Re-export commonly used types
pub use altitude::{pressure_to_altitude, STANDARD_SEA_LEVEL_HPA};
pub use features::FeatureVector;
pub use windowing::{WindowAggregator, WindowSample, DEFAULT_WINDOW_MS};
