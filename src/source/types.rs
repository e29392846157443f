//! Reading types for the barometric data sources.

use serde::{Deserialize, Serialize};

/// A single timestamped atmospheric pressure reading.
///
/// Timestamps are monotonic milliseconds as delivered by the underlying
/// sensor stream; sources are expected to deliver readings in
/// non-decreasing timestamp order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Monotonic timestamp in milliseconds
    pub timestamp_ms: i64,
    /// Atmospheric pressure in hPa
    pub pressure_hpa: f64,
}

impl RawReading {
    pub fn new(timestamp_ms: i64, pressure_hpa: f64) -> Self {
        Self {
            timestamp_ms,
            pressure_hpa,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_roundtrip() {
        let reading = RawReading::new(5000, 1013.25);
        let json = serde_json::to_string(&reading).unwrap();
        let back: RawReading = serde_json::from_str(&json).unwrap();
        assert_eq!(reading, back);
    }
}
