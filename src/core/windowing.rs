//! Trailing-window aggregation of pressure readings.
//!
//! Each incoming reading triggers a recompute over the trailing window
//! (default 5 seconds). The window mean is converted to altitude and
//! differenced against the previous cycle to produce rates of change.

use crate::core::altitude::pressure_to_altitude;
use crate::source::types::RawReading;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Default trailing window width in milliseconds.
pub const DEFAULT_WINDOW_MS: u64 = 5000;

/// Aggregated statistics for one trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSample {
    /// End of the window (the trigger timestamp), milliseconds
    pub window_end_ms: i64,
    /// Arithmetic mean pressure across the window, hPa
    pub average_pressure: f64,
    /// Lowest pressure in the window, hPa
    pub min_pressure: f64,
    /// Highest pressure in the window, hPa
    pub max_pressure: f64,
    /// Altitude derived from the average pressure, meters
    pub altitude: f64,
    /// Change in average pressure since the previous window, hPa per second
    pub pressure_rate: f64,
    /// Change in derived altitude since the previous window, meters per second
    pub altitude_rate: f64,
    /// Number of readings that fell inside the window
    pub reading_count: usize,
}

/// Converts an irregular stream of readings into periodic window samples.
///
/// Holds the trailing reading buffer and the previous cycle's averages.
/// Callers deliver readings serially; there is no internal locking.
pub struct WindowAggregator {
    window_ms: u64,
    readings: VecDeque<RawReading>,
    /// Previous cycle's (average_pressure, altitude); None before the
    /// first window, which pins both rates to zero.
    previous: Option<(f64, f64)>,
}

impl WindowAggregator {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            readings: VecDeque::new(),
            previous: None,
        }
    }

    /// The configured window width in milliseconds.
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Buffer a reading without triggering a recompute.
    pub fn push(&mut self, reading: RawReading) {
        self.readings.push_back(reading);
    }

    /// Buffer a reading and immediately recompute the window ending at
    /// its timestamp. This is the normal per-reading trigger path.
    pub fn on_reading(&mut self, reading: RawReading) -> Option<WindowSample> {
        self.push(reading);
        self.trigger(reading.timestamp_ms)
    }

    /// Recompute window statistics over `[now_ms - window_ms, now_ms]`.
    ///
    /// An empty window skips the cycle: no sample is produced and the
    /// previous-cycle state is left untouched. On success the
    /// previous-cycle state advances unconditionally, independent of
    /// whatever downstream does with the sample.
    pub fn trigger(&mut self, now_ms: i64) -> Option<WindowSample> {
        let window_start = now_ms - self.window_ms as i64;
        self.readings.retain(|r| r.timestamp_ms >= window_start);

        let pressures: Vec<f64> = self
            .readings
            .iter()
            .filter(|r| r.timestamp_ms <= now_ms)
            .map(|r| r.pressure_hpa)
            .collect();
        if pressures.is_empty() {
            return None;
        }

        let average_pressure = pressures.iter().mean();
        let min_pressure = pressures.iter().copied().fold(f64::INFINITY, f64::min);
        let max_pressure = pressures.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let altitude = pressure_to_altitude(average_pressure);

        let window_secs = self.window_ms as f64 / 1000.0;
        let (pressure_rate, altitude_rate) = match self.previous {
            Some((prev_pressure, prev_altitude)) => (
                (average_pressure - prev_pressure) / window_secs,
                (altitude - prev_altitude) / window_secs,
            ),
            None => (0.0, 0.0),
        };

        self.previous = Some((average_pressure, altitude));

        Some(WindowSample {
            window_end_ms: now_ms,
            average_pressure,
            min_pressure,
            max_pressure,
            altitude,
            pressure_rate,
            altitude_rate,
            reading_count: pressures.len(),
        })
    }
}
