//! Published direction events and the sinks that carry them.

use crate::core::windowing::WindowSample;
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Discrete vertical direction of the device carrier.
///
/// Ordinal encoding (`0=idle, 1=up, 2=down`) follows the model's class
/// order and is relied on by existing consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Idle,
    Up,
    Down,
}

impl Direction {
    /// Ordinal in model-class order.
    pub fn index(self) -> usize {
        match self {
            Direction::Idle => 0,
            Direction::Up => 1,
            Direction::Down => 2,
        }
    }

    /// Direction for a model class index, if valid.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Direction::Idle),
            1 => Some(Direction::Up),
            2 => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Idle => "idle",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One published classification cycle.
///
/// Metrics are rounded before publication (altitude and pressure to one
/// decimal place, rates to three) so consumers see stable values rather
/// than floating-point jitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionEvent {
    pub direction: Direction,
    /// Approximate altitude above sea level, meters
    pub altitude: f64,
    /// Average atmospheric pressure over the window, hPa
    pub pressure: f64,
    /// Speed of altitude change, meters per second
    pub altitude_rate: f64,
    /// Speed of pressure change, hPa per second
    pub pressure_rate: f64,
}

impl DirectionEvent {
    /// Assemble the published event from a classified window sample,
    /// applying the rounding contract.
    pub fn from_sample(direction: Direction, sample: &WindowSample) -> Self {
        Self {
            direction,
            altitude: round_to(sample.altitude, 1),
            pressure: round_to(sample.average_pressure, 1),
            altitude_rate: round_to(sample.altitude_rate, 3),
            pressure_rate: round_to(sample.pressure_rate, 3),
        }
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Destination for published events, invoked synchronously at the end
/// of each successful cycle.
pub trait EventSink: Send {
    fn publish(&mut self, event: &DirectionEvent);
}

/// Forwards events to in-process consumers over a channel.
pub struct ChannelSink {
    sender: Sender<DirectionEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<DirectionEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn publish(&mut self, event: &DirectionEvent) {
        if self.sender.send(event.clone()).is_err() {
            debug!("event consumer disconnected");
        }
    }
}

/// Appends events to a JSONL session file.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl EventSink for JsonlSink {
    fn publish(&mut self, event: &DirectionEvent) {
        match serde_json::to_string(event) {
            Ok(line) => {
                if writeln!(self.writer, "{line}").and_then(|_| self.writer.flush()).is_err() {
                    debug!("failed to append event to session file");
                }
            }
            Err(e) => debug!(error = %e, "failed to serialize event"),
        }
    }
}

/// Emits events into the log stream.
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&mut self, event: &DirectionEvent) {
        info!(
            direction = %event.direction,
            altitude = event.altitude,
            pressure = event.pressure,
            altitude_rate = event.altitude_rate,
            pressure_rate = event.pressure_rate,
            "direction event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(altitude: f64, pressure: f64, altitude_rate: f64, pressure_rate: f64) -> WindowSample {
        WindowSample {
            window_end_ms: 5000,
            average_pressure: pressure,
            min_pressure: pressure,
            max_pressure: pressure,
            altitude,
            pressure_rate,
            altitude_rate,
            reading_count: 1,
        }
    }

    #[test]
    fn test_rounding_contract() {
        assert_eq!(round_to(123.456, 1), 123.5);
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(round_to(-0.0005, 3), -0.001);
        assert_eq!(round_to(1013.25, 1), 1013.3);
    }

    #[test]
    fn test_event_is_rounded() {
        let event =
            DirectionEvent::from_sample(Direction::Up, &sample(123.456, 1013.267, 0.12345, -0.98765));
        assert_eq!(event.altitude, 123.5);
        assert_eq!(event.pressure, 1013.3);
        assert_eq!(event.altitude_rate, 0.123);
        assert_eq!(event.pressure_rate, -0.988);
    }

    #[test]
    fn test_direction_ordinals() {
        assert_eq!(Direction::Idle.index(), 0);
        assert_eq!(Direction::Up.index(), 1);
        assert_eq!(Direction::Down.index(), 2);
        assert_eq!(Direction::from_index(1), Some(Direction::Up));
        assert_eq!(Direction::from_index(3), None);
    }

    #[test]
    fn test_direction_serde_labels() {
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"up\"");
        assert_eq!(
            serde_json::from_str::<Direction>("\"down\"").unwrap(),
            Direction::Down
        );
    }

    #[test]
    fn test_channel_sink_delivers() {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut sink = ChannelSink::new(sender);
        let event = DirectionEvent::from_sample(Direction::Idle, &sample(0.0, 1013.25, 0.0, 0.0));
        sink.publish(&event);
        assert_eq!(receiver.try_recv().unwrap(), event);
    }

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let path = std::env::temp_dir().join(format!("baromotion-events-{}.jsonl", uuid::Uuid::new_v4()));
        let mut sink = JsonlSink::create(&path).unwrap();
        let event = DirectionEvent::from_sample(Direction::Down, &sample(10.0, 1012.0, -0.3, 0.035));
        sink.publish(&event);
        sink.publish(&event);
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        let back: DirectionEvent = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(back.direction, Direction::Down);

        std::fs::remove_file(path).unwrap();
    }
}
