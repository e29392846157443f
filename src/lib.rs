//! Baromotion - barometric vertical-motion sensing agent.
//!
//! This library infers whether a mobile device's carrier is moving
//! vertically (ascending, descending, or stationary indoors) from a
//! noisy atmospheric-pressure stream, and publishes discrete direction
//! events with derived altitude and speed metrics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Baromotion Agent                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Source    │──▶│  Windowing  │──▶│ Classifier  │       │
//! │  │(replay/sim) │   │  (5s mean)  │   │ (direction) │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                                    │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │  Run Stats  │                     │  Direction  │       │
//! │  │             │                     │   Events    │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each raw reading triggers a recompute of the trailing window's mean
//! pressure, which is converted to altitude and differenced against the
//! previous cycle to produce rates of change. The rates feed a trained
//! model that labels the motion `idle`, `up`, or `down`; the label and
//! rounded metrics are published to configured sinks.
//!
//! # Example
//!
//! ```no_run
//! use baromotion::{
//!     classifier::StaticModelProvider,
//!     pipeline::{Pipeline, PipelineOptions},
//!     source::{SimProfile, SimulatedSource},
//!     stats::create_shared_stats,
//! };
//!
//! let mut source = SimulatedSource::new(SimProfile::default());
//! let readings = source.receiver().clone();
//! source.start().expect("failed to start source");
//!
//! let handle = Pipeline::start(
//!     PipelineOptions::default(),
//!     readings,
//!     Box::new(StaticModelProvider::builtin()),
//!     Vec::new(),
//!     create_shared_stats(),
//! );
//!
//! // Current direction and metrics can be read from handle.state()
//! ```

pub mod classifier;
pub mod config;
pub mod core;
pub mod event;
pub mod pipeline;
pub mod source;
pub mod stats;

// Re-export key types at crate root for convenience
pub use classifier::{
    CentroidModel, ClassifierModel, DirectionClassifier, FileModelProvider, ModelProvider,
    StaticModelProvider,
};
pub use config::Config;
pub use core::{FeatureVector, WindowAggregator, WindowSample, DEFAULT_WINDOW_MS};
pub use event::{ChannelSink, Direction, DirectionEvent, EventSink, JsonlSink, LogSink};
pub use pipeline::{Pipeline, PipelineHandle, PipelineOptions, PipelineState, StateSnapshot};
pub use source::{RawReading, ReplaySource, SimProfile, SimulatedSource};
pub use stats::{RunStats, RunStatsSnapshot, SharedRunStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
