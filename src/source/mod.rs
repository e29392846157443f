//! Pressure data sources for the baromotion agent.
//!
//! The live barometer belongs to the host platform and is out of scope
//! here; these sources stand behind the same channel interface the
//! pipeline consumes, so recorded sessions can be replayed and synthetic
//! elevator rides can be generated for development and tests.

pub mod replay;
pub mod sim;
pub mod types;

// Re-export commonly used types
pub use replay::ReplaySource;
pub use sim::{SimProfile, SimulatedSource};
pub use types::RawReading;

use thiserror::Error;

/// Errors that can occur while running a pressure source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source is already running")]
    AlreadyRunning,
    #[error("failed to open recording: {0}")]
    Io(#[from] std::io::Error),
}
