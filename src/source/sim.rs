//! Synthetic elevator-ride pressure source.
//!
//! Generates a ride profile (idle, ascend, idle, descend, idle) as a
//! ~1 Hz pressure stream with a small deterministic noise component, the
//! sampling cadence the original deployment used to save battery.

use crate::core::altitude::STANDARD_SEA_LEVEL_HPA;
use crate::source::types::RawReading;
use crate::source::SourceError;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// Shape of the simulated ride.
#[derive(Debug, Clone)]
pub struct SimProfile {
    /// Total simulated duration in seconds
    pub duration_secs: u64,
    /// Milliseconds between emitted readings
    pub sample_interval_ms: u64,
    /// Vertical speed during the moving phases, meters per second
    pub vertical_speed_mps: f64,
    /// Peak-to-peak sensor noise in hPa
    pub noise_hpa: f64,
    /// Seed for the deterministic noise generator
    pub seed: u64,
    /// Emit readings paced to wall-clock time instead of as fast as possible
    pub realtime: bool,
}

impl Default for SimProfile {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            sample_interval_ms: 1000,
            vertical_speed_mps: 2.0,
            noise_hpa: 0.04,
            seed: 0x5eed_ba20,
            realtime: false,
        }
    }
}

/// Generates a synthetic elevator ride over a channel.
pub struct SimulatedSource {
    profile: SimProfile,
    sender: Option<Sender<RawReading>>,
    receiver: Receiver<RawReading>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SimulatedSource {
    pub fn new(profile: SimProfile) -> Self {
        let (sender, receiver) = bounded(10_000);
        Self {
            profile,
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Start generating readings on a background thread.
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        let sender = self.sender.take().ok_or(SourceError::AlreadyRunning)?;

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let profile = self.profile.clone();

        self.worker = Some(thread::spawn(move || {
            let mut noise = Xorshift64::new(profile.seed);
            let total_ms = profile.duration_secs as i64 * 1000;
            // Five equal phases: idle, up, idle, down, idle.
            let phase_ms = total_ms / 5;
            let mut altitude_m = 0.0;
            let mut timestamp_ms: i64 = 0;

            while running.load(Ordering::SeqCst) && timestamp_ms <= total_ms {
                let phase = (timestamp_ms / phase_ms.max(1)).min(4);
                let vertical_mps = match phase {
                    1 => profile.vertical_speed_mps,
                    3 => -profile.vertical_speed_mps,
                    _ => 0.0,
                };
                altitude_m += vertical_mps * profile.sample_interval_ms as f64 / 1000.0;

                let jitter = (noise.next_unit() - 0.5) * profile.noise_hpa;
                let pressure_hpa = pressure_at_altitude(altitude_m) + jitter;

                if sender.send(RawReading::new(timestamp_ms, pressure_hpa)).is_err() {
                    break;
                }
                if profile.realtime {
                    thread::sleep(Duration::from_millis(profile.sample_interval_ms));
                }
                timestamp_ms += profile.sample_interval_ms as i64;
            }
            running.store(false, Ordering::SeqCst);
            debug!("simulated ride finished");
        }));

        Ok(())
    }

    /// Stop the generator and join the background thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    /// Check if the source is currently generating.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for generated readings.
    pub fn receiver(&self) -> &Receiver<RawReading> {
        &self.receiver
    }
}

impl Drop for SimulatedSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Inverse of the barometric altitude formula: pressure at a given height
/// above the standard sea-level reference.
fn pressure_at_altitude(altitude_m: f64) -> f64 {
    STANDARD_SEA_LEVEL_HPA * (1.0 - altitude_m / 44_330.0).powf(5.255)
}

/// Small deterministic PRNG so simulated rides are reproducible.
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next_unit(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 11) as f64 / (1u64 << 53) as f64
    }
}
