//! Replay of recorded pressure sessions.
//!
//! A recording is a JSONL file with one [`RawReading`] per line. The
//! source streams it over a bounded channel, optionally paced to the
//! recorded timestamps so a session plays back in real time.

use crate::source::types::RawReading;
use crate::source::SourceError;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Streams a recorded pressure session over a channel.
///
/// The channel disconnects when the recording is exhausted, which lets a
/// downstream consumer treat end-of-recording as end-of-stream.
pub struct ReplaySource {
    path: PathBuf,
    realtime: bool,
    sender: Option<Sender<RawReading>>,
    receiver: Receiver<RawReading>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ReplaySource {
    /// Create a replay source for the given recording.
    ///
    /// With `realtime` set, the source sleeps between readings to match
    /// the recorded timestamp gaps; otherwise it streams as fast as the
    /// consumer drains the channel.
    pub fn new(path: PathBuf, realtime: bool) -> Self {
        let (sender, receiver) = bounded(10_000);
        Self {
            path,
            realtime,
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Start streaming the recording on a background thread.
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        let sender = self.sender.take().ok_or(SourceError::AlreadyRunning)?;

        // Fail on an unreadable file before spawning anything.
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let realtime = self.realtime;
        let path = self.path.clone();

        self.worker = Some(thread::spawn(move || {
            let mut last_timestamp: Option<i64> = None;
            for (line_no, line) in reader.lines().enumerate() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        warn!(error = %e, "read error in recording, stopping replay");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let reading: RawReading = match serde_json::from_str(&line) {
                    Ok(r) => r,
                    Err(e) => {
                        // A malformed line costs one reading, not the session.
                        warn!(line = line_no + 1, error = %e, "skipping malformed reading");
                        continue;
                    }
                };
                if realtime {
                    if let Some(last) = last_timestamp {
                        let gap_ms = (reading.timestamp_ms - last).clamp(0, 10_000) as u64;
                        thread::sleep(Duration::from_millis(gap_ms));
                    }
                }
                last_timestamp = Some(reading.timestamp_ms);
                if sender.send(reading).is_err() {
                    break;
                }
            }
            running.store(false, Ordering::SeqCst);
            debug!(path = %path.display(), "replay finished");
            // sender drops here, disconnecting the channel
        }));

        Ok(())
    }

    /// Stop streaming and join the background thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    /// Check if the source is currently streaming.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for replayed readings.
    pub fn receiver(&self) -> &Receiver<RawReading> {
        &self.receiver
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}
