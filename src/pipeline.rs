//! The sensing pipeline: window aggregation, classification, publishing.
//!
//! A single worker thread owns the aggregator and the classifier, so
//! readings are processed serially with no internal locking. The only
//! shared state is the latest published snapshot, guarded for
//! arbitrary-thread status queries.

use crate::classifier::{DirectionClassifier, ModelProvider};
use crate::core::features::FeatureVector;
use crate::core::windowing::{WindowAggregator, DEFAULT_WINDOW_MS};
use crate::event::{Direction, DirectionEvent, EventSink};
use crate::source::types::RawReading;
use crate::stats::SharedRunStats;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Tuning for a pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Trailing window width in milliseconds
    pub window_ms: u64,
    /// Model name requested from the provider
    pub model_name: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            model_name: "indoor-direction".to_string(),
        }
    }
}

/// Latest published metrics, readable from any thread.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub direction: Direction,
    pub altitude: f64,
    pub pressure: f64,
    pub altitude_rate: f64,
    pub pressure_rate: f64,
    /// Timestamp of the window behind these values, milliseconds
    pub window_end_ms: i64,
    /// Number of windows published so far
    pub windows_published: u64,
}

/// Shared view of the pipeline's current state.
///
/// The worker is the single writer; status queries read a cloned
/// snapshot so they never observe a half-updated cycle.
#[derive(Clone, Default)]
pub struct PipelineState {
    inner: Arc<RwLock<StateSnapshot>>,
}

impl PipelineState {
    fn new() -> Self {
        Self::default()
    }

    /// A consistent copy of the latest published values.
    pub fn snapshot(&self) -> StateSnapshot {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn publish(&self, event: &DirectionEvent, window_end_ms: i64) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.direction = event.direction;
        guard.altitude = event.altitude;
        guard.pressure = event.pressure;
        guard.altitude_rate = event.altitude_rate;
        guard.pressure_rate = event.pressure_rate;
        guard.window_end_ms = window_end_ms;
        guard.windows_published += 1;
    }
}

/// A running pipeline instance.
pub struct Pipeline;

impl Pipeline {
    /// Start the worker thread consuming `readings`.
    ///
    /// The worker runs until [`PipelineHandle::stop`] is called or the
    /// reading channel disconnects (end of stream).
    pub fn start(
        options: PipelineOptions,
        readings: Receiver<RawReading>,
        provider: Box<dyn ModelProvider>,
        mut sinks: Vec<Box<dyn EventSink>>,
        stats: SharedRunStats,
    ) -> PipelineHandle {
        let instance_id = Uuid::new_v4();
        let running = Arc::new(AtomicBool::new(true));
        let state = PipelineState::new();

        info!(
            instance_id = %instance_id,
            window_ms = options.window_ms,
            model = %options.model_name,
            "pipeline starting"
        );

        let worker_running = running.clone();
        let worker_state = state.clone();
        let worker = thread::spawn(move || {
            let mut aggregator = WindowAggregator::new(options.window_ms);
            let mut classifier = DirectionClassifier::new(provider, options.model_name);

            while worker_running.load(Ordering::SeqCst) {
                match readings.recv_timeout(Duration::from_millis(100)) {
                    Ok(reading) => {
                        stats.record_reading();
                        match aggregator.on_reading(reading) {
                            Some(sample) => {
                                let direction =
                                    classifier.classify(FeatureVector::from_sample(&sample));
                                let event = DirectionEvent::from_sample(direction, &sample);

                                worker_state.publish(&event, sample.window_end_ms);
                                for sink in sinks.iter_mut() {
                                    sink.publish(&event);
                                }
                                stats.record_window_computed();
                                stats.record_event_published();
                                debug!(
                                    window_end_ms = sample.window_end_ms,
                                    readings = sample.reading_count,
                                    direction = %direction,
                                    "window published"
                                );
                            }
                            None => {
                                stats.record_window_skipped();
                            }
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => {
                        debug!("reading stream ended, pipeline worker exiting");
                        break;
                    }
                }
            }
            // readings receiver drops here, releasing the subscription
            // after the worker has finished its last cycle.
        });

        PipelineHandle {
            instance_id,
            running,
            worker: Some(worker),
            state,
        }
    }
}

/// Owns the worker thread and the shared state of one pipeline run.
pub struct PipelineHandle {
    instance_id: Uuid,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    state: PipelineState,
}

impl PipelineHandle {
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Shared state for status queries from other threads.
    pub fn state(&self) -> PipelineState {
        self.state.clone()
    }

    /// Whether the worker has exited (stream ended or stop requested).
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map(JoinHandle::is_finished).unwrap_or(true)
    }

    /// Stop the worker and wait for the in-flight cycle to complete.
    /// Cycles run to completion; only the loop is interrupted.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            info!(instance_id = %self.instance_id, "pipeline stopped");
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::StaticModelProvider;
    use crate::event::ChannelSink;
    use crate::stats::RunStats;
    use crossbeam_channel::bounded;

    #[test]
    fn test_pipeline_publishes_state_and_events() {
        let (reading_tx, reading_rx) = bounded(64);
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let stats = Arc::new(RunStats::new());

        let mut handle = Pipeline::start(
            PipelineOptions::default(),
            reading_rx,
            Box::new(StaticModelProvider::builtin()),
            vec![Box::new(ChannelSink::new(event_tx))],
            stats.clone(),
        );

        reading_tx.send(RawReading::new(0, 1013.25)).unwrap();
        let first = event_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.direction, Direction::Idle);
        assert_eq!(first.altitude_rate, 0.0);

        drop(reading_tx);
        handle.stop();

        let snapshot = handle.state().snapshot();
        assert_eq!(snapshot.windows_published, 1);
        assert_eq!(snapshot.direction, Direction::Idle);
        assert_eq!(stats.stats().windows_computed, 1);
    }

    #[test]
    fn test_pipeline_stops_on_stream_end() {
        let (reading_tx, reading_rx) = bounded::<RawReading>(4);
        let handle = Pipeline::start(
            PipelineOptions::default(),
            reading_rx,
            Box::new(StaticModelProvider::builtin()),
            Vec::new(),
            Arc::new(RunStats::new()),
        );
        drop(reading_tx);

        // Worker exits on disconnect without an explicit stop.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !handle.is_finished() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(handle.is_finished());
    }
}
