//! Run statistics for the sensing pipeline.
//!
//! Tracks how much the agent has seen and published, without retaining
//! any raw readings. Counters are atomic so the worker can record while
//! status queries read from other threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current run.
#[derive(Debug)]
pub struct RunStats {
    /// Raw readings consumed from the source
    readings_seen: AtomicU64,
    /// Windows aggregated and classified
    windows_computed: AtomicU64,
    /// Trigger cycles skipped because the window was empty
    windows_skipped: AtomicU64,
    /// Direction events handed to sinks
    events_published: AtomicU64,
    /// Run start time
    run_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            readings_seen: AtomicU64::new(0),
            windows_computed: AtomicU64::new(0),
            windows_skipped: AtomicU64::new(0),
            events_published: AtomicU64::new(0),
            run_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create run stats with persistence, folding in any previous runs.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);
        if let Err(e) = stats.load() {
            tracing::debug!(error = %e, "no previous run stats loaded");
        }
        stats
    }

    pub fn record_reading(&self) {
        self.readings_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_window_computed(&self) {
        self.windows_computed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_window_skipped(&self) {
        self.windows_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current counters.
    pub fn stats(&self) -> RunStatsSnapshot {
        RunStatsSnapshot {
            readings_seen: self.readings_seen.load(Ordering::Relaxed),
            windows_computed: self.windows_computed.load(Ordering::Relaxed),
            windows_skipped: self.windows_skipped.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            run_start: self.run_start,
            run_duration_secs: (Utc::now() - self.run_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Run Statistics:\n\
             - Readings consumed: {}\n\
             - Windows computed: {}\n\
             - Windows skipped (empty): {}\n\
             - Events published: {}\n\
             - Run duration: {} seconds",
            stats.readings_seen,
            stats.windows_computed,
            stats.windows_skipped,
            stats.events_published,
            stats.run_duration_secs
        )
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                readings_seen: stats.readings_seen,
                windows_computed: stats.windows_computed,
                windows_skipped: stats.windows_skipped,
                events_published: stats.events_published,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load counters from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.readings_seen
                    .store(persisted.readings_seen, Ordering::Relaxed);
                self.windows_computed
                    .store(persisted.windows_computed, Ordering::Relaxed);
                self.windows_skipped
                    .store(persisted.windows_skipped, Ordering::Relaxed);
                self.events_published
                    .store(persisted.events_published, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.readings_seen.store(0, Ordering::Relaxed);
        self.windows_computed.store(0, Ordering::Relaxed);
        self.windows_skipped.store(0, Ordering::Relaxed);
        self.events_published.store(0, Ordering::Relaxed);
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of run statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatsSnapshot {
    pub readings_seen: u64,
    pub windows_computed: u64,
    pub windows_skipped: u64,
    pub events_published: u64,
    pub run_start: DateTime<Utc>,
    pub run_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    readings_seen: u64,
    windows_computed: u64,
    windows_skipped: u64,
    events_published: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared run stats.
pub type SharedRunStats = Arc<RunStats>;

/// Create new shared run stats.
pub fn create_shared_stats() -> SharedRunStats {
    Arc::new(RunStats::new())
}

/// Create shared run stats with persistence.
pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedRunStats {
    Arc::new(RunStats::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counting() {
        let stats = RunStats::new();

        stats.record_reading();
        stats.record_reading();
        stats.record_window_computed();
        stats.record_window_skipped();
        stats.record_event_published();

        let snapshot = stats.stats();
        assert_eq!(snapshot.readings_seen, 2);
        assert_eq!(snapshot.windows_computed, 1);
        assert_eq!(snapshot.windows_skipped, 1);
        assert_eq!(snapshot.events_published, 1);
    }

    #[test]
    fn test_stats_reset() {
        let stats = RunStats::new();
        stats.record_reading();
        stats.reset();
        assert_eq!(stats.stats().readings_seen, 0);
    }

    #[test]
    fn test_summary_format() {
        let stats = RunStats::new();
        let summary = stats.summary();
        assert!(summary.contains("Readings consumed"));
        assert!(summary.contains("Windows skipped"));
    }

    #[test]
    fn test_persistence_roundtrip() {
        let path = std::env::temp_dir().join(format!("baromotion-stats-{}.json", uuid::Uuid::new_v4()));

        let stats = RunStats::with_persistence(path.clone());
        stats.record_reading();
        stats.record_window_computed();
        stats.save().unwrap();

        let reloaded = RunStats::with_persistence(path.clone());
        let snapshot = reloaded.stats();
        assert_eq!(snapshot.readings_seen, 1);
        assert_eq!(snapshot.windows_computed, 1);

        std::fs::remove_file(path).unwrap();
    }
}
