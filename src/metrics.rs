use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for session and collaborator observability.
/// All metrics are atomic counters so a clone can be shared across tasks.
#[derive(Clone, Default, Debug)]
pub struct Metrics {
    /// Sets logged through the sequencer
    pub sets_logged: Arc<AtomicU64>,
    /// Sets skipped ("do later")
    pub sets_skipped: Arc<AtomicU64>,
    /// Progress writes that reached the store
    pub progress_writes: Arc<AtomicU64>,
    /// Progress writes suppressed because nothing changed
    pub progress_writes_suppressed: Arc<AtomicU64>,
    /// Store writes that failed
    pub persistence_failures: Arc<AtomicU64>,
    /// AI calls that rotated to the next API key
    pub ai_key_rotations: Arc<AtomicU64>,
    /// AI calls surfaced as errors
    pub ai_failures: Arc<AtomicU64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_set_logged(&self) {
        self.sets_logged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_set_skipped(&self) {
        self.sets_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_progress_write(&self) {
        self.progress_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_suppressed(&self) {
        self.progress_writes_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persistence_failure(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_key_rotation(&self) {
        self.ai_key_rotations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ai_failure(&self) {
        self.ai_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot a counter value
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
