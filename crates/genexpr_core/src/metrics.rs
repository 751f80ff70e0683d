//! Run metrics for batches of gene-expression machines.
//!
//! Provides structured logging and counters for monitoring how a run is
//! progressing: cycles, live programids, offspring produced.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Global metrics collector for run statistics.
pub struct Metrics {
    cycle_count: AtomicU64,
    programid_count: AtomicU64,
    offspring_count: AtomicU64,
    log_interval: u64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates a new metrics collector logging every 1000 cycles.
    #[must_use]
    pub fn new() -> Self {
        Self::with_interval(1000)
    }

    #[must_use]
    pub fn with_interval(log_interval: u64) -> Self {
        Self {
            cycle_count: AtomicU64::new(0),
            programid_count: AtomicU64::new(0),
            offspring_count: AtomicU64::new(0),
            log_interval: log_interval.max(1),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed cycle with its duration.
    pub fn record_cycle(&self, duration: Duration, programids: usize, offspring: usize) {
        self.cycle_count.fetch_add(1, Ordering::Relaxed);
        self.programid_count
            .store(programids as u64, Ordering::Relaxed);
        self.offspring_count
            .fetch_add(offspring as u64, Ordering::Relaxed);

        let cycle = self.cycle_count.load(Ordering::Relaxed);
        if cycle % self.log_interval == 0 {
            tracing::info!(
                cycle = cycle,
                programids = programids,
                offspring = self.offspring_count.load(Ordering::Relaxed),
                duration_us = duration.as_micros() as u64,
                "Hardware cycle"
            );
        }
    }

    /// Increments a named counter.
    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Reads a named counter, zero if it was never incremented.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count.load(Ordering::Relaxed)
    }

    /// Live programids across all machines at the last recorded cycle.
    #[must_use]
    pub fn programid_count(&self) -> u64 {
        self.programid_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn offspring_count(&self) -> u64 {
        self.offspring_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Logs a run event.
    pub fn log_event(&self, event_type: &str, details: &str) {
        tracing::info!(event_type = event_type, details = details, "Run event");
    }
}

/// Initialize tracing subscriber for logging.
///
/// Honors `RUST_LOG`; falls back to `info`.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.cycle_count(), 0);
        assert_eq!(metrics.offspring_count(), 0);
    }

    #[test]
    fn test_record_cycle() {
        let metrics = Metrics::with_interval(2);
        metrics.record_cycle(Duration::from_micros(16), 5, 1);
        metrics.record_cycle(Duration::from_micros(16), 7, 0);
        assert_eq!(metrics.cycle_count(), 2);
        assert_eq!(metrics.programid_count(), 7);
        assert_eq!(metrics.offspring_count(), 1);
    }

    #[test]
    fn test_increment_counter() {
        let metrics = Metrics::new();
        metrics.increment_counter("divide");
        metrics.increment_counter("divide");
        assert_eq!(metrics.counter("divide"), 2);
        assert_eq!(metrics.counter("death"), 0);
    }
}
