//! Recorder statistics and logging setup.
//!
//! Provides structured logging and counters for monitoring the recorder
//! over a run.

use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// How often (in ticks) a summary line is logged.
const SUMMARY_EVERY_TICKS: u64 = 1000;

/// Counters for one recorder, reset at every run start.
#[derive(Debug, Clone)]
pub struct RecorderStats {
    ticks: u64,
    samples: u64,
    records: u64,
    saves: u64,
    skipped_saves: u64,
    failed_saves: u64,
    started: Instant,
}

impl Default for RecorderStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ticks: 0,
            samples: 0,
            records: 0,
            saves: 0,
            skipped_saves: 0,
            failed_saves: 0,
            started: Instant::now(),
        }
    }

    /// Records a completed tick.
    pub fn record_tick(&mut self, samples: u32, recorded: bool, agents: usize) {
        self.ticks += 1;
        self.samples += u64::from(samples);
        if recorded {
            self.records += 1;
        }

        if self.ticks.is_multiple_of(SUMMARY_EVERY_TICKS) {
            tracing::info!(
                tick = self.ticks,
                samples = self.samples,
                records = self.records,
                agents = agents,
                "Recorder tick"
            );
        }
    }

    pub fn record_save(&mut self) {
        self.saves += 1;
    }

    pub fn record_skipped_save(&mut self) {
        self.skipped_saves += 1;
    }

    pub fn record_failed_save(&mut self) {
        self.failed_saves += 1;
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    #[must_use]
    pub fn records(&self) -> u64 {
        self.records
    }

    #[must_use]
    pub fn saves(&self) -> u64 {
        self.saves
    }

    #[must_use]
    pub fn skipped_saves(&self) -> u64 {
        self.skipped_saves
    }

    #[must_use]
    pub fn failed_saves(&self) -> u64 {
        self.failed_saves
    }

    /// Wall-clock time since the counters were created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
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
    fn test_stats_new() {
        let stats = RecorderStats::new();
        assert_eq!(stats.ticks(), 0);
        assert_eq!(stats.saves(), 0);
    }

    #[test]
    fn test_record_tick() {
        let mut stats = RecorderStats::new();
        stats.record_tick(2, true, 5);
        stats.record_tick(0, false, 5);
        assert_eq!(stats.ticks(), 2);
        assert_eq!(stats.samples(), 2);
        assert_eq!(stats.records(), 1);
    }

    #[test]
    fn test_save_counters() {
        let mut stats = RecorderStats::new();
        stats.record_save();
        stats.record_skipped_save();
        stats.record_skipped_save();
        stats.record_failed_save();
        assert_eq!(stats.saves(), 1);
        assert_eq!(stats.skipped_saves(), 2);
        assert_eq!(stats.failed_saves(), 1);
    }
}
