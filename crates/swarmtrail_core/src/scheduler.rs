//! Tick throttling for sampling and recording.
//!
//! Two gates are applied per simulation tick:
//!
//! - the **sample gate** turns ticks into samples, either one per tick or at a
//!   fixed rate;
//! - the **record gate** decides which samples are written to the store, either
//!   at a fixed rate or by decimation.
//!
//! Both rate gates accumulate elapsed time and subtract whole periods from the
//! accumulator instead of zeroing it, so rounding never drifts the long-run
//! rate. The record gate only sees the `dt` of ticks that produced a sample.

use crate::config::SamplingConfig;

/// Slack for the record gate so that sums like `0.1 + 0.1 + 0.1` still reach a
/// `0.3` period.
const RECORD_EPSILON: f64 = 1e-6;

/// What one tick amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickDecision {
    /// Samples that fell into this tick. May exceed one for long ticks.
    pub samples: u32,
    /// Whether any of those samples is to be recorded.
    pub record: bool,
}

impl TickDecision {
    #[must_use]
    pub fn is_sample_tick(&self) -> bool {
        self.samples > 0
    }
}

#[derive(Debug, Clone)]
pub struct RecordingScheduler {
    sample_period: Option<f64>,
    record_period: Option<f64>,
    every_nth: u64,
    sample_acc: f64,
    record_acc: f64,
    sample_count: u64,
}

impl RecordingScheduler {
    #[must_use]
    pub fn new(config: &SamplingConfig) -> Self {
        Self {
            sample_period: period_of(config.sample_hz),
            record_period: period_of(config.record_hz),
            every_nth: u64::from(config.record_every_nth.max(1)),
            sample_acc: 0.0,
            record_acc: 0.0,
            sample_count: 0,
        }
    }

    /// Advances by `dt` seconds. Negative or non-finite `dt` counts as zero.
    pub fn tick(&mut self, dt: f64) -> TickDecision {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let samples = match self.sample_period {
            None => 1,
            Some(period) => {
                self.sample_acc += dt;
                let mut samples = 0;
                while self.sample_acc >= period {
                    self.sample_acc -= period;
                    samples += 1;
                }
                samples
            }
        };
        if samples == 0 {
            return TickDecision::default();
        }

        let first = self.sample_count + 1;
        self.sample_count += u64::from(samples);
        let record = self.record_gate(dt, first);
        TickDecision { samples, record }
    }

    /// Applied once per sample tick. `first` is the counter value of the
    /// tick's first sample.
    fn record_gate(&mut self, dt: f64, first: u64) -> bool {
        match self.record_period {
            Some(period) => {
                self.record_acc += dt;
                if self.record_acc + RECORD_EPSILON >= period {
                    // Recording can never outpace sampling; drop whole periods
                    // that a single tick cannot use.
                    while self.record_acc + RECORD_EPSILON >= period {
                        self.record_acc -= period;
                    }
                    true
                } else {
                    false
                }
            }
            None if self.every_nth > 1 => {
                (first..=self.sample_count).any(|n| n % self.every_nth == 0)
            }
            None => true,
        }
    }

    /// Total samples taken since the last reset.
    #[must_use]
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Configured sample rate, or `None` when sampling every tick.
    #[must_use]
    pub fn sample_hz(&self) -> Option<f64> {
        self.sample_period.map(|p| 1.0 / p)
    }

    /// Clears accumulators and the sample counter for a new run.
    pub fn reset(&mut self) {
        self.sample_acc = 0.0;
        self.record_acc = 0.0;
        self.sample_count = 0;
    }
}

fn period_of(hz: f64) -> Option<f64> {
    (hz.is_finite() && hz > 0.0).then(|| 1.0 / hz)
}
