use parking_lot::Mutex;
use std::time::Duration;

/// Append-only list of elapsed times, in microseconds.
///
/// Only ever read for reporting; the simulation never branches on it.
#[derive(Default)]
pub struct TimingHistory {
    samples: Mutex<Vec<f64>>,
}

impl TimingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, elapsed: Duration) {
        self.samples.lock().push(elapsed.as_secs_f64() * 1e6);
    }

    /// Copy of all samples recorded so far, oldest first.
    pub fn samples(&self) -> Vec<f64> {
        self.samples.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    /// `None` until the first sample is recorded.
    pub fn summary(&self) -> Option<TimingSummary> {
        TimingSummary::of(&self.samples.lock())
    }
}

/// Aggregate of a [`TimingHistory`], all values in microseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingSummary {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl TimingSummary {
    pub fn of(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let total: f64 = samples.iter().sum();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count: samples.len(),
            total,
            mean: total / samples.len() as f64,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_microseconds_in_order() {
        let history = TimingHistory::new();
        assert!(history.summary().is_none());
        history.record(Duration::from_micros(30));
        history.record(Duration::from_micros(10));
        history.record(Duration::from_micros(20));
        assert_eq!(history.samples(), vec![30.0, 10.0, 20.0]);

        let summary = history.summary().unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total, 60.0);
        assert_eq!(summary.mean, 20.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 30.0);
    }

    #[test]
    fn concurrent_records_are_all_kept() {
        let history = TimingHistory::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..250 {
                        history.record(Duration::from_micros(1));
                    }
                });
            }
        });
        assert_eq!(history.len(), 1000);
    }
}
