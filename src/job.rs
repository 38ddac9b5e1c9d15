use crate::{rules, Board};
use std::{fmt, ops::RangeInclusive, sync::Arc};

/// One of the two sub-steps of a generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Liveness and birth decision.
    Phase1,
    /// Species blending over the result of [`Phase::Phase1`].
    Phase2,
}

/// Row-range work against a pair of boards.
///
/// Owns handles to both boards while it exists; dropping it releases them.
pub struct PhaseJob {
    pub phase: Phase,
    pub rows: RangeInclusive<usize>,
    pub src: Arc<Board>,
    pub dst: Arc<Board>,
}

impl PhaseJob {
    /// Computes every cell of `rows`, reading `src` and writing `dst`.
    pub fn execute(&self) {
        match self.phase {
            Phase::Phase1 => rules::phase1_rows(&self.src, &self.dst, self.rows.clone()),
            Phase::Phase2 => rules::phase2_rows(&self.src, &self.dst, self.rows.clone()),
        }
    }
}

impl fmt::Debug for PhaseJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseJob")
            .field("phase", &self.phase)
            .field("rows", &self.rows)
            .finish()
    }
}

/// A work item handed from the engine to exactly one worker.
#[derive(Debug)]
pub enum Job {
    Compute(PhaseJob),
    /// Tells the receiving worker to stop.
    Shutdown,
}

/// Splits `[0, height - 1]` into `min(workers, height)` contiguous ranges of
/// `height / count` rows; the last range also takes the remainder.
///
/// # Panics
///
/// Panics if `height` or `workers` is zero.
pub fn partition_rows(height: usize, workers: usize) -> Vec<RangeInclusive<usize>> {
    assert!(
        height > 0 && workers > 0,
        "Cannot split {} rows between {} workers",
        height,
        workers
    );
    let count = workers.min(height);
    let chunk = height / count;
    (0..count)
        .map(|i| {
            let start = chunk * i;
            let stop = if i == count - 1 {
                height - 1
            } else {
                start + chunk - 1
            };
            start..=stop
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn remainder_goes_to_last_range() {
        assert_eq!(partition_rows(10, 3), vec![0..=2, 3..=5, 6..=9]);
        assert_eq!(partition_rows(4, 4), vec![0..=0, 1..=1, 2..=2, 3..=3]);
        assert_eq!(partition_rows(5, 1), vec![0..=4]);
    }

    #[test]
    fn more_workers_than_rows_are_clamped() {
        assert_eq!(partition_rows(3, 8), vec![0..=0, 1..=1, 2..=2]);
    }

    #[test]
    fn execute_writes_its_rows() {
        let src = Arc::new(Board::from_text("0 2 0\n0 2 0\n0 2 0\n").unwrap());
        let dst = Arc::new(Board::blank(3, 3).unwrap());
        let job = PhaseJob {
            phase: Phase::Phase1,
            rows: 1..=1,
            src,
            dst: Arc::clone(&dst),
        };
        job.execute();
        assert_eq!(dst.rows(), vec![vec![0, 0, 0], vec![2, 2, 2], vec![0, 0, 0]]);
        assert_eq!(format!("{:?}", job), "PhaseJob { phase: Phase1, rows: 1..=1 }");
    }

    proptest! {
        #[test]
        fn ranges_cover_rows_exactly_once(height in 1usize..500, workers in 1usize..64) {
            let ranges = partition_rows(height, workers);
            prop_assert_eq!(ranges.len(), workers.min(height));
            let mut next = 0;
            for r in &ranges {
                prop_assert!(!r.is_empty());
                prop_assert_eq!(*r.start(), next);
                next = r.end() + 1;
            }
            prop_assert_eq!(next, height);
        }
    }
}
