use parking_lot::{Condvar, Mutex};

/// Shrinking-counter rendezvous between the dispatching thread and the pool.
///
/// The producer calls [`increase`](Self::increase) once per dispatched item,
/// before pushing it, and then [`wait`](Self::wait)s. Each consumer calls
/// [`decrease`](Self::decrease) once when its item is done. `wait` returns
/// once the counter is back to zero; if it already is, it returns at once.
pub struct GenerationBarrier {
    counter: Mutex<usize>,
    drained: Condvar,
}

impl GenerationBarrier {
    pub fn new() -> Self {
        Self {
            counter: Mutex::new(0),
            drained: Condvar::new(),
        }
    }

    pub fn increase(&self) {
        *self.counter.lock() += 1;
    }

    /// # Panics
    ///
    /// Panics if the counter is already zero: every decrease must be matched
    /// by an earlier increase.
    pub fn decrease(&self) {
        let mut counter = self.counter.lock();
        assert!(*counter > 0, "barrier decreased below zero");
        *counter -= 1;
        if *counter == 0 {
            self.drained.notify_all();
        }
    }

    /// Blocks until the counter reaches zero.
    pub fn wait(&self) {
        let mut counter = self.counter.lock();
        while *counter > 0 {
            self.drained.wait(&mut counter);
        }
    }

    pub fn count(&self) -> usize {
        *self.counter.lock()
    }
}

impl Default for GenerationBarrier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn wait_on_drained_barrier_returns() {
        let barrier = GenerationBarrier::new();
        barrier.wait();
        barrier.increase();
        barrier.decrease();
        barrier.wait();
        assert_eq!(barrier.count(), 0);
    }

    #[test]
    #[should_panic(expected = "below zero")]
    fn unmatched_decrease_panics() {
        GenerationBarrier::new().decrease();
    }

    #[test]
    fn wait_returns_only_after_last_decrease() {
        for n in [1usize, 2, 7, 32] {
            let barrier = Arc::new(GenerationBarrier::new());
            let done = Arc::new(AtomicUsize::new(0));
            for _ in 0..n {
                barrier.increase();
            }

            let handles: Vec<_> = (0..n)
                .map(|i| {
                    let barrier = Arc::clone(&barrier);
                    let done = Arc::clone(&done);
                    std::thread::spawn(move || {
                        std::thread::sleep(Duration::from_millis((i % 4) as u64 * 5));
                        done.fetch_add(1, Ordering::SeqCst);
                        barrier.decrease();
                    })
                })
                .collect();

            barrier.wait();
            assert_eq!(done.load(Ordering::SeqCst), n);
            for h in handles {
                h.join().unwrap();
            }
        }
    }

    #[test]
    fn reusable_across_epochs() {
        let barrier = Arc::new(GenerationBarrier::new());
        for epoch in 0..50 {
            let workers = 1 + epoch % 5;
            for _ in 0..workers {
                barrier.increase();
            }
            std::thread::scope(|s| {
                for _ in 0..workers {
                    s.spawn(|| barrier.decrease());
                }
                barrier.wait();
                assert_eq!(barrier.count(), 0);
            });
        }
    }
}
