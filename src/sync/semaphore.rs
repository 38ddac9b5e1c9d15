use parking_lot::{Condvar, Mutex};

/// Counting semaphore with an unbounded counter.
///
/// [`up`](Self::up) never blocks; [`down`](Self::down) blocks until the
/// counter is positive. The counter lives under the same lock the waiters
/// sleep on, so an `up` that happens before the matching `down` is never lost.
pub struct Semaphore {
    counter: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub fn new(initial: usize) -> Self {
        Self {
            counter: Mutex::new(initial),
            available: Condvar::new(),
        }
    }

    /// Increments the counter and wakes at most one blocked waiter.
    pub fn up(&self) {
        let mut counter = self.counter.lock();
        *counter += 1;
        self.available.notify_one();
    }

    /// Blocks until the counter is positive, then decrements it.
    pub fn down(&self) {
        let mut counter = self.counter.lock();
        while *counter == 0 {
            self.available.wait(&mut counter);
        }
        *counter -= 1;
    }

    /// Decrements the counter if it is positive, without blocking.
    pub fn try_down(&self) -> bool {
        let mut counter = self.counter.lock();
        if *counter == 0 {
            return false;
        }
        *counter -= 1;
        true
    }

    /// Snapshot of the counter; may be stale by the time it is read.
    pub fn value(&self) -> usize {
        *self.counter.lock()
    }
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn up_before_down_is_not_lost() {
        let sem = Semaphore::new(0);
        sem.up();
        sem.up();
        sem.down();
        sem.down();
        assert_eq!(sem.value(), 0);
        assert!(!sem.try_down());
    }

    #[test]
    fn initial_permits() {
        let sem = Semaphore::new(3);
        assert!(sem.try_down());
        assert!(sem.try_down());
        assert!(sem.try_down());
        assert!(!sem.try_down());
    }

    #[test]
    fn down_blocks_until_up() {
        let sem = Arc::new(Semaphore::new(0));
        let passed = Arc::new(AtomicUsize::new(0));

        let handle = {
            let sem = Arc::clone(&sem);
            let passed = Arc::clone(&passed);
            std::thread::spawn(move || {
                sem.down();
                passed.fetch_add(1, Ordering::SeqCst);
            })
        };

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(passed.load(Ordering::SeqCst), 0);
        sem.up();
        handle.join().unwrap();
        assert_eq!(passed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_up_releases_exactly_one_waiter() {
        const WAITERS: usize = 8;
        let sem = Arc::new(Semaphore::new(0));

        std::thread::scope(|s| {
            for _ in 0..WAITERS {
                let sem = Arc::clone(&sem);
                s.spawn(move || sem.down());
            }
            for _ in 0..WAITERS {
                sem.up();
            }
        });
        assert_eq!(sem.value(), 0);
    }
}
