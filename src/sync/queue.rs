use super::Semaphore;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// FIFO queue with one producer and any number of blocking consumers.
///
/// The semaphore counts items that are in the queue but not yet claimed. A
/// consumer first takes a permit, then removes the head under the lock, so
/// each pushed item is handed to exactly one consumer.
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Semaphore,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Semaphore::new(0),
        }
    }

    /// Appends `item` to the tail and signals one waiting consumer.
    ///
    /// Only one thread is expected to push.
    pub fn push(&self, item: T) {
        self.items.lock().push_back(item);
        self.available.up();
    }

    /// Blocks until an item is available, then removes and returns the head.
    pub fn pop(&self) -> T {
        self.available.down();
        self.items
            .lock()
            .pop_front()
            .expect("semaphore admitted a consumer into an empty queue")
    }

    /// Removes the head if an item is available right now.
    pub fn try_pop(&self) -> Option<T> {
        if !self.available.try_down() {
            return None;
        }
        let item = self.items.lock().pop_front();
        debug_assert!(item.is_some());
        item
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
