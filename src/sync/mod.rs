//! Blocking primitives the worker pool is built from.
//!
//! All three are a counter or a sequence behind a `parking_lot` mutex plus a
//! condition variable. Waiters always re-check their predicate after waking.

mod barrier;
mod queue;
mod semaphore;

pub use barrier::GenerationBarrier;
pub use queue::WorkQueue;
pub use semaphore::Semaphore;
