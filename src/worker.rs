use crate::{
    sync::{GenerationBarrier, WorkQueue},
    Job, TimingHistory,
};
use anyhow::{anyhow, Context, Result};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Instant,
};
use tracing::{debug, error};

/// State every worker of a pool shares with the engine.
#[derive(Default)]
pub struct WorkerContext {
    pub queue: WorkQueue<Job>,
    pub barrier: GenerationBarrier,
    pub tile_history: TimingHistory,
    failed_jobs: AtomicUsize,
}

impl WorkerContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs that panicked since the last call; resets the count.
    pub fn take_failed_jobs(&self) -> usize {
        self.failed_jobs.swap(0, Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WorkerState {
    Running,
    Stopped,
}

/// A long-lived pool thread.
///
/// Pops jobs until it receives [`Job::Shutdown`]. Every popped job, including
/// the shutdown marker, is answered with exactly one barrier decrease. A
/// compute job is dropped, and its board handles released, before that
/// decrease, and its timing sample is recorded before it as well.
pub struct Worker {
    id: usize,
    handle: JoinHandle<()>,
}

impl Worker {
    /// Starts worker `id` on a new OS thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be created.
    pub fn spawn(id: usize, ctx: Arc<WorkerContext>) -> Result<Self> {
        let handle = thread::Builder::new()
            .name(format!("multilife-worker-{}", id))
            .spawn(move || Self::work_loop(id, &ctx))
            .with_context(|| format!("Failed to spawn worker {}", id))?;
        Ok(Self { id, handle })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the thread to exit.
    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|_| anyhow!("Worker {} terminated by a panic", self.id))
    }

    fn work_loop(id: usize, ctx: &WorkerContext) {
        debug!(worker = id, "worker started");
        let mut state = WorkerState::Running;
        let mut jobs_done = 0u64;
        while state == WorkerState::Running {
            state = Self::handle(id, ctx, ctx.queue.pop());
            jobs_done += 1;
        }
        debug!(worker = id, jobs = jobs_done - 1, "worker stopped");
    }

    fn handle(id: usize, ctx: &WorkerContext, job: Job) -> WorkerState {
        let work = match job {
            Job::Shutdown => {
                ctx.barrier.decrease();
                return WorkerState::Stopped;
            }
            Job::Compute(work) => work,
        };

        let timer = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| work.execute()));
        if outcome.is_err() {
            error!(worker = id, phase = ?work.phase, rows = ?work.rows, "job panicked");
            ctx.failed_jobs.fetch_add(1, Ordering::Relaxed);
        }
        drop(work);
        ctx.tile_history.record(timer.elapsed());
        ctx.barrier.decrease();
        WorkerState::Running
    }
}
