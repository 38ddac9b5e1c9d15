use crate::{
    job::partition_rows, Board, BoardSink, BoardSlots, Job, Phase, PhaseJob, SilentSink,
    TerminalRenderer, TimingHistory, TimingSummary, Worker, WorkerContext,
};
use anyhow::{anyhow, Result};
use std::{sync::Arc, time::Instant};
use tracing::{debug, error, info, trace};

/// What the engine shows while it runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    /// Nothing is drawn.
    #[default]
    Off,
    /// Every frame is printed below the previous one.
    Print,
    /// The screen is cleared before every frame and frames are paced.
    Interactive,
}

/// Settings fixed for the lifetime of a [`SimulationEngine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Requested pool size; clamped to the board height.
    pub workers: usize,
    pub display: Display,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
            display: Display::Off,
        }
    }
}

/// Runs the two-phase multi-species automaton on a fixed pool of threads.
///
/// # Overview
///
/// The engine owns both board buffers and is the only producer of jobs. Each
/// phase it splits the rows into one contiguous range per worker and, for
/// every range, first increases the barrier and then pushes the job. It then
/// waits on the barrier: once the count is back to zero every job of the
/// phase has been executed and dropped, so all writes are visible and no
/// worker holds a buffer anymore. Only then are the buffers swapped.
///
/// Workers are started in [`new`](Self::new) and stopped by
/// [`shutdown`](Self::shutdown), or by `Drop` if the engine is discarded.
///
/// # Example
///
/// ```rust
/// use multilife::{Board, EngineConfig, SimulationEngine};
///
/// let board = Board::from_text("0 0 0\n1 1 1\n0 0 0\n").unwrap();
/// let config = EngineConfig { workers: 2, ..Default::default() };
/// let mut engine = SimulationEngine::new(board, config).unwrap();
/// engine.run(1).unwrap();
/// assert_eq!(engine.current_board().rows(), vec![vec![0, 1, 0]; 3]);
/// engine.shutdown().unwrap();
/// ```
pub struct SimulationEngine {
    slots: BoardSlots,
    ctx: Arc<WorkerContext>,
    workers: Vec<Worker>,
    sink: Box<dyn BoardSink + Send>,
    gen_history: TimingHistory,
    generation: u64,
}

impl SimulationEngine {
    /// Takes ownership of the initial board and starts the worker pool.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.workers` is zero or a worker thread cannot
    /// be started. Workers started before the failure are shut down first.
    pub fn new(board: Board, config: EngineConfig) -> Result<Self> {
        if config.workers == 0 {
            return Err(anyhow!("At least one worker thread is required"));
        }
        let pool_size = config.workers.min(board.height());
        let sink: Box<dyn BoardSink + Send> = match config.display {
            Display::Off => Box::new(SilentSink),
            Display::Print => Box::new(TerminalRenderer::new(false)),
            Display::Interactive => Box::new(TerminalRenderer::new(true)),
        };

        let mut engine = Self {
            slots: BoardSlots::new(board),
            ctx: Arc::new(WorkerContext::new()),
            workers: Vec::with_capacity(pool_size),
            sink,
            gen_history: TimingHistory::new(),
            generation: 0,
        };
        for id in 0..pool_size {
            match Worker::spawn(id, Arc::clone(&engine.ctx)) {
                Ok(worker) => engine.workers.push(worker),
                Err(e) => {
                    // dropping the engine stops the workers spawned so far
                    drop(engine);
                    return Err(e);
                }
            }
        }
        info!(
            workers = pool_size,
            height = engine.slots.height(),
            width = engine.slots.width(),
            "engine started"
        );
        Ok(engine)
    }

    /// Replaces the sink chosen from [`EngineConfig::display`].
    pub fn set_sink(&mut self, sink: Box<dyn BoardSink + Send>) {
        self.sink = sink;
    }

    /// Number of worker threads, at most the board height.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of generations completed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_board(&self) -> &Board {
        self.slots.current()
    }

    /// Advances the board by `generations`, showing it before the first
    /// generation, after each one and at the end through the engine's sink.
    pub fn run(&mut self, generations: u32) -> Result<()> {
        let mut sink = std::mem::replace(&mut self.sink, Box::new(SilentSink));
        let result = self.run_with_sink(generations, sink.as_mut());
        self.sink = sink;
        result
    }

    /// Same as [`run`](Self::run), but shows the frames to `sink`.
    pub fn run_with_sink(&mut self, generations: u32, sink: &mut dyn BoardSink) -> Result<()> {
        sink.show(self.slots.current(), Some("Initial Board"));
        for _ in 0..generations {
            let timer = Instant::now();
            self.step()?;
            let elapsed = timer.elapsed();
            self.gen_history.record(elapsed);
            debug!(generation = self.generation, ?elapsed, "generation done");
            sink.show(self.slots.current(), None);
        }
        sink.show(self.slots.current(), Some("Final Board"));
        Ok(())
    }

    /// Runs a single generation: Phase 1, swap, Phase 2, swap.
    ///
    /// # Errors
    ///
    /// Returns an error if a job panicked; the board is then left mid-update.
    pub fn step(&mut self) -> Result<()> {
        self.run_phase(Phase::Phase1)?;
        self.run_phase(Phase::Phase2)?;
        self.generation += 1;
        Ok(())
    }

    fn run_phase(&mut self, phase: Phase) -> Result<()> {
        {
            let src = self.slots.current();
            let dst = self.slots.next();
            for rows in partition_rows(self.slots.height(), self.workers.len()) {
                trace!(?phase, ?rows, "dispatch");
                self.ctx.barrier.increase();
                self.ctx.queue.push(Job::Compute(PhaseJob {
                    phase,
                    rows,
                    src: Arc::clone(src),
                    dst: Arc::clone(dst),
                }));
            }
        }
        self.ctx.barrier.wait();

        let failed = self.ctx.take_failed_jobs();
        if failed > 0 {
            return Err(anyhow!(
                "{} job(s) panicked during {:?} of generation {}",
                failed,
                phase,
                self.generation
            ));
        }
        self.slots.swap();
        Ok(())
    }

    /// Elapsed time of every executed job so far, in microseconds.
    pub fn tile_history(&self) -> Vec<f64> {
        self.ctx.tile_history.samples()
    }

    /// Elapsed time of every generation run through [`run`](Self::run), in
    /// microseconds.
    pub fn generation_history(&self) -> Vec<f64> {
        self.gen_history.samples()
    }

    pub fn tile_summary(&self) -> Option<TimingSummary> {
        self.ctx.tile_history.summary()
    }

    pub fn generation_summary(&self) -> Option<TimingSummary> {
        self.gen_history.summary()
    }

    /// Stops and joins every worker.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread terminated abnormally.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop_workers()
    }

    fn stop_workers(&mut self) -> Result<()> {
        let workers = std::mem::take(&mut self.workers);
        for _ in 0..workers.len() {
            self.ctx.barrier.increase();
            self.ctx.queue.push(Job::Shutdown);
        }
        self.ctx.barrier.wait();

        let mut result = Ok(());
        for worker in workers {
            if let Err(e) = worker.join() {
                error!("{:#}", e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        info!(generations = self.generation, "engine shut down");
        result
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        if let Err(e) = self.stop_workers() {
            error!("failed to stop workers: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rules, RecordingSink};

    fn config(workers: usize) -> EngineConfig {
        EngineConfig {
            workers,
            display: Display::Off,
        }
    }

    #[test]
    fn zero_workers_is_rejected() {
        let board = Board::blank(3, 3).unwrap();
        assert!(SimulationEngine::new(board, config(0)).is_err());
    }

    #[test]
    fn pool_is_clamped_to_height() {
        let engine = SimulationEngine::new(Board::blank(3, 10).unwrap(), config(16)).unwrap();
        assert_eq!(engine.worker_count(), 3);
        engine.shutdown().unwrap();
    }

    #[test]
    fn step_matches_sequential_reference() {
        let board = Board::random(23, 17, 0.45, Some(7)).unwrap();
        let mut expected = board.clone();
        let mut engine = SimulationEngine::new(board, config(4)).unwrap();
        for _ in 0..10 {
            engine.step().unwrap();
            expected = rules::step_sequential(&expected);
            assert_eq!(engine.current_board(), &expected);
        }
        assert_eq!(engine.generation(), 10);
        engine.shutdown().unwrap();
    }

    #[test]
    fn run_shows_every_frame_and_records_timings() {
        let board = Board::random(8, 8, 0.5, Some(1)).unwrap();
        let mut engine = SimulationEngine::new(board.clone(), config(3)).unwrap();
        let mut sink = RecordingSink::default();
        engine.run_with_sink(4, &mut sink).unwrap();

        let headers: Vec<_> = sink.frames.iter().map(|(h, _)| h.as_deref()).collect();
        assert_eq!(headers.len(), 6);
        assert_eq!(headers[0], Some("Initial Board"));
        assert!(headers[1..5].iter().all(Option::is_none));
        assert_eq!(headers[5], Some("Final Board"));
        assert_eq!(sink.frames[0].1, board);
        assert_eq!(sink.frames[1].1, rules::step_sequential(&board));
        assert_eq!(&sink.frames[5].1, engine.current_board());

        assert_eq!(engine.generation_history().len(), 4);
        assert_eq!(engine.tile_history().len(), 4 * 2 * 3);
        assert_eq!(engine.generation_summary().unwrap().count, 4);
        assert!(engine.tile_summary().unwrap().min >= 0.0);
        engine.shutdown().unwrap();
    }

    #[test]
    fn run_uses_configured_sink() {
        let mut engine =
            SimulationEngine::new(Board::from_text("0 4 0\n").unwrap(), config(1)).unwrap();
        engine.set_sink(Box::new(RecordingSink::default()));
        engine.run(2).unwrap();
        assert_eq!(engine.current_board().population(), 0);
        assert_eq!(engine.generation(), 2);
        engine.shutdown().unwrap();
    }

    #[test]
    fn drop_stops_workers() {
        let ctx = {
            let mut engine =
                SimulationEngine::new(Board::blank(4, 4).unwrap(), config(2)).unwrap();
            engine.step().unwrap();
            Arc::clone(&engine.ctx)
        };
        assert_eq!(ctx.barrier.count(), 0);
        assert!(ctx.queue.is_empty());
        assert_eq!(Arc::strong_count(&ctx), 1);
    }
}
