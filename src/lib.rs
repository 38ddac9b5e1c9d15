#![warn(clippy::all)]

mod board;
mod engine;
mod history;
mod job;
mod render;
pub mod rules;
pub mod sync;
mod traits;
mod worker;

pub use board::{Board, BoardSlots, Species, SPECIES_COUNT};
pub use engine::{Display, EngineConfig, SimulationEngine};
pub use history::{TimingHistory, TimingSummary};
pub use job::{partition_rows, Job, Phase, PhaseJob};
pub use render::{render_board, RecordingSink, SilentSink, TerminalRenderer};
pub use traits::BoardSink;
pub use worker::{Worker, WorkerContext};

pub const VERSION: &str = "0.1.0";
