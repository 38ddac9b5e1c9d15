use crate::Board;

/// Receiver of board snapshots for display.
///
/// The engine shows the board once before the first generation with the
/// header `"Initial Board"`, once after every generation without a header,
/// and once after the last one with `"Final Board"`. Sinks observe only;
/// nothing they do feeds back into the simulation.
pub trait BoardSink {
    /// Presents `board`, optionally preceded by `header`.
    fn show(&mut self, board: &Board, header: Option<&str>);
}
