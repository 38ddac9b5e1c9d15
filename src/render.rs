use crate::{Board, BoardSink};
use std::{
    io::{self, Write},
    time::Duration,
};

const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
/// Foreground colors indexed by `species % 7`.
const COLORS: [&str; 7] = [
    "\x1b[30m", // black
    "\x1b[31m", // red
    "\x1b[32m", // green
    "\x1b[33m", // yellow
    "\x1b[34m", // blue
    "\x1b[35m", // magenta
    "\x1b[36m", // cyan
];

/// Draws the board into a framed, colored block of text.
pub fn render_board(board: &Board, header: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(header) = header {
        out.push_str(&format!("<------------{}------------>\n", header));
    }
    let edge = "═".repeat(board.width());
    out.push_str(&format!("╔{}╗\n", edge));
    for i in 0..board.height() {
        out.push('║');
        for j in 0..board.width() {
            let species = board.get(i, j);
            if species > 0 {
                out.push_str(COLORS[species as usize % COLORS.len()]);
                out.push('█');
                out.push_str(RESET);
            } else {
                out.push('░');
            }
        }
        out.push_str("║\n");
    }
    out.push_str(&format!("╚{}╝\n", edge));
    out
}

/// Prints every frame to stdout.
///
/// In interactive mode the screen is cleared before a frame and the frame
/// stays up for `frame_delay`, which turns the run into an animation.
pub struct TerminalRenderer {
    interactive: bool,
    frame_delay: Duration,
}

impl TerminalRenderer {
    pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(50);

    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            frame_delay: Self::DEFAULT_FRAME_DELAY,
        }
    }

    pub fn with_frame_delay(mut self, frame_delay: Duration) -> Self {
        self.frame_delay = frame_delay;
        self
    }
}

impl BoardSink for TerminalRenderer {
    fn show(&mut self, board: &Board, header: Option<&str>) {
        let frame = render_board(board, header);
        let mut stdout = io::stdout().lock();
        if self.interactive {
            let _ = stdout.write_all(CLEAR_SCREEN.as_bytes());
        }
        // a closed stdout only loses the picture, never the simulation
        let _ = stdout.write_all(frame.as_bytes());
        let _ = stdout.flush();
        drop(stdout);
        if self.interactive {
            std::thread::sleep(self.frame_delay);
        }
    }
}

/// Discards every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSink;

impl BoardSink for SilentSink {
    fn show(&mut self, _board: &Board, _header: Option<&str>) {}
}

/// Keeps a copy of every frame it is shown. Handy for tests and replays.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub frames: Vec<(Option<String>, Board)>,
}

impl BoardSink for RecordingSink {
    fn show(&mut self, board: &Board, header: Option<&str>) {
        self.frames.push((header.map(str::to_owned), board.clone()));
    }
}
