use anyhow::{anyhow, Context, Result};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use rand::{Rng, SeedableRng};
use std::{
    fmt,
    io::{Read, Write},
    path::Path,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
};

/// Cell value: `0` is dead, `1..=SPECIES_COUNT` is the species of a live cell.
pub type Species = u8;

/// Number of distinct species a live cell may belong to.
pub const SPECIES_COUNT: Species = 7;

/// Rectangular grid of cells shared between the engine and its workers.
///
/// # Overview
///
/// Cells are stored row-major as relaxed atomics, so a board can be read and
/// written through a shared reference from several threads at once. No
/// ordering is implied by the cell accesses themselves: visibility of one
/// phase's writes to the next phase's reads comes from the work queue and the
/// generation barrier, whose locks every access is sequenced around.
///
/// During a phase the workers only write rows of their own disjoint range,
/// so no cell is ever written by two threads.
///
/// # Formats
///
/// The text format is one row per line, cells separated by whitespace, e.g.
///
/// ```text
/// 0 1 0
/// 0 2 0
/// 3 0 0
/// ```
///
/// Files whose name ends with `.gz` are transparently gzip-(de)compressed.
pub struct Board {
    height: usize,
    width: usize,
    cells: Box<[AtomicU8]>,
}

impl Board {
    /// Creates an all-dead board.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn blank(height: usize, width: usize) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(anyhow!("Board must not be empty, got {}x{}", height, width));
        }
        let cells = (0..height * width).map(|_| AtomicU8::new(0)).collect();
        Ok(Self {
            height,
            width,
            cells,
        })
    }

    /// Builds a board from its rows.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rows, the rows are empty or of
    /// different lengths, or a cell is greater than [`SPECIES_COUNT`].
    pub fn from_rows(rows: Vec<Vec<Species>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let board = Self::blank(height, width)?;
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(anyhow!(
                    "Row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    width
                ));
            }
            for (j, value) in row.into_iter().enumerate() {
                if value > SPECIES_COUNT {
                    return Err(anyhow!(
                        "Cell ({}, {}) has species {}, the maximum is {}",
                        i,
                        j,
                        value,
                        SPECIES_COUNT
                    ));
                }
                board.set(i, j, value);
            }
        }
        Ok(board)
    }

    /// Parses the whitespace-separated text format. Blank lines are skipped.
    pub fn from_text(text: &str) -> Result<Self> {
        let rows = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(line_no, line)| {
                line.split_whitespace()
                    .map(|token| {
                        token.parse::<Species>().with_context(|| {
                            format!("Invalid cell {:?} on line {}", token, line_no + 1)
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_rows(rows)
    }

    /// Loads a board from a text file, gunzipping it if the name ends with `.gz`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let text = if is_gzip_path(path) {
            let mut text = String::new();
            GzDecoder::new(&data[..])
                .read_to_string(&mut text)
                .with_context(|| format!("Failed to decompress {}", path.display()))?;
            text
        } else {
            String::from_utf8(data)
                .with_context(|| format!("{} is not valid UTF-8", path.display()))?
        };
        Self::from_text(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Serializes the board to the text format, one line per row.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.height * (self.width * 2 + 1));
        for i in 0..self.height {
            for j in 0..self.width {
                if j != 0 {
                    text.push(' ');
                }
                text.push_str(&self.get(i, j).to_string());
            }
            text.push('\n');
        }
        text
    }

    /// Writes the text format to `path`, gzipping it if the name ends with `.gz`.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_text();
        let data = if is_gzip_path(path) {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(text.as_bytes())?;
            encoder
                .finish()
                .with_context(|| format!("Failed to compress {}", path.display()))?
        } else {
            text.into_bytes()
        };
        std::fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Fills a board randomly: every cell is alive with probability `density`
    /// and then gets a uniformly chosen species.
    ///
    /// # Arguments
    ///
    /// * `seed` - Seed for the random number generator. If None, seeds from the OS.
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero or `density` is outside `[0, 1]`.
    pub fn random(height: usize, width: usize, density: f64, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&density) {
            return Err(anyhow!("Density {} is outside of [0, 1]", density));
        }
        let board = Self::blank(height, width)?;
        let mut rng = if let Some(x) = seed {
            rand_chacha::ChaCha8Rng::seed_from_u64(x)
        } else {
            rand_chacha::ChaCha8Rng::from_os_rng()
        };
        for cell in board.cells.iter() {
            if rng.random_bool(density) {
                cell.store(rng.random_range(1..=SPECIES_COUNT), Ordering::Relaxed);
            }
        }
        Ok(board)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        assert!(
            i < self.height && j < self.width,
            "Cell ({}, {}) is outside of the {}x{} board",
            i,
            j,
            self.height,
            self.width
        );
        i * self.width + j
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Species {
        self.cells[self.index(i, j)].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_alive(&self, i: usize, j: usize) -> bool {
        self.get(i, j) > 0
    }

    /// Stores `value` at `(i, j)`.
    ///
    /// Callers running concurrently must write disjoint cells.
    #[inline]
    pub fn set(&self, i: usize, j: usize, value: Species) {
        debug_assert!(value <= SPECIES_COUNT);
        self.cells[self.index(i, j)].store(value, Ordering::Relaxed);
    }

    pub fn rows(&self) -> Vec<Vec<Species>> {
        (0..self.height)
            .map(|i| (0..self.width).map(|j| self.get(i, j)).collect())
            .collect()
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.load(Ordering::Relaxed) > 0)
            .count()
    }

    /// Number of cells of every value; index 0 counts the dead cells.
    pub fn species_census(&self) -> [usize; SPECIES_COUNT as usize + 1] {
        let mut census = [0; SPECIES_COUNT as usize + 1];
        for cell in self.cells.iter() {
            census[cell.load(Ordering::Relaxed) as usize] += 1;
        }
        census
    }
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

impl Clone for Board {
    fn clone(&self) -> Self {
        let cells = self
            .cells
            .iter()
            .map(|c| AtomicU8::new(c.load(Ordering::Relaxed)))
            .collect();
        Self {
            height: self.height,
            width: self.width,
            cells,
        }
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.height == other.height
            && self.width == other.width
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(a, b)| a.load(Ordering::Relaxed) == b.load(Ordering::Relaxed))
    }
}

impl Eq for Board {}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {}x{}", self.height, self.width)?;
        f.write_str(&self.to_text())
    }
}

/// Two board buffers and the index of the one holding the current state.
///
/// Phases read the current slot and write the other one; a swap flips the
/// index and never copies cells. Handing out the buffers as `Arc`s lets jobs
/// own their references while they run, and the swap checks that all of them
/// have been released.
pub struct BoardSlots {
    slots: [Arc<Board>; 2],
    current: usize,
}

impl BoardSlots {
    /// Uses `board` as the current state and a copy of it as the other buffer.
    pub fn new(board: Board) -> Self {
        let next = board.clone();
        Self {
            slots: [Arc::new(board), Arc::new(next)],
            current: 0,
        }
    }

    pub fn current(&self) -> &Arc<Board> {
        &self.slots[self.current]
    }

    pub fn next(&self) -> &Arc<Board> {
        &self.slots[self.current ^ 1]
    }

    /// Makes the `next` buffer current.
    ///
    /// # Panics
    ///
    /// Panics if any other handle to either buffer is still alive, which would
    /// mean a job outlived the phase it belonged to.
    pub fn swap(&mut self) {
        assert!(
            self.slots.iter().all(|b| Arc::strong_count(b) == 1),
            "Board buffer swapped while still referenced by a job"
        );
        self.current ^= 1;
    }

    pub fn height(&self) -> usize {
        self.slots[0].height()
    }

    pub fn width(&self) -> usize {
        self.slots[0].width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const SEED: u64 = 42;

    #[test]
    fn parse_text() {
        let board = Board::from_text("0 1 2\n\n3 0 7\n").unwrap();
        assert_eq!(board.height(), 2);
        assert_eq!(board.width(), 3);
        assert_eq!(board.rows(), vec![vec![0, 1, 2], vec![3, 0, 7]]);
        assert_eq!(board.population(), 4);
        assert_eq!(board.to_text(), "0 1 2\n3 0 7\n");
    }

    #[test]
    fn reject_malformed_boards() {
        assert!(Board::from_text("").is_err());
        assert!(Board::from_text("0 1\n0\n").is_err());
        assert!(Board::from_text("0 8\n").is_err());
        assert!(Board::from_text("0 -1\n").is_err());
        assert!(Board::from_text("0 x\n").is_err());
        assert!(Board::blank(0, 3).is_err());
        assert!(Board::random(3, 3, 1.5, Some(SEED)).is_err());
    }

    #[test]
    fn random_is_deterministic_with_seed() {
        let a = Board::random(20, 30, 0.4, Some(SEED)).unwrap();
        let b = Board::random(20, 30, 0.4, Some(SEED)).unwrap();
        assert_eq!(a, b);
        assert!(a.rows().iter().flatten().all(|&v| v <= SPECIES_COUNT));

        let full = Board::random(4, 4, 1.0, Some(SEED)).unwrap();
        assert_eq!(full.population(), 16);
        let empty = Board::random(4, 4, 0.0, Some(SEED)).unwrap();
        assert_eq!(empty.population(), 0);
    }

    #[test]
    fn census_counts_every_cell() {
        let board = Board::from_text("1 1 0\n2 0 7\n").unwrap();
        let census = board.species_census();
        assert_eq!(census[0], 2);
        assert_eq!(census[1], 2);
        assert_eq!(census[2], 1);
        assert_eq!(census[7], 1);
        assert_eq!(census.iter().sum::<usize>(), 6);
    }

    #[test]
    fn file_roundtrip_plain_and_gzip() {
        let dir = std::env::temp_dir().join(format!("multilife-board-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let board = Board::random(9, 13, 0.5, Some(SEED)).unwrap();
        for name in ["board.txt", "board.txt.gz"] {
            let path = dir.join(name);
            board.to_file(&path).unwrap();
            assert_eq!(Board::from_file(&path).unwrap(), board);
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Board::from_file("/nonexistent/multilife.txt").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/multilife.txt"));
    }

    #[test]
    fn slots_swap_without_copying() {
        let mut slots = BoardSlots::new(Board::from_text("1 0\n0 0\n").unwrap());
        let first = Arc::as_ptr(slots.current());
        slots.next().set(1, 1, 5);
        slots.swap();
        assert_eq!(Arc::as_ptr(slots.next()), first);
        assert_eq!(slots.current().get(1, 1), 5);
        assert_eq!(slots.current().get(0, 0), 1);
    }

    #[test]
    #[should_panic(expected = "still referenced")]
    fn swap_with_outstanding_reference_panics() {
        let mut slots = BoardSlots::new(Board::blank(2, 2).unwrap());
        let _held = Arc::clone(slots.next());
        slots.swap();
    }
}
