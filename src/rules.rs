//! Per-cell update rules of the two phases and their row-range kernels.
//!
//! Neighbourhoods are the 8 surrounding cells clipped to the board: cells
//! outside of the grid neither count as live nor take part in any average.
use crate::{Board, Species, SPECIES_COUNT};
use std::ops::RangeInclusive;

#[inline]
fn for_each_neighbor(board: &Board, i: usize, j: usize, mut f: impl FnMut(Species)) {
    let rows = i.saturating_sub(1)..=(i + 1).min(board.height() - 1);
    for m in rows {
        let cols = j.saturating_sub(1)..=(j + 1).min(board.width() - 1);
        for n in cols {
            if m != i || n != j {
                f(board.get(m, n));
            }
        }
    }
}

/// Number of live cells among the neighbours of `(i, j)`.
pub fn live_neighbors(board: &Board, i: usize, j: usize) -> u32 {
    let mut count = 0;
    for_each_neighbor(board, i, j, |s| count += u32::from(s > 0));
    count
}

/// B3/S23 liveness of `(i, j)` in the next generation.
pub fn is_alive_after(board: &Board, i: usize, j: usize) -> bool {
    let count = live_neighbors(board, i, j);
    if board.is_alive(i, j) {
        count == 2 || count == 3
    } else {
        count == 3
    }
}

/// Species of a cell born at `(i, j)`.
///
/// Every neighbour adds its own species id to that species' weight, so a
/// single neighbour of species 6 outweighs two of species 2. The heaviest
/// species wins; ties go to the lowest id.
pub fn dominant_species(board: &Board, i: usize, j: usize) -> Species {
    let mut weights = [0u32; SPECIES_COUNT as usize + 1];
    for_each_neighbor(board, i, j, |s| weights[s as usize] += u32::from(s));

    let mut best = 0;
    for s in 1..weights.len() {
        if weights[s] > weights[best] {
            best = s;
        }
    }
    best as Species
}

/// Phase 1 value of `(i, j)`: survivors keep their species, births take the
/// dominant species of their neighbourhood, everything else dies.
pub fn phase1_cell(board: &Board, i: usize, j: usize) -> Species {
    if !is_alive_after(board, i, j) {
        0
    } else if board.is_alive(i, j) {
        board.get(i, j)
    } else {
        dominant_species(board, i, j)
    }
}

/// Phase 2 value of `(i, j)`: a live cell takes the rounded mean species of
/// itself and its live neighbours. Halves round away from zero.
pub fn phase2_cell(board: &Board, i: usize, j: usize) -> Species {
    let own = board.get(i, j);
    if own == 0 {
        return 0;
    }
    let mut sum = u32::from(own);
    let mut alive = 1u32;
    for_each_neighbor(board, i, j, |s| {
        if s > 0 {
            sum += u32::from(s);
            alive += 1;
        }
    });
    (f64::from(sum) / f64::from(alive)).round() as Species
}

fn apply_rows(
    src: &Board,
    dst: &Board,
    rows: RangeInclusive<usize>,
    cell: fn(&Board, usize, usize) -> Species,
) {
    assert!(
        src.height() == dst.height() && src.width() == dst.width(),
        "Source and destination boards differ in shape"
    );
    assert!(
        rows.start() <= rows.end() && *rows.end() < src.height(),
        "Row range {:?} does not fit a board of height {}",
        rows,
        src.height()
    );
    for i in rows {
        for j in 0..src.width() {
            dst.set(i, j, cell(src, i, j));
        }
    }
}

/// Writes Phase 1 of every cell in `rows` from `src` into `dst`.
pub fn phase1_rows(src: &Board, dst: &Board, rows: RangeInclusive<usize>) {
    apply_rows(src, dst, rows, phase1_cell);
}

/// Writes Phase 2 of every cell in `rows` from `src` into `dst`.
pub fn phase2_rows(src: &Board, dst: &Board, rows: RangeInclusive<usize>) {
    apply_rows(src, dst, rows, phase2_cell);
}

/// Runs one full generation on the calling thread and returns the result.
///
/// Used as the sequential reference for the parallel engine.
pub fn step_sequential(board: &Board) -> Board {
    let all_rows = 0..=board.height() - 1;
    let after_phase1 = board.clone();
    phase1_rows(board, &after_phase1, all_rows.clone());
    let after_phase2 = after_phase1.clone();
    phase2_rows(&after_phase1, &after_phase2, all_rows);
    after_phase2
}
