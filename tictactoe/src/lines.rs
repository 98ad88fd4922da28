//! Catalogs of scoring triples for each grid topology.
use once_cell::sync::Lazy;

use crate::board::Variant;

/// Three board indices that score when one side holds all of them.
pub type Line = [usize; 3];

const SCORING_SIDE: usize = 5;

const CLASSIC_LINES: [Line; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

static SCORING_LINES: Lazy<Vec<Line>> = Lazy::new(|| generate_runs(SCORING_SIDE));

pub fn classic() -> &'static [Line] {
    &CLASSIC_LINES
}

pub fn scoring() -> &'static [Line] {
    &SCORING_LINES
}

/// Lines of `variant` that contain `index`, in catalog order.
pub fn lines_through(variant: Variant, index: usize) -> impl Iterator<Item = &'static Line> {
    variant
        .lines()
        .iter()
        .filter(move |line| line.contains(&index))
}

/// Every run of three consecutive cells on a `side` x `side` grid.
fn generate_runs(side: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    // Horizontal
    for row in 0..side {
        for col in 0..=side - 3 {
            lines.push(run(row * side + col, 1));
        }
    }
    // Vertical
    for row in 0..=side - 3 {
        for col in 0..side {
            lines.push(run(row * side + col, side));
        }
    }
    // Diagonal \
    for row in 0..=side - 3 {
        for col in 0..=side - 3 {
            lines.push(run(row * side + col, side + 1));
        }
    }
    // Diagonal /
    for row in 0..=side - 3 {
        for col in 2..side {
            lines.push(run(row * side + col, side - 1));
        }
    }
    lines
}

fn run(start: usize, stride: usize) -> Line {
    [start, start + stride, start + 2 * stride]
}
