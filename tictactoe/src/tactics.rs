//! One-ply tactical shortcut used by the easy tier.
use crate::board::Side;
use crate::lines::lines_through;
use crate::position::Position;
use crate::rules::line_owner;

/// Winning cell for `side` if one exists, otherwise a cell that stops the
/// opponent from winning next turn.
pub fn immediate_move(position: &mut Position, side: Side) -> Option<usize> {
    winning_cell(position, side).or_else(|| winning_cell(position, side.opponent()))
}

/// Lowest open index where `side` would complete a line.
pub fn winning_cell(position: &mut Position, side: Side) -> Option<usize> {
    position
        .open_cells()
        .into_iter()
        .find(|&idx| completes_line(position, side, idx))
}

/// Whether placing `side` on `index` completes a line through that cell.
/// Simulated so an eviction the placement triggers is taken into account.
pub fn completes_line(position: &mut Position, side: Side, index: usize) -> bool {
    let placement = position.apply(side, index);
    let hit = lines_through(position.variant(), index)
        .any(|line| line_owner(position.cells(), line) == Some(side));
    position.undo(side, placement);
    hit
}
