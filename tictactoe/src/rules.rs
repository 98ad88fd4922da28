//! Terminal detection and line counting.
use serde::{Deserialize, Serialize};

use crate::board::{Cell, Side, Variant};
use crate::lines::{self, Line};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Ongoing,
    Win { side: Side, line: Line },
    Draw,
    /// Scoring game over; `winner` is `None` on equal counts.
    Decided { scores: Scores, winner: Option<Side> },
}

impl Outcome {
    pub fn is_over(&self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub x: usize,
    pub o: usize,
}

impl Scores {
    pub fn of(&self, side: Side) -> usize {
        match side {
            Side::X => self.x,
            Side::O => self.o,
        }
    }

    fn bump(&mut self, side: Side) {
        match side {
            Side::X => self.x += 1,
            Side::O => self.o += 1,
        }
    }
}

/// Completed lines on a scoring board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub scores: Scores,
    pub lines: Vec<Line>,
}

/// Side holding every cell of `line`, if any.
pub fn line_owner(cells: &[Cell], line: &Line) -> Option<Side> {
    let side = cells[line[0]].side()?;
    (cells[line[1]] == Cell::Mark(side) && cells[line[2]] == Cell::Mark(side)).then_some(side)
}

/// First matching 3x3 line in catalog order wins; a full board without one
/// is a draw.
pub fn classic_outcome(cells: &[Cell]) -> Outcome {
    for line in lines::classic() {
        if let Some(side) = line_owner(cells, line) {
            return Outcome::Win { side, line: *line };
        }
    }
    if cells.iter().all(|c| !c.is_empty()) {
        Outcome::Draw
    } else {
        Outcome::Ongoing
    }
}

/// Counts every completed 5x5 line; overlapping lines each count.
pub fn count_three_in_a_row(cells: &[Cell]) -> Tally {
    let mut tally = Tally::default();
    for line in lines::scoring() {
        if let Some(side) = line_owner(cells, line) {
            tally.scores.bump(side);
            tally.lines.push(*line);
        }
    }
    tally
}

/// Per-side completed line counts without collecting the lines.
pub fn line_scores(cells: &[Cell]) -> Scores {
    let mut scores = Scores::default();
    for line in lines::scoring() {
        if let Some(side) = line_owner(cells, line) {
            scores.bump(side);
        }
    }
    scores
}

/// The scoring game ends once at most one cell is left open.
pub fn scoring_finished(cells: &[Cell]) -> bool {
    cells.iter().filter(|c| c.is_empty()).count() <= 1
}

pub fn scoring_outcome(cells: &[Cell]) -> Outcome {
    if !scoring_finished(cells) {
        return Outcome::Ongoing;
    }
    let scores = line_scores(cells);
    let winner = match scores.x.cmp(&scores.o) {
        std::cmp::Ordering::Greater => Some(Side::X),
        std::cmp::Ordering::Less => Some(Side::O),
        std::cmp::Ordering::Equal => None,
    };
    Outcome::Decided { scores, winner }
}

pub fn evaluate(cells: &[Cell], variant: Variant) -> Outcome {
    debug_assert_eq!(cells.len(), variant.board_len());
    match variant {
        Variant::Classic | Variant::Infinite => classic_outcome(cells),
        Variant::Scoring => scoring_outcome(cells),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::parse_board;

    #[test]
    fn top_row_wins() {
        let cells = parse_board("XXX......", Variant::Classic).unwrap();
        assert_eq!(
            classic_outcome(&cells),
            Outcome::Win {
                side: Side::X,
                line: [0, 1, 2]
            }
        );
    }

    #[test]
    fn full_board_without_line_is_draw() {
        let cells = parse_board("XOXXOOOXX", Variant::Classic).unwrap();
        assert_eq!(classic_outcome(&cells), Outcome::Draw);
    }

    #[test]
    fn open_board_is_ongoing() {
        let cells = parse_board("XO.......", Variant::Classic).unwrap();
        assert_eq!(evaluate(&cells, Variant::Infinite), Outcome::Ongoing);
    }

    #[test]
    fn first_line_in_catalog_order_is_reported() {
        // Both top rows are complete; only the earlier one is reported.
        let cells = parse_board("XXXOOO...", Variant::Infinite).unwrap();
        assert_eq!(
            classic_outcome(&cells),
            Outcome::Win {
                side: Side::X,
                line: [0, 1, 2]
            }
        );
    }

    #[test]
    fn counts_lines_per_side() {
        let cells = parse_board(
            "XXX..\
             .....\
             XXX..\
             .....\
             OOO..",
            Variant::Scoring,
        )
        .unwrap();
        let tally = count_three_in_a_row(&cells);
        assert_eq!(tally.scores, Scores { x: 2, o: 1 });
        assert_eq!(tally.lines, vec![[0, 1, 2], [10, 11, 12], [20, 21, 22]]);
    }

    #[test]
    fn overlapping_lines_count_independently() {
        // Four in a row holds two overlapping runs; the center column crosses it.
        let cells = parse_board(
            "..X..\
             ..X..\
             XXXX.\
             .....\
             .....",
            Variant::Scoring,
        )
        .unwrap();
        assert_eq!(count_three_in_a_row(&cells).scores, Scores { x: 3, o: 0 });
    }

    #[test]
    fn scoring_ends_with_one_cell_left() {
        let cells = parse_board(
            "XXOXO\
             XOOXX\
             OOXOO\
             XOXOX\
             O.XOX",
            Variant::Scoring,
        )
        .unwrap();
        assert_eq!(
            scoring_outcome(&cells),
            Outcome::Decided {
                scores: Scores { x: 1, o: 3 },
                winner: Some(Side::O)
            }
        );
    }

    #[test]
    fn scoring_with_two_open_cells_continues() {
        let cells = parse_board(
            "XXOXO\
             XOOXX\
             OOXOO\
             XOXOX\
             O.XO.",
            Variant::Scoring,
        )
        .unwrap();
        assert_eq!(scoring_outcome(&cells), Outcome::Ongoing);
    }

    #[test]
    fn equal_scores_are_a_draw() {
        let cells = parse_board(
            "XOXOX\
             OOO.O\
             XXOXX\
             XOXOO\
             XXOOX",
            Variant::Scoring,
        )
        .unwrap();
        assert_eq!(
            scoring_outcome(&cells),
            Outcome::Decided {
                scores: Scores { x: 2, o: 2 },
                winner: None
            }
        );
    }
}
