use serde::{Deserialize, Serialize};

use crate::lines::{self, Line};
use crate::GameError;

/// Maximum live marks a side may hold under the infinite rule.
pub const MAX_LIVE_MARKS: usize = 3;

const CLASSIC_OPENINGS: [usize; 5] = [0, 2, 6, 8, 4];
const SCORING_OPENINGS: [usize; 9] = [6, 7, 8, 11, 12, 13, 16, 17, 18];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    X,
    O,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::X => Side::O,
            Side::O => Side::X,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Side::X => 'X',
            Side::O => 'O',
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Mark(Side),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::Mark(side) => Some(side),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// 3x3, first line wins.
    Classic,
    /// 5x5, most completed three-in-a-rows wins.
    Scoring,
    /// 3x3, at most three live marks per side with FIFO eviction.
    Infinite,
}

impl Variant {
    pub fn board_len(self) -> usize {
        match self {
            Variant::Classic | Variant::Infinite => 9,
            Variant::Scoring => 25,
        }
    }

    pub fn lines(self) -> &'static [Line] {
        match self {
            Variant::Classic | Variant::Infinite => lines::classic(),
            Variant::Scoring => lines::scoring(),
        }
    }

    pub fn evicts(self) -> bool {
        matches!(self, Variant::Infinite)
    }

    /// Plies searched below the candidate move.
    pub fn depth_limit(self, difficulty: Difficulty) -> usize {
        match (self, difficulty) {
            (Variant::Classic, Difficulty::Easy) => 2,
            (Variant::Classic, Difficulty::Hard) => 6,
            (Variant::Scoring, _) => 3,
            (Variant::Infinite, Difficulty::Easy) => 2,
            (Variant::Infinite, Difficulty::Hard) => 8,
        }
    }

    /// Strong cells picked from at random on an empty board.
    pub fn opening_cells(self) -> &'static [usize] {
        match self {
            Variant::Classic | Variant::Infinite => &CLASSIC_OPENINGS,
            Variant::Scoring => &SCORING_OPENINGS,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Hard,
}

/// Parses one character per cell: `X`, `O`, and `.`, `_` or `-` for empty.
pub fn parse_board(text: &str, variant: Variant) -> Result<Vec<Cell>, GameError> {
    let mut cells = Vec::with_capacity(variant.board_len());
    for (position, ch) in text.trim().chars().enumerate() {
        let cell = match ch {
            'X' | 'x' => Cell::Mark(Side::X),
            'O' | 'o' => Cell::Mark(Side::O),
            '.' | '_' | '-' => Cell::Empty,
            _ => {
                return Err(GameError::ParseBoard {
                    position,
                    reason: format!("expected X, O or '.', found {ch}"),
                })
            }
        };
        cells.push(cell);
    }
    if cells.len() != variant.board_len() {
        return Err(GameError::BoardLength {
            variant,
            expected: variant.board_len(),
            found: cells.len(),
        });
    }
    Ok(cells)
}

pub fn format_board(cells: &[Cell]) -> String {
    cells
        .iter()
        .map(|cell| match cell {
            Cell::Empty => '.',
            Cell::Mark(side) => side.symbol(),
        })
        .collect()
}
