//! Board plus per-side move queues, and the placement rule that mutates them.
//!
//! [`Position::apply`] and [`Position::undo`] form a strict stack: every
//! `apply` the search performs is reversed by exactly one `undo` with the
//! returned [`Placement`], restoring cells and histories bit for bit.
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::board::{format_board, Cell, Side, Variant, MAX_LIVE_MARKS};
use crate::GameError;

/// Indices each side currently occupies, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histories {
    #[serde(default)]
    pub x: VecDeque<usize>,
    #[serde(default)]
    pub o: VecDeque<usize>,
}

impl Histories {
    pub fn of(&self, side: Side) -> &VecDeque<usize> {
        match side {
            Side::X => &self.x,
            Side::O => &self.o,
        }
    }

    fn of_mut(&mut self, side: Side) -> &mut VecDeque<usize> {
        match side {
            Side::X => &mut self.x,
            Side::O => &mut self.o,
        }
    }
}

/// Record of one `apply`, needed to undo it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub index: usize,
    pub evicted: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    variant: Variant,
    cells: Vec<Cell>,
    histories: Histories,
}

impl Position {
    pub fn empty(variant: Variant) -> Self {
        Self {
            variant,
            cells: vec![Cell::Empty; variant.board_len()],
            histories: Histories::default(),
        }
    }

    /// Builds a position from caller-supplied state, checking it is one the
    /// simulator could have produced.
    pub fn new(variant: Variant, cells: Vec<Cell>, histories: Histories) -> Result<Self, GameError> {
        if cells.len() != variant.board_len() {
            return Err(GameError::BoardLength {
                variant,
                expected: variant.board_len(),
                found: cells.len(),
            });
        }
        for side in [Side::X, Side::O] {
            let history = histories.of(side);
            for (pos, &index) in history.iter().enumerate() {
                if cells.get(index) != Some(&Cell::Mark(side)) {
                    return Err(GameError::History {
                        side,
                        reason: format!("entry {index} does not hold a {} mark", side.symbol()),
                    });
                }
                if history.iter().skip(pos + 1).any(|&other| other == index) {
                    return Err(GameError::History {
                        side,
                        reason: format!("entry {index} is listed twice"),
                    });
                }
            }
            if variant.evicts() {
                let live = cells.iter().filter(|&&c| c == Cell::Mark(side)).count();
                if history.len() != live {
                    return Err(GameError::History {
                        side,
                        reason: format!("{} entries for {live} marks on the board", history.len()),
                    });
                }
                if live > MAX_LIVE_MARKS {
                    return Err(GameError::History {
                        side,
                        reason: format!("{live} live marks exceed the limit of {MAX_LIVE_MARKS}"),
                    });
                }
            }
        }
        Ok(Self {
            variant,
            cells,
            histories,
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn histories(&self) -> &Histories {
        &self.histories
    }

    pub fn into_parts(self) -> (Vec<Cell>, Histories) {
        (self.cells, self.histories)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    /// Empty cells in ascending index order.
    pub fn open_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Places `side` on `index`, first evicting that side's oldest mark when
    /// the infinite rule is active and it already holds the maximum.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds or not empty.
    pub fn apply(&mut self, side: Side, index: usize) -> Placement {
        assert!(
            self.cells.get(index).is_some_and(|c| c.is_empty()),
            "placement on unavailable cell {index}"
        );
        let history = self.histories.of_mut(side);
        let evicted = if self.variant.evicts() && history.len() >= MAX_LIVE_MARKS {
            history.pop_front()
        } else {
            None
        };
        if let Some(old) = evicted {
            self.cells[old] = Cell::Empty;
        }
        history.push_back(index);
        self.cells[index] = Cell::Mark(side);
        Placement { index, evicted }
    }

    /// Reverses a placement returned by [`Position::apply`].
    pub fn undo(&mut self, side: Side, placement: Placement) {
        debug_assert_eq!(self.cells[placement.index], Cell::Mark(side));
        let history = self.histories.of_mut(side);
        let popped = history.pop_back();
        debug_assert_eq!(popped, Some(placement.index));
        self.cells[placement.index] = Cell::Empty;
        if let Some(old) = placement.evicted {
            history.push_front(old);
            self.cells[old] = Cell::Mark(side);
        }
    }

    /// Checked variant of [`Position::apply`] for untrusted input.
    pub fn try_apply(&mut self, side: Side, index: usize) -> Result<Placement, GameError> {
        match self.cells.get(index) {
            None => Err(GameError::OutOfBounds {
                index,
                len: self.cells.len(),
            }),
            Some(Cell::Mark(_)) => Err(GameError::Occupied { index }),
            Some(Cell::Empty) => Ok(self.apply(side, index)),
        }
    }

    pub fn render(&self) -> String {
        format_board(&self.cells)
    }
}
