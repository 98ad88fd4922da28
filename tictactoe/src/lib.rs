//! Tic-tac-toe rules and minimax opponent for three variants: classic 3x3,
//! the 5x5 "most three-in-a-rows" game and the infinite 3x3 game where each
//! side keeps at most three marks and the oldest one disappears.
//!
//! The engine is stateless between calls: callers send a board snapshot,
//! the per-side move histories and the side to move, and get back a move
//! index or a verdict. The request/response types at the crate root are the
//! JSON surface the server exposes.
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod board;
pub mod lines;
pub mod position;
pub mod rules;
pub mod search;
pub mod tactics;

pub use board::{format_board, parse_board, Cell, Difficulty, Side, Variant, MAX_LIVE_MARKS};
pub use lines::Line;
pub use position::{Histories, Placement, Position};
pub use rules::{count_three_in_a_row, evaluate, Outcome, Scores, Tally};
pub use search::{analyze, find_best_move, SearchReport, SearchStats};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid board at position {position}: {reason}")]
    ParseBoard { position: usize, reason: String },
    #[error("{variant:?} board needs {expected} cells, found {found}")]
    BoardLength {
        variant: Variant,
        expected: usize,
        found: usize,
    },
    #[error("inconsistent history for {side:?}: {reason}")]
    History { side: Side, reason: String },
    #[error("cell {index} is already occupied")]
    Occupied { index: usize },
    #[error("cell {index} is out of bounds for a board of {len}")]
    OutOfBounds { index: usize, len: usize },
    #[error("game is already over")]
    GameOver,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub board: String,
    pub side: Side,
    pub variant: Variant,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub histories: Histories,
    /// Seeds the opening pick; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    /// `None` when the board has no empty cell.
    pub index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    pub board: String,
    pub variant: Variant,
    pub side: Side,
    pub index: usize,
    #[serde(default)]
    pub histories: Histories,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayResponse {
    pub board: String,
    pub histories: Histories,
    pub evicted: Option<usize>,
    pub outcome: Outcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub board: String,
    pub variant: Variant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub outcome: Outcome,
    /// Running line counts; only filled for the scoring variant.
    pub tally: Option<Tally>,
}

pub fn best_move(request: MoveRequest) -> Result<MoveResponse, GameError> {
    let cells = parse_board(&request.board, request.variant)?;
    let position = Position::new(request.variant, cells, request.histories)?;
    let mut rng = match request.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let index = find_best_move(&position, request.side, request.difficulty, &mut rng);
    Ok(MoveResponse { index })
}

/// Applies one placement with the same rule the search simulates.
pub fn play(request: PlayRequest) -> Result<PlayResponse, GameError> {
    let cells = parse_board(&request.board, request.variant)?;
    let mut position = Position::new(request.variant, cells, request.histories)?;
    if evaluate(position.cells(), request.variant).is_over() {
        return Err(GameError::GameOver);
    }
    let placement = position.try_apply(request.side, request.index)?;
    let outcome = evaluate(position.cells(), request.variant);
    let board = position.render();
    let (_, histories) = position.into_parts();
    Ok(PlayResponse {
        board,
        histories,
        evicted: placement.evicted,
        outcome,
    })
}

pub fn evaluate_board(request: EvaluateRequest) -> Result<EvaluateResponse, GameError> {
    let cells = parse_board(&request.board, request.variant)?;
    let outcome = evaluate(&cells, request.variant);
    let tally = (request.variant == Variant::Scoring).then(|| count_three_in_a_row(&cells));
    Ok(EvaluateResponse { outcome, tally })
}
