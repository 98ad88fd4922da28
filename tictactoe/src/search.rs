//! Depth-limited minimax with alpha-beta pruning.
//!
//! The search owns a single working copy of the position and walks the tree
//! with [`Position::apply`] / [`Position::undo`], so every return path,
//! including pruned ones, leaves the copy as it found it. Moves are tried in
//! ascending index order and ties keep the first move found.
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::board::{Difficulty, Side, Variant};
use crate::position::Position;
use crate::rules::{classic_outcome, line_scores, scoring_finished, Outcome};
use crate::tactics;

/// Terminal score of a win found at depth 0.
const WIN_SCORE: i32 = 10;
/// Weight of one completed line in the scoring variant.
const LINE_WEIGHT: i32 = 10;
const INF: i32 = i32::MAX / 2;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchReport {
    pub best_move: Option<usize>,
    /// Minimax value of `best_move`; `None` when no search ran.
    pub score: Option<i32>,
    pub stats: SearchStats,
}

/// Picks a move for `side`. Returns `None` only when no cell is empty.
pub fn find_best_move<R: Rng + ?Sized>(
    position: &Position,
    side: Side,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<usize> {
    analyze(position, side, difficulty, rng).best_move
}

/// Same as [`find_best_move`] but also reports the score and search effort.
pub fn analyze<R: Rng + ?Sized>(
    position: &Position,
    side: Side,
    difficulty: Difficulty,
    rng: &mut R,
) -> SearchReport {
    let variant = position.variant();
    let mut report = SearchReport {
        best_move: None,
        score: None,
        stats: SearchStats::default(),
    };
    if position.empty_count() == 0 {
        return report;
    }
    if position.is_empty() {
        report.best_move = variant.opening_cells().choose(rng).copied();
        debug!(?variant, index = ?report.best_move, "opening move");
        return report;
    }

    let mut work = position.clone();
    if difficulty == Difficulty::Easy {
        if let Some(index) = tactics::immediate_move(&mut work, side) {
            debug!(?variant, index, "tactical shortcut");
            report.best_move = Some(index);
            return report;
        }
    }

    let mut searcher = Searcher {
        variant,
        me: side,
        limit: variant.depth_limit(difficulty),
        stats: SearchStats::default(),
    };
    if let Some((index, score)) = searcher.root(&mut work) {
        report.best_move = Some(index);
        report.score = Some(score);
    }
    report.stats = searcher.stats;
    debug_assert_eq!(&work, position, "search leaked state");
    debug!(
        ?variant,
        ?difficulty,
        index = ?report.best_move,
        score = ?report.score,
        nodes = report.stats.nodes,
        cutoffs = report.stats.cutoffs,
        "search finished"
    );
    report
}

struct Searcher {
    variant: Variant,
    me: Side,
    limit: usize,
    stats: SearchStats,
}

impl Searcher {
    fn root(&mut self, position: &mut Position) -> Option<(usize, i32)> {
        let mut best: Option<(usize, i32)> = None;
        let mut alpha = -INF;
        for index in position.open_cells() {
            let placement = position.apply(self.me, index);
            let score = self.minimax(position, 0, false, alpha, INF);
            position.undo(self.me, placement);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((index, score));
                alpha = alpha.max(score);
            }
        }
        best
    }

    fn minimax(
        &mut self,
        position: &mut Position,
        depth: usize,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.stats.nodes += 1;
        if let Some(score) = self.terminal_score(position, depth) {
            return score;
        }
        if depth >= self.limit {
            return self.cutoff_score(position);
        }

        let mover = if maximizing { self.me } else { self.me.opponent() };
        let mut best = if maximizing { -INF } else { INF };
        for index in position.open_cells() {
            let placement = position.apply(mover, index);
            let score = self.minimax(position, depth + 1, !maximizing, alpha, beta);
            position.undo(mover, placement);
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                self.stats.cutoffs += 1;
                break;
            }
        }
        best
    }

    fn terminal_score(&self, position: &Position, depth: usize) -> Option<i32> {
        let depth = depth as i32;
        match self.variant {
            Variant::Classic | Variant::Infinite => match classic_outcome(position.cells()) {
                Outcome::Win { side, .. } if side == self.me => Some(WIN_SCORE - depth),
                Outcome::Win { .. } => Some(depth - WIN_SCORE),
                Outcome::Draw => Some(0),
                _ => None,
            },
            Variant::Scoring => {
                scoring_finished(position.cells()).then(|| self.line_balance(position))
            }
        }
    }

    fn cutoff_score(&self, position: &Position) -> i32 {
        match self.variant {
            Variant::Scoring => self.line_balance(position),
            Variant::Classic | Variant::Infinite => 0,
        }
    }

    fn line_balance(&self, position: &Position) -> i32 {
        let scores = line_scores(position.cells());
        let own = scores.of(self.me) as i32;
        let theirs = scores.of(self.me.opponent()) as i32;
        (own - theirs) * LINE_WEIGHT
    }
}
