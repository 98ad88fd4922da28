use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tictactoe::{
    evaluate, find_best_move, Cell, Difficulty, Outcome, Position, Side, Variant, MAX_LIVE_MARKS,
};

/// Plays out a game from `position` with `x` and `o` picking moves, capped at
/// `max_plies`. Returns the final position and outcome.
fn play_out(
    mut position: Position,
    mut to_move: Side,
    x: Difficulty,
    o: Difficulty,
    max_plies: usize,
) -> (Position, Outcome) {
    let mut rng = SmallRng::seed_from_u64(11);
    for _ in 0..max_plies {
        let outcome = evaluate(position.cells(), position.variant());
        if outcome.is_over() {
            return (position, outcome);
        }
        let difficulty = match to_move {
            Side::X => x,
            Side::O => o,
        };
        let index = find_best_move(&position, to_move, difficulty, &mut rng)
            .expect("open cell must exist while the game is ongoing");
        position.apply(to_move, index);
        assert_live_marks_match(&position);
        to_move = to_move.opponent();
    }
    let outcome = evaluate(position.cells(), position.variant());
    (position, outcome)
}

fn assert_live_marks_match(position: &Position) {
    for side in [Side::X, Side::O] {
        let history = position.histories().of(side);
        for &idx in history {
            assert_eq!(position.cells()[idx], Cell::Mark(side));
        }
        if position.variant().evicts() {
            let live = position
                .cells()
                .iter()
                .filter(|&&c| c == Cell::Mark(side))
                .count();
            assert_eq!(live, history.len());
            assert!(live <= MAX_LIVE_MARKS, "{side:?} holds {live} marks");
        }
    }
}

fn opened_at(variant: Variant, index: usize) -> Position {
    let mut position = Position::empty(variant);
    position.apply(Side::X, index);
    position
}

#[test]
fn hard_classic_self_play_is_a_draw() {
    for &opening in Variant::Classic.opening_cells() {
        let (position, outcome) = play_out(
            opened_at(Variant::Classic, opening),
            Side::O,
            Difficulty::Hard,
            Difficulty::Hard,
            9,
        );
        assert_eq!(outcome, Outcome::Draw, "opening {opening}: {}", position.render());
    }
}

#[test]
fn hard_classic_never_loses_to_easy() {
    for &opening in Variant::Classic.opening_cells() {
        let (position, outcome) = play_out(
            opened_at(Variant::Classic, opening),
            Side::O,
            Difficulty::Easy,
            Difficulty::Hard,
            9,
        );
        assert!(
            !matches!(outcome, Outcome::Win { side: Side::X, .. }),
            "opening {opening}: {}",
            position.render()
        );
    }
}

#[test]
fn self_play_from_empty_board_is_a_draw() {
    let (position, outcome) = play_out(
        Position::empty(Variant::Classic),
        Side::X,
        Difficulty::Hard,
        Difficulty::Hard,
        9,
    );
    assert_eq!(outcome, Outcome::Draw, "{}", position.render());
}

#[test]
fn infinite_self_play_keeps_three_live_marks() {
    for &opening in Variant::Infinite.opening_cells() {
        let (position, _) = play_out(
            opened_at(Variant::Infinite, opening),
            Side::O,
            Difficulty::Hard,
            Difficulty::Easy,
            30,
        );
        assert_live_marks_match(&position);
    }
}

#[test]
fn scoring_game_ends_with_one_open_cell() {
    let (position, outcome) = play_out(
        opened_at(Variant::Scoring, 12),
        Side::O,
        Difficulty::Easy,
        Difficulty::Hard,
        30,
    );
    assert_eq!(position.empty_count(), 1);
    let tally = tictactoe::count_three_in_a_row(position.cells());
    match outcome {
        Outcome::Decided { scores, .. } => assert_eq!(scores, tally.scores),
        other => panic!("expected decided outcome, got {other:?}"),
    }
}

#[test]
fn undo_inverts_apply_along_random_games() {
    let mut rng = SmallRng::seed_from_u64(2024);
    for variant in [Variant::Classic, Variant::Scoring, Variant::Infinite] {
        for _ in 0..20 {
            let mut position = Position::empty(variant);
            let mut side = Side::X;
            for _ in 0..60 {
                if evaluate(position.cells(), variant).is_over() {
                    break;
                }
                let open = position.open_cells();
                for &idx in &open {
                    let before = position.clone();
                    let placement = position.apply(side, idx);
                    position.undo(side, placement);
                    assert_eq!(position, before);
                }
                let &idx = open.choose(&mut rng).unwrap();
                position.apply(side, idx);
                side = side.opponent();
            }
        }
    }
}
