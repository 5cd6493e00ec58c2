//! End-to-end exercises of the rule kernel, search and engine wrapper.

use std::cell::RefCell;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use ninuki::board::{Pos, Position, Stone};
use ninuki::engine::{self, notation, refresh_pending_win};
use ninuki::eval::{evaluate, Score};
use ninuki::rules::{apply_move, check_win, find_captures, is_legal_move};
use ninuki::search::zobrist;
use ninuki::{Engine, SearchObserver, Searcher};

#[test]
fn capture_fires_only_with_the_bracket() {
    let mut pos = Position::new();

    // Adjacent own stone, no far bracket: X X O O stays on the board.
    apply_move(&mut pos, Pos::new(9, 7)).unwrap(); // Black
    apply_move(&mut pos, Pos::new(9, 9)).unwrap(); // White
    apply_move(&mut pos, Pos::new(9, 8)).unwrap(); // Black
    apply_move(&mut pos, Pos::new(9, 10)).unwrap(); // White
    assert_eq!(pos.get(Pos::new(9, 9)), Stone::White);
    assert_eq!(pos.get(Pos::new(9, 10)), Stone::White);
    assert_eq!(pos.captures(Stone::Black), 0);
    assert_eq!(pos.captures(Stone::White), 0);
}

#[test]
fn simple_capture_resolves_and_rehashes() {
    let mut pos = Position::new();

    // Black 9,9 / White 9,10 / Black far / White 9,11 / Black 9,12 closes
    // the bracket.
    apply_move(&mut pos, Pos::new(9, 9)).unwrap();
    apply_move(&mut pos, Pos::new(9, 10)).unwrap();
    apply_move(&mut pos, Pos::new(0, 0)).unwrap();
    apply_move(&mut pos, Pos::new(9, 11)).unwrap();
    let applied = apply_move(&mut pos, Pos::new(9, 12)).unwrap();

    assert_eq!(applied.captured.len(), 2);
    assert!(applied.captured.contains(&Pos::new(9, 10)));
    assert!(applied.captured.contains(&Pos::new(9, 11)));
    assert!(pos.is_empty(Pos::new(9, 10)));
    assert!(pos.is_empty(Pos::new(9, 11)));
    assert_eq!(pos.captures(Stone::Black), 1);
    assert_eq!(pos.hash, zobrist::tables().full_hash(&pos));
}

#[test]
fn double_three_is_rejected() {
    let mut pos = Position::new();
    // Black builds a square; White answers far away. The square's centre
    // completes a free-three on both diagonals at once.
    for mv in [
        Pos::new(9, 9),
        Pos::new(0, 0),
        Pos::new(9, 11),
        Pos::new(0, 2),
        Pos::new(11, 9),
        Pos::new(0, 4),
        Pos::new(11, 11),
        Pos::new(0, 6),
    ] {
        apply_move(&mut pos, mv).unwrap();
    }

    assert_eq!(pos.side_to_move, Stone::Black);
    assert!(!is_legal_move(&pos, Pos::new(10, 10)));
    assert!(apply_move(&mut pos.clone(), Pos::new(10, 10)).is_err());

    // A single free-three stays legal.
    assert!(is_legal_move(&pos, Pos::new(9, 10)));
    assert!(apply_move(&mut pos.clone(), Pos::new(9, 10)).is_ok());
}

#[test]
fn tenth_captured_pair_wins() {
    let mut pos = Position::new();
    pos.add_captures(Stone::White, 9);
    pos.place(Pos::new(5, 7), Stone::Black);
    pos.place(Pos::new(5, 8), Stone::Black);
    pos.place(Pos::new(5, 9), Stone::White);
    pos.side_to_move = Stone::White;
    pos.rehash();

    let applied = apply_move(&mut pos, Pos::new(5, 6)).unwrap();
    assert_eq!(applied.captured.len(), 2);
    assert!(applied.wins);
    assert_eq!(pos.captures(Stone::White), 10);
    assert!(check_win(&pos, Stone::White));
    assert!(engine::is_game_over(&pos));
    assert_eq!(engine::winner(&pos), Some(Stone::White));
}

/// White five on row 9 whose (8,10)-(9,10) pair Black can capture by
/// playing (7,10).
fn breakable_five() -> Position {
    let mut pos = Position::new();
    for col in 10..15 {
        pos.place(Pos::new(9, col), Stone::White);
    }
    pos.place(Pos::new(8, 10), Stone::White);
    pos.place(Pos::new(10, 10), Stone::Black);
    pos.side_to_move = Stone::Black;
    pos.turn = 13;
    pos.rehash();
    pos
}

#[test]
fn breakable_five_withholds_the_win() {
    let mut pos = breakable_five();
    refresh_pending_win(&mut pos);

    assert!(!check_win(&pos, Stone::White));
    assert!(!engine::is_game_over(&pos));
    assert_eq!(engine::winner(&pos), None);
    assert_eq!(pos.pending_win.targets, vec![Pos::new(7, 10)]);
}

#[test]
fn engine_answers_a_breakable_five_with_the_break() {
    let mut pos = breakable_five();
    refresh_pending_win(&mut pos);
    let targets = pos.pending_win.targets.clone();

    let mut engine = Engine::with_config(1024 * 1024, 2);
    let mv = engine.best_move(&pos).expect("a move must exist");
    assert!(
        targets.contains(&mv),
        "engine played {} instead of a break move",
        notation(mv)
    );

    // Taking the break removes a run stone and play continues.
    engine::apply_human_move(&mut pos, mv).unwrap();
    assert!(!engine::is_game_over(&pos));
    assert!(!check_win(&pos, Stone::White));
}

#[test]
fn ignoring_the_break_loses() {
    let mut pos = breakable_five();
    refresh_pending_win(&mut pos);

    engine::apply_human_move(&mut pos, Pos::new(0, 0)).unwrap();
    assert!(engine::is_game_over(&pos));
    assert_eq!(engine::winner(&pos), Some(Stone::White));
}

#[test]
fn faster_mate_scores_higher() {
    // Terminal scores shrink with distance from the root.
    let mut pos = Position::new();
    for col in 5..10 {
        pos.place(Pos::new(9, col), Stone::White);
    }
    pos.rehash();

    let mate_in_1 = evaluate(&pos, 5, 4);
    let mate_in_3 = evaluate(&pos, 5, 2);
    assert_eq!(mate_in_1, Score::WIN - 1);
    assert_eq!(mate_in_3, Score::WIN - 3);
    assert!(mate_in_1 > mate_in_3);
}

#[test]
fn engine_takes_the_immediate_mate() {
    // White can win this ply by completing the four; the slower plan of
    // building the second line must not distract it.
    let mut pos = Position::new();
    for col in 4..8 {
        pos.place(Pos::new(9, col), Stone::White);
    }
    pos.place(Pos::new(9, 3), Stone::Black);
    for col in 4..7 {
        pos.place(Pos::new(12, col), Stone::White);
    }
    pos.place(Pos::new(5, 5), Stone::Black);
    pos.place(Pos::new(6, 6), Stone::Black);
    pos.side_to_move = Stone::White;
    pos.turn = 11;
    pos.rehash();

    let mut engine = Engine::with_config(1024 * 1024, 5);
    let mv = engine.best_move(&pos).expect("a move must exist");
    assert_eq!(mv, Pos::new(9, 8), "engine played {}", notation(mv));
    assert!(engine.last_stats().score >= 100_000);
}

#[derive(Default)]
struct OrderLog {
    /// First root move searched per iteration.
    firsts: Vec<(i8, Pos)>,
    /// Iteration results.
    bests: Vec<(i8, Option<Pos>)>,
}

struct OrderRecorder {
    log: Rc<RefCell<OrderLog>>,
}

impl SearchObserver for OrderRecorder {
    fn root_move_searched(&mut self, depth: i8, mv: Pos, _score: i32) {
        let mut log = self.log.borrow_mut();
        if log.firsts.last().map(|&(d, _)| d) != Some(depth) {
            log.firsts.push((depth, mv));
        }
    }

    fn iteration_completed(&mut self, depth: i8, best: Option<Pos>, _score: i32) {
        self.log.borrow_mut().bests.push((depth, best));
    }
}

#[test]
fn deepening_seeds_the_previous_best_first() {
    let mut pos = Position::new();
    pos.place(Pos::new(9, 9), Stone::Black);
    pos.place(Pos::new(9, 10), Stone::White);
    pos.place(Pos::new(10, 9), Stone::Black);
    pos.place(Pos::new(10, 10), Stone::White);
    pos.side_to_move = Stone::Black;
    pos.turn = 12;
    pos.rehash();

    let log = Rc::new(RefCell::new(OrderLog::default()));
    let mut searcher = Searcher::new(1024 * 1024);
    searcher.set_observer(Box::new(OrderRecorder { log: log.clone() }));

    let result = searcher.best_move_iterative(&pos, 3);
    assert!(result.best_move.is_some());

    let log = log.borrow();
    assert!(log.bests.len() >= 2);
    for window in log.bests.windows(2) {
        let (prev_depth, prev_best) = window[0];
        let (next_depth, _) = window[1];
        let first_next = log
            .firsts
            .iter()
            .find(|&&(d, _)| d == next_depth)
            .map(|&(_, mv)| mv);
        assert_eq!(
            first_next, prev_best,
            "iteration {} did not start from the best move of iteration {}",
            next_depth, prev_depth
        );
    }
}

#[test]
fn random_playout_keeps_invariants() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut pos = Position::new();

    let mut plies = 0;
    while plies < 60 {
        // Pick any random legal cell.
        let mv = loop {
            let row = rng.gen_range(0..19) as u8;
            let col = rng.gen_range(0..19) as u8;
            let candidate = Pos::new(row, col);
            if is_legal_move(&pos, candidate) {
                break candidate;
            }
        };

        let mover = pos.side_to_move;
        let opponent = mover.opponent();
        let expected_captures = find_captures(&pos, mv, mover);
        for &cell in &expected_captures {
            assert_eq!(pos.get(cell), opponent);
        }

        let before = pos.clone();
        let applied = apply_move(&mut pos, mv).expect("legal move must apply");

        // Legality agreed with application; captures matched the pure
        // prediction and the cells are now empty.
        assert_eq!(applied.captured, expected_captures);
        for &cell in &applied.captured {
            assert!(pos.is_empty(cell));
        }
        assert_eq!(
            pos.captures(mover),
            before.captures(mover) + (applied.captured.len() / 2) as u8
        );
        if pos.captures(mover) >= 10 {
            assert!(applied.wins);
        }

        // The incremental hash tracks a full recomputation, and reverting
        // the update restores the parent hash.
        assert_eq!(pos.hash, zobrist::tables().full_hash(&pos));
        let reverted = zobrist::tables().revert_move(
            pos.hash,
            mv,
            mover,
            &applied.captured,
            before.captures(mover),
            pos.captures(mover),
        );
        assert_eq!(reverted, before.hash);

        // Illegality also agrees with application.
        let occupied = mv;
        assert!(!is_legal_move(&pos, occupied));
        assert!(apply_move(&mut pos.clone(), occupied).is_err());

        plies += 1;
        if applied.wins {
            break;
        }
    }
}

#[test]
fn stats_flow_through_the_engine() {
    let mut engine = Engine::with_config(1024 * 1024, 2);
    let mut pos = Position::new();

    engine::apply_human_move(&mut pos, Pos::new(9, 9)).unwrap();
    let reply = engine.apply_engine_move(&mut pos).expect("engine reply");
    assert_eq!(pos.get(reply), Stone::White);

    let stats = engine.last_stats();
    assert!(stats.nodes > 0);
    assert!(stats.cache_entries > 0);
    assert!(stats.fill_rate > 0.0);
    assert!(stats.hit_rate >= 0.0);
}
