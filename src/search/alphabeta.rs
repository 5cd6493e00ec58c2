//! Iterative-deepening negamax search with alpha-beta pruning
//!
//! The searcher walks depths 1..=D, seeding each iteration's move ordering
//! with the previous best move. Nodes probe the transposition table first,
//! generate candidates near existing stones, order them with a quick static
//! rating plus killer/history tiebreakers, and recurse over cloned
//! positions. Scores are from the side to move (negamax); the evaluator's
//! White-perspective value is sign-adjusted at the leaves.

use std::time::{Duration, Instant};

use log::debug;

use crate::board::directions::{ALL_DIRECTIONS, LINE_DIRECTIONS};
use crate::board::{Pos, Position, Stone, BOARD_SIZE};
use crate::eval::heuristic::has_winning_threats;
use crate::eval::{evaluate, Score};
use crate::rules::{apply_move, check_win, is_legal_move};

use super::tt::{Bound, TranspositionTable, TtStats, DEFAULT_TT_BYTES};

/// Alpha-beta window bound, above any reachable evaluation.
const INF: i32 = 2_000_000;

/// Iterative deepening stops early past this magnitude.
const MATE_THRESHOLD: i32 = 90_000;

/// Quick-rating value for a move that wins outright.
const ORDER_WIN: i32 = 100_000;

/// Killer move slots are kept for this many plies.
const MAX_PLY: usize = 20;

/// Search result with statistics.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move found; `None` when no candidate existed.
    pub best_move: Option<Pos>,
    /// Score of the best move, from the side to move.
    pub score: i32,
    /// Deepest completed iteration.
    pub depth: i8,
    /// Nodes visited.
    pub nodes: u64,
    /// Transposition probes that hit.
    pub cache_hits: u64,
    /// Wall time of the whole call.
    pub elapsed: Duration,
}

/// Hooks into the search, for logging or inspection. All methods default to
/// no-ops; the engine's statistics do not depend on an observer being set.
pub trait SearchObserver {
    /// A root candidate finished its subtree at the given iteration depth.
    fn root_move_searched(&mut self, _depth: i8, _mv: Pos, _score: i32) {}
    /// An iteration completed.
    fn iteration_completed(&mut self, _depth: i8, _best: Option<Pos>, _score: i32) {}
}

/// A candidate move with its ordering rating.
#[derive(Debug, Clone, Copy)]
struct ScoredMove {
    mv: Pos,
    rating: i32,
    /// Whether the move defuses an opponent mate-in-1 threat; such moves
    /// survive the candidate cap unconditionally.
    neutralizes: bool,
}

/// Iterative-deepening alpha-beta searcher.
///
/// Holds the transposition table and the ordering heuristics; all state is
/// per-instance. One searcher serves one caller at a time.
pub struct Searcher {
    tt: TranspositionTable,
    history: [[i32; BOARD_SIZE]; BOARD_SIZE],
    killers: [[Option<Pos>; 2]; MAX_PLY],
    previous_best: Option<Pos>,
    nodes: u64,
    cache_hits: u64,
    observer: Option<Box<dyn SearchObserver>>,
}

impl Searcher {
    /// Searcher with a transposition table of the given byte budget.
    #[must_use]
    pub fn new(tt_bytes: usize) -> Self {
        Self {
            tt: TranspositionTable::new(tt_bytes),
            history: [[0; BOARD_SIZE]; BOARD_SIZE],
            killers: [[None; 2]; MAX_PLY],
            previous_best: None,
            nodes: 0,
            cache_hits: 0,
            observer: None,
        }
    }

    /// Searcher with the default 64 MiB table.
    #[must_use]
    pub fn with_default_table() -> Self {
        Self::new(DEFAULT_TT_BYTES)
    }

    /// Install an observer receiving root-move and iteration callbacks.
    pub fn set_observer(&mut self, observer: Box<dyn SearchObserver>) {
        self.observer = Some(observer);
    }

    /// Find the best move by iterative deepening up to `max_depth`.
    ///
    /// Opening positions with at most two stones are capped at depth 4;
    /// there is nothing deep to find there. An iteration whose score
    /// passes the mate threshold ends the loop early.
    #[must_use]
    pub fn best_move_iterative(&mut self, pos: &Position, max_depth: i8) -> SearchResult {
        let start = Instant::now();
        let max_depth = if pos.stone_count() <= 2 {
            max_depth.min(4)
        } else {
            max_depth
        };

        self.nodes = 0;
        self.cache_hits = 0;
        self.previous_best = None;
        self.killers = [[None; 2]; MAX_PLY];
        self.tt.new_generation();

        let mut best = SearchResult {
            best_move: None,
            score: 0,
            depth: 0,
            nodes: 0,
            cache_hits: 0,
            elapsed: Duration::ZERO,
        };

        for depth in 1..=max_depth.max(1) {
            if let Some(mv) = best.best_move {
                self.previous_best = Some(mv);
            }

            let (score, mv) = self.search_root(pos, depth);
            best.best_move = mv;
            best.score = score;
            best.depth = depth;

            debug!(
                "depth {depth}: best {mv:?} score {score} nodes {nodes}",
                nodes = self.nodes
            );
            if let Some(obs) = self.observer.as_mut() {
                obs.iteration_completed(depth, mv, score);
            }

            if score.abs() > MATE_THRESHOLD {
                break;
            }
        }

        best.nodes = self.nodes;
        best.cache_hits = self.cache_hits;
        best.elapsed = start.elapsed();
        best
    }

    /// Root search: full window, win probe, observer callbacks.
    fn search_root(&mut self, pos: &Position, depth: i8) -> (i32, Option<Pos>) {
        self.nodes += 1;
        let key = pos.hash;

        // A stored move for this position outranks the iteration stash.
        if let Some(entry) = self.tt.probe(key) {
            self.cache_hits += 1;
            if entry.best_move.is_some() {
                self.previous_best = entry.best_move;
            }
        }

        let moves = self.ordered_candidates(pos, depth, depth, self.previous_best);
        if moves.is_empty() {
            return (static_eval(pos, depth, depth), None);
        }

        let alpha_orig = -INF;
        let mut alpha = -INF;
        let beta = INF;
        let mut best_score = -INF;
        let mut best_move = None;

        for sm in &moves {
            // Quick win probe: verify before trusting the rating. A root
            // win outranks every interior mate the evaluator can report.
            if sm.rating >= ORDER_WIN {
                let mut child = pos.clone();
                if let Ok(applied) = apply_move(&mut child, sm.mv) {
                    if applied.wins {
                        let score = Score::WIN + 1;
                        if let Some(obs) = self.observer.as_mut() {
                            obs.root_move_searched(depth, sm.mv, score);
                        }
                        self.tt
                            .store(key, score, depth, Some(sm.mv), Bound::Exact);
                        return (score, Some(sm.mv));
                    }
                }
            }

            let mut child = pos.clone();
            if apply_move(&mut child, sm.mv).is_err() {
                continue;
            }
            let score = -self.negamax(&child, depth - 1, -beta, -alpha, depth);
            if let Some(obs) = self.observer.as_mut() {
                obs.root_move_searched(depth, sm.mv, score);
            }

            if score > best_score {
                best_score = score;
                best_move = Some(sm.mv);
            }
            alpha = alpha.max(score);
        }

        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(key, best_score, depth, best_move, bound);

        (best_score, best_move)
    }

    /// Negamax with alpha-beta over cloned child positions.
    fn negamax(&mut self, pos: &Position, depth: i8, mut alpha: i32, beta: i32, max_depth: i8) -> i32 {
        self.nodes += 1;
        let key = pos.hash;

        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(key) {
            self.cache_hits += 1;
            tt_move = entry.best_move;
            if entry.depth >= depth {
                match entry.bound {
                    Bound::Exact => return entry.score,
                    Bound::Lower if entry.score >= beta => return beta,
                    Bound::Upper if entry.score <= alpha => return alpha,
                    _ => {}
                }
            }
        }

        if depth <= 0 || check_win(pos, Stone::Black) || check_win(pos, Stone::White) {
            let score = static_eval(pos, max_depth, depth);
            self.tt.store(key, score, depth, None, Bound::Exact);
            return score;
        }

        let moves = self.ordered_candidates(pos, depth, max_depth, tt_move);
        if moves.is_empty() {
            let score = static_eval(pos, max_depth, depth);
            self.tt.store(key, score, depth, None, Bound::Exact);
            return score;
        }

        let alpha_orig = alpha;
        let mut best_score = -INF;
        let mut best_move = None;

        for sm in &moves {
            let mut child = pos.clone();
            let applied = match apply_move(&mut child, sm.mv) {
                Ok(applied) => applied,
                Err(_) => continue,
            };

            let score = -self.negamax(&child, depth - 1, -beta, -alpha, max_depth);

            if score > best_score {
                best_score = score;
                best_move = Some(sm.mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                if applied.captured.is_empty() {
                    self.note_cutoff(sm.mv, depth, max_depth);
                }
                break;
            }
        }

        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(key, best_score, depth, best_move, bound);

        best_score
    }

    /// Record a beta cutoff by a quiet move: killer slots and history.
    fn note_cutoff(&mut self, mv: Pos, depth: i8, max_depth: i8) {
        let ply = ply_index(depth, max_depth);
        if ply < MAX_PLY && self.killers[ply][0] != Some(mv) {
            self.killers[ply][1] = self.killers[ply][0];
            self.killers[ply][0] = Some(mv);
        }
        self.history[mv.row as usize][mv.col as usize] +=
            i32::from(depth) * i32::from(depth);
    }

    /// Generate, rate, sort and cap the candidate moves for a node.
    ///
    /// `hint` (the TT move, or the previous iteration's best at the root)
    /// is swapped to the front after sorting.
    fn ordered_candidates(
        &self,
        pos: &Position,
        depth: i8,
        max_depth: i8,
        hint: Option<Pos>,
    ) -> Vec<ScoredMove> {
        let candidates = generate_candidates(pos);
        if candidates.is_empty() {
            return Vec::new();
        }

        let opponent = pos.side_to_move.opponent();
        let opp_threats = has_winning_threats(pos, opponent);

        let mut moves: Vec<ScoredMove> = candidates
            .into_iter()
            .map(|mv| {
                let (rating, neutralizes) = quick_evaluate_move(pos, mv, opp_threats);
                ScoredMove {
                    mv,
                    rating,
                    neutralizes,
                }
            })
            .collect();

        let ply = ply_index(depth, max_depth);
        moves.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then_with(|| self.tiebreak(b.mv, ply).cmp(&self.tiebreak(a.mv, ply)))
        });

        // Phase cap. Threat-neutralising moves are never dropped.
        let cap = match pos.turn {
            0..=4 => 8,
            5..=10 => 10,
            _ => 12,
        };
        if moves.len() > cap {
            let kept_tail: Vec<ScoredMove> =
                moves[cap..].iter().filter(|m| m.neutralizes).copied().collect();
            moves.truncate(cap);
            moves.extend(kept_tail);
        }

        if let Some(hint) = hint {
            if let Some(idx) = moves.iter().position(|m| m.mv == hint) {
                let hinted = moves.remove(idx);
                moves.insert(0, hinted);
            }
        }

        moves
    }

    /// History value with a killer bias; only compared between moves whose
    /// quick ratings tie, so it never outranks a tactical difference.
    fn tiebreak(&self, mv: Pos, ply: usize) -> i32 {
        let mut value = self.history[mv.row as usize][mv.col as usize];
        if ply < MAX_PLY {
            if self.killers[ply][0] == Some(mv) {
                value += 2_000;
            } else if self.killers[ply][1] == Some(mv) {
                value += 1_000;
            }
        }
        value
    }

    /// Reset the learned ordering state (new game).
    pub fn clear_heuristics(&mut self) {
        self.history = [[0; BOARD_SIZE]; BOARD_SIZE];
        self.killers = [[None; 2]; MAX_PLY];
        self.previous_best = None;
    }

    /// Clear the transposition table (new game).
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    #[must_use]
    pub fn tt_stats(&self) -> TtStats {
        self.tt.stats()
    }
}

/// Ply distance from the root for killer indexing.
#[inline]
fn ply_index(depth: i8, max_depth: i8) -> usize {
    (max_depth - depth).max(0) as usize
}

/// Evaluator value converted to the side to move.
#[inline]
fn static_eval(pos: &Position, max_depth: i8, remaining: i8) -> i32 {
    let white_view = evaluate(pos, max_depth, remaining);
    if pos.side_to_move == Stone::White {
        white_view
    } else {
        -white_view
    }
}

/// Legal candidate cells for the side to move.
///
/// Cells within an adaptive Chebyshev radius of any stone (3 through ply 2,
/// 2 through ply 8, then 1), plus the central 5x5 box in the earliest
/// plies. Threat-neutralising cells need no special pass: a block sits on
/// the threat line next to its stones and a breaking capture sits next to
/// the captured pair, so the radius scan already contains every one of
/// them.
fn generate_candidates(pos: &Position) -> Vec<Pos> {
    if pos.is_board_empty() {
        return vec![Pos::new(9, 9)];
    }

    let radius = match pos.turn {
        0..=2 => 3i32,
        3..=8 => 2,
        _ => 1,
    };

    let mut near = [[false; BOARD_SIZE]; BOARD_SIZE];
    for (p, _) in pos.occupied() {
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let r = i32::from(p.row) + dr;
                let c = i32::from(p.col) + dc;
                if Pos::in_bounds(r, c) {
                    near[r as usize][c as usize] = true;
                }
            }
        }
    }

    // Opening play also admits the centre even with no stone nearby.
    if pos.turn <= 4 {
        for r in 7..=11usize {
            for c in 7..=11usize {
                near[r][c] = true;
            }
        }
    }

    let mut moves = Vec::with_capacity(64);
    for (r, row) in near.iter().enumerate() {
        for (c, &flag) in row.iter().enumerate() {
            if !flag {
                continue;
            }
            let mv = Pos::new(r as u8, c as u8);
            if is_legal_move(pos, mv) {
                moves.push(mv);
            }
        }
    }

    moves
}

/// Rate a move without recursion, for ordering and the root win probe.
///
/// Returns the rating and whether the move neutralises an opponent
/// mate-in-1 threat (`opp_threats` is that precomputed threat flag).
fn quick_evaluate_move(pos: &Position, mv: Pos, opp_threats: bool) -> (i32, bool) {
    let mover = pos.side_to_move;
    let opponent = mover.opponent();

    let mut after = pos.clone();
    let applied = match apply_move(&mut after, mv) {
        Ok(applied) => applied,
        Err(_) => return (-50_000, false),
    };

    let center_dist = chebyshev_from_center(mv);

    if applied.wins {
        return (ORDER_WIN + (9 - center_dist), false);
    }

    let mut score = 0i32;
    if opp_threats {
        if !has_winning_threats(&after, opponent) {
            return (40_000, true);
        }
        // The threat survives the move: anything this move builds is too
        // slow by a tempo.
        score -= 80_000;
    }

    // Captures, scaled by how close they bring the mover to the capture
    // win.
    let pairs_after = i32::from(after.captures(mover));
    let mut capture_value = applied.captured.len() as i32 * 1_000;
    capture_value *= match pairs_after {
        8.. => 10,
        6..=7 => 5,
        4..=5 => 2,
        _ => 1,
    };
    score += capture_value;

    // Per-direction tactical deltas, a cheap echo of the evaluator.
    for &(dr, dc) in &LINE_DIRECTIONS {
        let forward = count_dir(&after, mv, dr, dc, mover);
        let backward = count_dir(&after, mv, -dr, -dc, mover);
        let mine = forward + backward + 1;

        let opp_forward = count_dir(pos, mv, dr, dc, opponent);
        let opp_backward = count_dir(pos, mv, -dr, -dc, opponent);
        let theirs = opp_forward + opp_backward;

        if mine >= 4 {
            let blocked_fwd = end_blocked(&after, mv, dr, dc, forward + 1, mover);
            let blocked_bwd = end_blocked(&after, mv, -dr, -dc, backward + 1, mover);
            score += if !blocked_fwd && !blocked_bwd {
                50_000
            } else {
                10_000
            };
        } else if mine == 3 {
            let blocked_fwd = end_blocked(&after, mv, dr, dc, forward + 1, mover);
            let blocked_bwd = end_blocked(&after, mv, -dr, -dc, backward + 1, mover);
            if !blocked_fwd && !blocked_bwd {
                score += 5_000;
            } else if !blocked_fwd || !blocked_bwd {
                score += 1_500;
            }
        } else if mine == 2 {
            score += 100;
        }

        score += match theirs {
            4.. => 40_000,
            3 => 8_000,
            2 => 200,
            _ => 0,
        };
    }

    // Centrality and local connectivity.
    score += (9 - center_dist) * 20;
    for &(dr, dc) in &ALL_DIRECTIONS {
        if let Some(p) = mv.offset(dr, dc, 1) {
            if pos.get(p) == mover {
                score += 50;
            }
        }
    }

    (score, false)
}

#[inline]
fn chebyshev_from_center(mv: Pos) -> i32 {
    let center = (BOARD_SIZE / 2) as i32;
    (i32::from(mv.row) - center)
        .abs()
        .max((i32::from(mv.col) - center).abs())
}

/// Consecutive `player` stones starting one step from `from`.
fn count_dir(pos: &Position, from: Pos, dr: i32, dc: i32, player: Stone) -> i32 {
    let mut count = 0;
    let mut step = 1;
    while count < 4 {
        match from.offset(dr, dc, step) {
            Some(p) if pos.get(p) == player => {
                count += 1;
                step += 1;
            }
            _ => break,
        }
    }
    count
}

/// Whether the cell `steps` out from `from` blocks the line: off board or
/// an enemy stone.
fn end_blocked(pos: &Position, from: Pos, dr: i32, dc: i32, steps: i32, player: Stone) -> bool {
    match from.offset(dr, dc, steps) {
        Some(p) => {
            let cell = pos.get(p);
            cell != Stone::Empty && cell != player
        }
        None => true,
    }
}
