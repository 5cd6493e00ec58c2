//! Engine wrapper and game-flow coordination
//!
//! [`Engine`] is the entry point consumed by front-ends: it owns a search
//! backend, picks the depth for the game phase and exposes the statistics
//! of the last search. The free functions below carry the pending-win
//! protocol between plies: a freshly formed five that the defender can
//! still break by capture is not yet a win, and the record installed on the
//! position tracks whether the defender used their one chance.

use std::time::Duration;

use log::{debug, info};

use crate::board::{Pos, Position, Stone};
use crate::rules::{
    apply_move, check_win, find_five_run, line_break_moves, Applied, IllegalMove,
};
use crate::search::tt::DEFAULT_TT_BYTES;
use crate::search::{SearchResult, Searcher, TtStats};

/// Column letters for user-facing coordinates.
const COLUMNS: &[u8; 19] = b"ABCDEFGHIJKLMNOPQRS";

/// Human-readable coordinate: column letter A-S plus 1-based row.
pub fn notation(mv: Pos) -> String {
    format!("{}{}", COLUMNS[mv.col as usize] as char, mv.row + 1)
}

/// Statistics of the engine's last search.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineStats {
    pub nodes: u64,
    pub cache_hits: u64,
    /// Cache hits per visited node.
    pub hit_rate: f64,
    /// Occupied transposition slots.
    pub cache_entries: usize,
    /// Occupied share of the transposition table.
    pub fill_rate: f64,
    pub elapsed: Duration,
    pub score: i32,
}

/// A search backend the engine can drive. The alpha-beta searcher is the
/// primary implementation; front-ends may inject another at construction.
pub trait Backend {
    fn search(&mut self, pos: &Position, depth: i8) -> SearchResult;
    fn clear_cache(&mut self);
    fn cache_stats(&self) -> TtStats;
}

impl Backend for Searcher {
    fn search(&mut self, pos: &Position, depth: i8) -> SearchResult {
        self.best_move_iterative(pos, depth)
    }

    fn clear_cache(&mut self) {
        self.clear_tt();
        self.clear_heuristics();
    }

    fn cache_stats(&self) -> TtStats {
        self.tt_stats()
    }
}

/// Depth for the game phase: shallow early, full strength from the
/// midgame.
fn phase_depth(pos: &Position) -> i8 {
    match pos.turn {
        0..=5 => 6,
        6..=11 => 8,
        _ => 10,
    }
}

/// The decision engine consumed by the UI.
pub struct Engine {
    backend: Box<dyn Backend>,
    depth_hint: i8,
    last_stats: EngineStats,
}

impl Engine {
    /// Engine with the default searcher: 64 MiB table, depth hint 10.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_TT_BYTES, 10)
    }

    /// Engine with a custom table budget and depth hint. The hint caps the
    /// phase depth, it never raises it.
    #[must_use]
    pub fn with_config(tt_bytes: usize, depth_hint: i8) -> Self {
        Self::with_backend(Box::new(Searcher::new(tt_bytes)), depth_hint)
    }

    /// Engine over an injected backend.
    #[must_use]
    pub fn with_backend(backend: Box<dyn Backend>, depth_hint: i8) -> Self {
        Self {
            backend,
            depth_hint,
            last_stats: EngineStats::default(),
        }
    }

    /// Best move for the side to move, or `None` when no candidate exists
    /// (the match driver treats that as a stalemate).
    pub fn best_move(&mut self, pos: &Position) -> Option<Pos> {
        let depth = phase_depth(pos).min(self.depth_hint).max(1);
        debug!(
            "search: turn {} depth {} side {:?}",
            pos.turn, depth, pos.side_to_move
        );

        let result = self.backend.search(pos, depth);
        let cache = self.backend.cache_stats();
        self.last_stats = EngineStats {
            nodes: result.nodes,
            cache_hits: result.cache_hits,
            hit_rate: if result.nodes > 0 {
                result.cache_hits as f64 / result.nodes as f64
            } else {
                0.0
            },
            cache_entries: cache.used,
            fill_rate: cache.fill_rate,
            elapsed: result.elapsed,
            score: result.score,
        };

        info!(
            "best {:?} score {} depth {} nodes {} hits {} in {:?}",
            result.best_move.map(notation),
            result.score,
            result.depth,
            result.nodes,
            result.cache_hits,
            result.elapsed,
        );
        result.best_move
    }

    /// Statistics of the last `best_move` call.
    #[must_use]
    pub fn last_stats(&self) -> EngineStats {
        self.last_stats
    }

    /// Drop cached analysis (new game).
    pub fn clear_cache(&mut self) {
        self.backend.clear_cache();
    }

    /// Cap the search depth.
    pub fn set_depth(&mut self, depth: i8) {
        self.depth_hint = depth.max(1);
    }

    #[must_use]
    pub fn depth_hint(&self) -> i8 {
        self.depth_hint
    }

    /// Search and apply in one step, maintaining the pending-win record.
    pub fn apply_engine_move(&mut self, pos: &mut Position) -> Option<Pos> {
        let mv = self.best_move(pos)?;
        let ignored = ignores_break_chance(pos, mv);
        apply_move(pos, mv).ok()?;
        settle_pending_win(pos, ignored);
        Some(mv)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the side to move has an open break window and `mv` is not one
/// of its targets.
fn ignores_break_chance(pos: &Position, mv: Pos) -> bool {
    pos.pending_win.is_active()
        && pos.pending_win.winner != Some(pos.side_to_move)
        && !pos.pending_win.targets.contains(&mv)
}

/// After a successful move: either collapse an ignored break window into a
/// standing win, or rescan the board for a fresh breakable five.
fn settle_pending_win(pos: &mut Position, ignored_break: bool) {
    if ignored_break {
        // The defender passed on every break target; the run stands.
        pos.pending_win.targets.clear();
        return;
    }
    refresh_pending_win(pos);
}

/// Rescan for a breakable five of the player who just moved and install
/// the break window. An unbreakable five needs no record: `check_win`
/// already reports it.
pub fn refresh_pending_win(pos: &mut Position) {
    pos.pending_win.clear();

    let mover = pos.side_to_move.opponent();
    let Some((start, (dr, dc))) = find_five_run(pos, mover) else {
        return;
    };
    let targets = line_break_moves(pos, start, dr, dc, mover);
    if targets.is_empty() {
        return;
    }

    debug!(
        "break window for {:?}: targets {:?}",
        mover,
        targets.iter().map(|&t| notation(t)).collect::<Vec<_>>()
    );
    pos.pending_win.winner = Some(mover);
    pos.pending_win.targets = targets;
}

/// Apply a human move, enforcing legality and carrying the pending-win
/// record. The position is unchanged on error.
pub fn apply_human_move(pos: &mut Position, mv: Pos) -> Result<Applied, IllegalMove> {
    let ignored = ignores_break_chance(pos, mv);
    let applied = apply_move(pos, mv)?;
    pos.last_human_move = Some(mv);
    settle_pending_win(pos, ignored);
    Ok(applied)
}

/// Whether the game has ended: a lapsed break window or a standing win.
/// False while the break window is still open.
#[must_use]
pub fn is_game_over(pos: &Position) -> bool {
    if pos.pending_win.is_collapsed() {
        return true;
    }
    if pos.pending_win.is_active() {
        return false;
    }
    check_win(pos, Stone::Black) || check_win(pos, Stone::White)
}

/// The winner, if the game has ended.
#[must_use]
pub fn winner(pos: &Position) -> Option<Stone> {
    if pos.pending_win.is_collapsed() {
        return pos.pending_win.winner;
    }
    if pos.pending_win.is_active() {
        return None;
    }
    for side in [Stone::Black, Stone::White] {
        if check_win(pos, side) {
            return Some(side);
        }
    }
    None
}
