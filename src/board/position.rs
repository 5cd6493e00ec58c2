//! Game position: grid, capture counters, side to move and hash.

use std::fmt;

use super::{Pos, Stone, BOARD_SIZE, TOTAL_CELLS};
use crate::search::zobrist;

/// Record installed while a freshly formed five-in-a-row is still breakable
/// by capture. `winner` is the side holding the run; `targets` are the
/// cells where the defender can capture a run stone. An empty target list
/// with a winner still set means the defender passed on every break and the
/// run stands as a win.
#[derive(Debug, Clone, Default)]
pub struct PendingWin {
    pub winner: Option<Stone>,
    pub targets: Vec<Pos>,
}

impl PendingWin {
    /// Whether the break window is still open.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.winner.is_some() && !self.targets.is_empty()
    }

    /// Whether the defender let the window lapse.
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.winner.is_some() && self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.winner = None;
        self.targets.clear();
    }
}

/// Full game position.
///
/// The grid is a flat row-major array; `hash` is maintained incrementally by
/// `rules::apply_move` and always equals a fresh recomputation from (grid,
/// side to move, capture counts). Positions assembled by raw stone placement
/// (tests, setups) must call [`Position::rehash`] before relying on it.
#[derive(Debug, Clone)]
pub struct Position {
    grid: [Stone; TOTAL_CELLS],
    captures: [u8; 2],
    pub side_to_move: Stone,
    pub turn: u32,
    pub hash: u64,
    pub last_human_move: Option<Pos>,
    pub pending_win: PendingWin,
}

impl Position {
    /// Empty board, Black to move.
    pub fn new() -> Self {
        let mut pos = Self {
            grid: [Stone::Empty; TOTAL_CELLS],
            captures: [0, 0],
            side_to_move: Stone::Black,
            turn: 0,
            hash: 0,
            last_human_move: None,
            pending_win: PendingWin::default(),
        };
        pos.hash = zobrist::tables().full_hash(&pos);
        pos
    }

    /// Get stone at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        self.grid[pos.to_index()]
    }

    /// Check if position is empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.grid[pos.to_index()] == Stone::Empty
    }

    /// Place a stone without capture or hash processing.
    /// Game moves go through `rules::apply_move`.
    #[inline]
    pub fn place(&mut self, pos: Pos, stone: Stone) {
        self.grid[pos.to_index()] = stone;
    }

    /// Remove a stone without hash processing.
    #[inline]
    pub fn remove(&mut self, pos: Pos) {
        self.grid[pos.to_index()] = Stone::Empty;
    }

    /// Captured pair count for a player.
    #[inline]
    pub fn captures(&self, stone: Stone) -> u8 {
        match stone {
            Stone::Empty => 0,
            _ => self.captures[stone.slot()],
        }
    }

    /// Add captured pairs for a player.
    #[inline]
    pub fn add_captures(&mut self, stone: Stone, pairs: u8) {
        if stone != Stone::Empty {
            self.captures[stone.slot()] = self.captures[stone.slot()].saturating_add(pairs);
        }
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.grid.iter().filter(|&&s| s != Stone::Empty).count() as u32
    }

    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.grid.iter().all(|&s| s == Stone::Empty)
    }

    /// Iterate over occupied cells.
    pub fn occupied(&self) -> impl Iterator<Item = (Pos, Stone)> + '_ {
        self.grid
            .iter()
            .enumerate()
            .filter(|(_, &s)| s != Stone::Empty)
            .map(|(i, &s)| (Pos::from_index(i), s))
    }

    /// Recompute the hash from scratch. Needed after raw `place`/`remove`
    /// edits or direct counter changes.
    pub fn rehash(&mut self) {
        self.hash = zobrist::tables().full_hash(self);
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE as u8 {
            write!(f, "{:2} ", row + 1)?;
            for col in 0..BOARD_SIZE as u8 {
                let c = match self.get(Pos::new(row, col)) {
                    Stone::Empty => '.',
                    Stone::Black => 'X',
                    Stone::White => 'O',
                };
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for col in 0..BOARD_SIZE as u8 {
            write!(f, "{} ", (b'A' + col) as char)?;
        }
        Ok(())
    }
}
