//! Zobrist hashing for position identification
//!
//! A position's 64-bit fingerprint is the XOR of one random key per occupied
//! cell, one key toggled while White is to move, and one key per (player,
//! capture-count) bucket. Incremental updates after a move are O(1) in the
//! number of captured stones, which is what makes the transposition table
//! affordable inside the search.
//!
//! # Example
//!
//! ```
//! use ninuki::board::{Pos, Position, Stone};
//! use ninuki::search::zobrist;
//!
//! let zt = zobrist::tables();
//! let mut pos = Position::new();
//! let before = zt.full_hash(&pos);
//!
//! pos.place(Pos::new(9, 9), Stone::Black);
//! pos.side_to_move = Stone::White;
//!
//! let incremental = zt.update_after_move(before, Pos::new(9, 9), Stone::Black, &[], 0, 0);
//! assert_eq!(incremental, zt.full_hash(&pos));
//! ```

use std::sync::OnceLock;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::board::{Pos, Position, Stone, TOTAL_CELLS};

/// Capture counts are clamped to this value for hashing. The rule kernel
/// treats 10 pairs as terminal, so higher counts never occur in play.
const CAPTURE_BUCKETS: usize = 11;

/// Fixed seed so the tables (and therefore every hash) are reproducible
/// across runs and processes.
const TABLE_SEED: u64 = 0x6E69_6E75_6B69_1942;

static TABLES: OnceLock<ZobristTable> = OnceLock::new();

/// Shared hash tables, initialised on first use.
pub fn tables() -> &'static ZobristTable {
    TABLES.get_or_init(ZobristTable::new)
}

/// Random key tables for the position hash.
pub struct ZobristTable {
    /// One key per (cell, occupant code). The `Empty` column is fixed to 0
    /// so empty cells contribute nothing.
    piece: Vec<[u64; 3]>,
    /// XORed into the hash while White is to move.
    turn: u64,
    /// One key per (player slot, clamped capture count).
    capture: [[u64; CAPTURE_BUCKETS]; 2],
}

impl ZobristTable {
    /// Build the tables from a seeded ChaCha stream.
    #[must_use]
    pub fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(TABLE_SEED);

        let mut piece = vec![[0u64; 3]; TOTAL_CELLS];
        for cell in piece.iter_mut() {
            cell[Stone::Black.code()] = rng.next_u64();
            cell[Stone::White.code()] = rng.next_u64();
        }

        let turn = rng.next_u64();

        let mut capture = [[0u64; CAPTURE_BUCKETS]; 2];
        for slot in &mut capture {
            for key in slot.iter_mut() {
                *key = rng.next_u64();
            }
        }

        Self {
            piece,
            turn,
            capture,
        }
    }

    /// Key for a single (cell, occupant) pair. Zero for `Empty`.
    #[inline]
    fn piece_key(&self, pos: Pos, stone: Stone) -> u64 {
        self.piece[pos.to_index()][stone.code()]
    }

    #[inline]
    fn capture_key(&self, player: Stone, count: u8) -> u64 {
        self.capture[player.slot()][count.min(10) as usize]
    }

    /// Compute the hash of a position from scratch.
    ///
    /// Used at construction and for consistency checks; the search relies on
    /// `update_after_move` instead.
    #[must_use]
    pub fn full_hash(&self, pos: &Position) -> u64 {
        let mut h = 0u64;
        for (p, stone) in pos.occupied() {
            h ^= self.piece_key(p, stone);
        }
        if pos.side_to_move == Stone::White {
            h ^= self.turn;
        }
        h ^= self.capture_key(Stone::Black, pos.captures(Stone::Black));
        h ^= self.capture_key(Stone::White, pos.captures(Stone::White));
        h
    }

    /// Incremental hash update for a completed move: the placed stone goes
    /// in, each captured opponent stone goes out, the side to move flips,
    /// and the mover's capture bucket moves from `old_pairs` to
    /// `new_pairs`. Only the mover's counter can change, because only
    /// mover-initiated captures are resolved.
    #[inline]
    #[must_use]
    pub fn update_after_move(
        &self,
        hash: u64,
        mv: Pos,
        mover: Stone,
        captured: &[Pos],
        old_pairs: u8,
        new_pairs: u8,
    ) -> u64 {
        let mut h = hash ^ self.piece_key(mv, mover);
        let opponent = mover.opponent();
        for &cap in captured {
            h ^= self.piece_key(cap, opponent);
        }
        h ^= self.turn;
        h ^= self.capture_key(mover, old_pairs);
        h ^= self.capture_key(mover, new_pairs);
        h
    }

    /// Undo a move's hash update. XOR is self-inverse, so reverting is the
    /// same update with the capture buckets swapped.
    #[inline]
    #[must_use]
    pub fn revert_move(
        &self,
        hash: u64,
        mv: Pos,
        mover: Stone,
        captured: &[Pos],
        old_pairs: u8,
        new_pairs: u8,
    ) -> u64 {
        self.update_after_move(hash, mv, mover, captured, new_pairs, old_pairs)
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}
