//! Pair-capture detection (Pente-style)
//!
//! A capture fires when placing a stone completes the bracket
//! `Self, Opp, Opp, Self` along any of the 8 directions, reading outward
//! from the placed stone. Exactly the two bracketed opponent stones are
//! removed; longer chains are never captured.

use crate::board::directions::ALL_DIRECTIONS;
use crate::board::{Pos, Position, Stone};

/// Positions that would be removed if `player` placed at `mv`. Pure: the
/// position is never mutated, and the placed stone itself is not read.
///
/// The result holds complete pairs (even length). Each of the 8 directions
/// touches distinct cells, so no cell appears twice.
pub fn find_captures(pos: &Position, mv: Pos, player: Stone) -> Vec<Pos> {
    let mut captured = Vec::new();
    let opponent = player.opponent();

    for &(dr, dc) in &ALL_DIRECTIONS {
        let (Some(first), Some(second), Some(bracket)) = (
            mv.offset(dr, dc, 1),
            mv.offset(dr, dc, 2),
            mv.offset(dr, dc, 3),
        ) else {
            continue;
        };

        if pos.get(first) == opponent && pos.get(second) == opponent && pos.get(bracket) == player
        {
            captured.push(first);
            captured.push(second);
        }
    }

    captured
}

/// Whether placing at `mv` captures at least one pair. No allocation.
#[inline]
pub fn has_capture(pos: &Position, mv: Pos, player: Stone) -> bool {
    let opponent = player.opponent();

    for &(dr, dc) in &ALL_DIRECTIONS {
        let (Some(first), Some(second), Some(bracket)) = (
            mv.offset(dr, dc, 1),
            mv.offset(dr, dc, 2),
            mv.offset(dr, dc, 3),
        ) else {
            continue;
        };

        if pos.get(first) == opponent && pos.get(second) == opponent && pos.get(bracket) == player
        {
            return true;
        }
    }

    false
}
