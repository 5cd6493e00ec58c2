//! Move application
//!
//! The only mutation path for game positions. Applies the stone, resolves
//! the mover's captures, keeps the incremental hash in sync and reports
//! whether the move won the game. Failures are in-band; an illegal move
//! leaves the position untouched.

use crate::board::{Pos, Position, Stone};
use crate::search::zobrist;

use super::capture::find_captures;
use super::forbidden::creates_double_free_three;
use super::win::check_win;

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    OffBoard,
    Occupied,
    DoubleFreeThree,
}

/// What a successful move did.
#[derive(Debug, Clone)]
pub struct Applied {
    /// Cells emptied by the mover's captures (pairs, possibly several).
    pub captured: Vec<Pos>,
    /// Whether the resulting position is a win for the mover.
    pub wins: bool,
}

/// Apply a move for the side to move.
///
/// On success: the stone is placed, every capture initiated by the move is
/// resolved (two stones per bracket), the mover's pair counter advances,
/// the hash is updated incrementally, the side to move flips and the turn
/// counter advances. Captures the opponent could make "against" the placed
/// stone are never resolved here.
pub fn apply_move(pos: &mut Position, mv: Pos) -> Result<Applied, IllegalMove> {
    if !mv.on_board() {
        return Err(IllegalMove::OffBoard);
    }
    if !pos.is_empty(mv) {
        return Err(IllegalMove::Occupied);
    }
    let mover = pos.side_to_move;
    if creates_double_free_three(pos, mv, mover) {
        return Err(IllegalMove::DoubleFreeThree);
    }

    let old_pairs = pos.captures(mover);

    let captured = find_captures(pos, mv, mover);
    pos.place(mv, mover);
    for &cap in &captured {
        debug_assert_eq!(pos.get(cap), mover.opponent());
        pos.remove(cap);
    }
    pos.add_captures(mover, (captured.len() / 2) as u8);

    let wins = check_win(pos, mover);

    pos.hash = zobrist::tables().update_after_move(
        pos.hash,
        mv,
        mover,
        &captured,
        old_pairs,
        pos.captures(mover),
    );
    pos.side_to_move = mover.opponent();
    pos.turn += 1;

    Ok(Applied { captured, wins })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::is_legal_move;

    #[test]
    fn test_simple_move() {
        let mut pos = Position::new();
        let applied = apply_move(&mut pos, Pos::new(9, 9)).unwrap();
        assert!(applied.captured.is_empty());
        assert!(!applied.wins);
        assert_eq!(pos.get(Pos::new(9, 9)), Stone::Black);
        assert_eq!(pos.side_to_move, Stone::White);
        assert_eq!(pos.turn, 1);
    }

    #[test]
    fn test_occupied_rejected_unchanged() {
        let mut pos = Position::new();
        apply_move(&mut pos, Pos::new(9, 9)).unwrap();
        let before = pos.clone();
        let err = apply_move(&mut pos, Pos::new(9, 9)).unwrap_err();
        assert_eq!(err, IllegalMove::Occupied);
        assert_eq!(pos.hash, before.hash);
        assert_eq!(pos.side_to_move, before.side_to_move);
        assert_eq!(pos.turn, before.turn);
    }

    #[test]
    fn test_off_board_rejected() {
        let mut pos = Position::new();
        assert_eq!(
            apply_move(&mut pos, Pos::new(19, 19)).unwrap_err(),
            IllegalMove::OffBoard
        );
    }

    #[test]
    fn test_double_free_three_rejected() {
        let mut pos = Position::new();
        // Black builds the corners of a square around (10,10); White plays
        // far away in between.
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
        let before_hash = pos.hash;
        assert_eq!(
            apply_move(&mut pos, Pos::new(10, 10)).unwrap_err(),
            IllegalMove::DoubleFreeThree
        );
        assert_eq!(pos.hash, before_hash);
        assert!(pos.is_empty(Pos::new(10, 10)));
    }

    #[test]
    fn test_capture_applied_and_hashed() {
        let mut pos = Position::new();
        // Black (9,9), White (9,10), Black elsewhere, White (9,11), then
        // Black (9,12) closes the bracket and takes the pair.
        apply_move(&mut pos, Pos::new(9, 9)).unwrap();
        apply_move(&mut pos, Pos::new(9, 10)).unwrap();
        apply_move(&mut pos, Pos::new(0, 0)).unwrap();
        apply_move(&mut pos, Pos::new(9, 11)).unwrap();
        let applied = apply_move(&mut pos, Pos::new(9, 12)).unwrap();

        assert_eq!(applied.captured.len(), 2);
        assert!(pos.is_empty(Pos::new(9, 10)));
        assert!(pos.is_empty(Pos::new(9, 11)));
        assert_eq!(pos.captures(Stone::Black), 1);
        assert_eq!(pos.hash, zobrist::tables().full_hash(&pos));
    }

    #[test]
    fn test_win_reported() {
        let mut pos = Position::new();
        for col in 5..9 {
            pos.place(Pos::new(9, col), Stone::Black);
        }
        pos.rehash();
        let applied = apply_move(&mut pos, Pos::new(9, 9)).unwrap();
        assert!(applied.wins);
    }

    #[test]
    fn test_capture_win_reported() {
        let mut pos = Position::new();
        pos.add_captures(Stone::White, 9);
        pos.place(Pos::new(5, 7), Stone::Black);
        pos.place(Pos::new(5, 8), Stone::Black);
        pos.place(Pos::new(5, 9), Stone::White);
        pos.side_to_move = Stone::White;
        pos.rehash();

        let applied = apply_move(&mut pos, Pos::new(5, 6)).unwrap();
        assert_eq!(applied.captured.len(), 2);
        assert_eq!(pos.captures(Stone::White), 10);
        assert!(applied.wins);
        assert!(check_win(&pos, Stone::White));
    }

    #[test]
    fn test_legality_agrees_with_apply() {
        let mut pos = Position::new();
        apply_move(&mut pos, Pos::new(9, 9)).unwrap();
        apply_move(&mut pos, Pos::new(9, 10)).unwrap();

        for mv in [Pos::new(9, 9), Pos::new(8, 8), Pos::new(18, 0)] {
            let legal = is_legal_move(&pos, mv);
            let mut copy = pos.clone();
            assert_eq!(legal, apply_move(&mut copy, mv).is_ok());
        }
    }
}
