//! Double free-three prohibition
//!
//! A free-three is a 3-stone alignment inside a 5-cell window such that the
//! window holds exactly 3 own stones and 2 empties, the cells immediately
//! outside both window ends are empty, and filling one of the in-window
//! empties yields 4 consecutive stones. A move creating free-threes in two
//! or more directions at once is forbidden.

use crate::board::directions::LINE_DIRECTIONS;
use crate::board::{Pos, Position, Stone};

/// Window cells with the candidate move overlaid as the player's stone.
fn window_cells(
    pos: &Position,
    mv: Pos,
    player: Stone,
    start: Pos,
    dr: i32,
    dc: i32,
) -> Option<[Stone; 5]> {
    let mut cells = [Stone::Empty; 5];
    for (i, cell) in cells.iter_mut().enumerate() {
        let p = start.offset(dr, dc, i as i32)?;
        *cell = if p == mv { player } else { pos.get(p) };
    }
    Some(cells)
}

/// Whether the filled window contains 4 consecutive stones of `player`.
fn has_four_consecutive(cells: &[Stone; 5], player: Stone) -> bool {
    for start in 0..=1 {
        if cells[start..start + 4].iter().all(|&c| c == player) {
            return true;
        }
    }
    false
}

/// Whether one of the window's empty cells can be filled to make an open
/// four. This is what separates a real free-three from a loose trio such
/// as `x.x.x`.
fn can_form_open_four(cells: &[Stone; 5], player: Stone) -> bool {
    for i in 0..5 {
        if cells[i] != Stone::Empty {
            continue;
        }
        let mut filled = *cells;
        filled[i] = player;
        if has_four_consecutive(&filled, player) {
            return true;
        }
    }
    false
}

/// Whether placing `player` at `mv` creates a free-three along (dr, dc).
///
/// Every 5-cell window containing the move is tried; the window must hold
/// exactly 3 own stones, no opponent stones, and both cells just outside it
/// must be empty (the board edge counts as blocked).
fn creates_free_three_in_direction(
    pos: &Position,
    mv: Pos,
    player: Stone,
    dr: i32,
    dc: i32,
) -> bool {
    let opponent = player.opponent();

    for offset in -4i32..=0 {
        let Some(start) = mv.offset(dr, dc, offset) else {
            continue;
        };
        let Some(cells) = window_cells(pos, mv, player, start, dr, dc) else {
            continue;
        };

        let own = cells.iter().filter(|&&c| c == player).count();
        let theirs = cells.iter().filter(|&&c| c == opponent).count();
        if own != 3 || theirs != 0 {
            continue;
        }

        // Both cells flanking the window must be empty for the three to be
        // "free"; a window touching the edge is blocked on that side.
        let open_before = start
            .offset(dr, dc, -1)
            .map(|p| pos.get(p) == Stone::Empty)
            .unwrap_or(false);
        let open_after = start
            .offset(dr, dc, 5)
            .map(|p| pos.get(p) == Stone::Empty)
            .unwrap_or(false);
        if !open_before || !open_after {
            continue;
        }

        if can_form_open_four(&cells, player) {
            return true;
        }
    }

    false
}

/// Count the line directions in which placing `player` at `mv` creates a
/// free-three. Stops at 2, which is all the legality check needs.
pub fn count_free_three_directions(pos: &Position, mv: Pos, player: Stone) -> u8 {
    let mut count = 0;
    for &(dr, dc) in &LINE_DIRECTIONS {
        if creates_free_three_in_direction(pos, mv, player, dr, dc) {
            count += 1;
            if count >= 2 {
                break;
            }
        }
    }
    count
}

/// Whether placing `player` at `mv` creates two simultaneous free-threes.
/// The grid is only read with the move overlaid; `pos` is never mutated.
pub fn creates_double_free_three(pos: &Position, mv: Pos, player: Stone) -> bool {
    count_free_three_directions(pos, mv, player) >= 2
}

/// Whether the side to move may play at `mv`: on the board, empty, and not
/// a double free-three.
pub fn is_legal_move(pos: &Position, mv: Pos) -> bool {
    if !mv.on_board() || !pos.is_empty(mv) {
        return false;
    }
    !creates_double_free_three(pos, mv, pos.side_to_move)
}
