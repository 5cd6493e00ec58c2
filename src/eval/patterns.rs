//! Pattern scores and line analysis
//!
//! All score constants live here so the rest of the crate agrees on one
//! scale. Only the relative ordering matters for play quality:
//! WIN >> FOUR_OPEN > FOUR_HALF > THREE_OPEN > THREE_HALF > TWO_OPEN.

use crate::board::{Pos, Position, Stone};

/// Evaluation score constants.
pub struct Score;

impl Score {
    /// Five in a row (or an unstoppable gapped five).
    pub const WIN: i32 = 600_000;
    /// Four with both ends free.
    pub const FOUR_OPEN: i32 = 50_000;
    /// Four with one end free.
    pub const FOUR_HALF: i32 = 25_000;
    /// Three with both ends free.
    pub const THREE_OPEN: i32 = 10_000;
    /// Three with one end free.
    pub const THREE_HALF: i32 = 1_500;
    /// Two with both ends free.
    pub const TWO_OPEN: i32 = 100;
}

/// What a 6-cell window starting at a line-start cell contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    /// Consecutive own stones from the start.
    pub consecutive: u8,
    /// Own stones seen before an opponent stone or the window end.
    pub total: u8,
    /// Empty cells interleaved with the stones.
    pub gaps: u8,
    /// Free endpoints: the empty cells immediately before the start and
    /// immediately after the analysed span (0, 1 or 2).
    pub free_ends: u8,
    /// Cells from the start through the last own stone.
    pub span: u8,
}

/// Analyse the line starting at `start` along (dr, dc) for `player`.
///
/// `start` is assumed to be a line start (the previous cell is not the
/// player's); callers enforce this so every segment is analysed exactly
/// once. The scan covers a 6-cell window, which is enough to see every
/// pattern up to a gapped five.
pub fn analyze_line(pos: &Position, start: Pos, dr: i32, dc: i32, player: Stone) -> LineInfo {
    const MAX_SCAN: i32 = 6;

    let mut cells = [None::<Stone>; MAX_SCAN as usize];
    for (i, cell) in cells.iter_mut().enumerate() {
        if let Some(p) = start.offset(dr, dc, i as i32) {
            *cell = Some(pos.get(p));
        } else {
            break;
        }
    }

    let mut consecutive = 0u8;
    for cell in &cells {
        if *cell == Some(player) {
            consecutive += 1;
        } else {
            break;
        }
    }

    if consecutive >= 5 {
        return LineInfo {
            consecutive,
            total: consecutive,
            gaps: 0,
            free_ends: 2,
            span: consecutive,
        };
    }

    let mut total = 0u8;
    let mut gaps = 0u8;
    let mut last_stone = -1i32;
    for (i, cell) in cells.iter().enumerate() {
        match cell {
            Some(s) if *s == player => {
                total += 1;
                last_stone = i as i32;
            }
            Some(Stone::Empty) => {
                if total > 0 {
                    gaps += 1;
                }
            }
            // Opponent stone or board edge ends the window.
            _ => break,
        }
    }

    let span = (last_stone + 1) as u8;

    let mut free_ends = 0u8;
    if let Some(p) = start.offset(dr, dc, -1) {
        if pos.get(p) == Stone::Empty {
            free_ends += 1;
        }
    }
    if let Some(p) = start.offset(dr, dc, i32::from(span)) {
        if pos.get(p) == Stone::Empty {
            free_ends += 1;
        }
    }

    LineInfo {
        consecutive,
        total,
        // Only gaps bridged by further stones matter for scoring.
        gaps: if total > consecutive { gaps } else { 0 },
        free_ends,
        span,
    }
}

/// Score a line pattern.
pub fn line_score(info: &LineInfo) -> i32 {
    let gapped = info.gaps > 0;

    if info.consecutive >= 5 {
        return Score::WIN;
    }
    // Five stones split by a gap and still extendable: one move wins.
    if info.total >= 5 && gapped && info.free_ends >= 1 {
        return Score::WIN;
    }

    match (info.total, info.free_ends) {
        (4, 2) => Score::FOUR_OPEN,
        (4, 1) => Score::FOUR_HALF,
        (3, 2) => Score::THREE_OPEN,
        (3, 1) => Score::THREE_HALF,
        (2, 2) => Score::TWO_OPEN,
        _ => 0,
    }
}
