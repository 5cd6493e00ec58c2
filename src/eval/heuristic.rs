//! Static position evaluator
//!
//! Scores are from White's perspective (the engine side); the search
//! negates as needed. A side's score combines pattern analysis along the 4
//! line directions, static capture pressure (opportunities and threats),
//! the accumulated capture tally and an immediate mate-threat boost.

use crate::board::directions::LINE_DIRECTIONS;
use crate::board::{Pos, Position, Stone, BOARD_SIZE};
use crate::rules::check_win;

use super::patterns::{analyze_line, line_score, Score};

/// Evaluate a position from White's perspective.
///
/// `remaining` is the search depth left below this node; `max_depth -
/// remaining` is therefore the distance from the root, and terminal scores
/// shrink with it so the search prefers the faster win and the slower loss.
/// Non-terminal evaluations ignore mate distance.
pub fn evaluate(pos: &Position, max_depth: i8, remaining: i8) -> i32 {
    let mate_distance = i32::from(max_depth - remaining);

    if check_win(pos, Stone::White) {
        return Score::WIN - mate_distance;
    }
    if check_win(pos, Stone::Black) {
        return -Score::WIN + mate_distance;
    }

    evaluate_side(pos, Stone::White) - evaluate_side(pos, Stone::Black)
}

/// One side's static score: threat boost plus the positional analysis.
pub fn evaluate_side(pos: &Position, player: Stone) -> i32 {
    immediate_threat_score(pos, player) + analyze_position(pos, player)
}

/// Pattern sweep, capture pressure and capture tally for one side.
fn analyze_position(pos: &Position, player: Stone) -> i32 {
    let opponent = player.opponent();
    let mut total = 0i32;

    // Pattern evaluation. Each matched line is marked per direction so
    // overlapping windows are not re-counted.
    let mut seen = [[[false; 4]; BOARD_SIZE]; BOARD_SIZE];
    for row in 0..BOARD_SIZE as u8 {
        for col in 0..BOARD_SIZE as u8 {
            let p = Pos::new(row, col);
            if pos.get(p) != player {
                continue;
            }
            for (d, &(dr, dc)) in LINE_DIRECTIONS.iter().enumerate() {
                if seen[row as usize][col as usize][d] {
                    continue;
                }
                if !is_line_start(pos, p, dr, dc, player) {
                    continue;
                }
                let info = analyze_line(pos, p, dr, dc, player);
                total += line_score(&info);

                let mut mark = p;
                for _ in 0..info.consecutive {
                    seen[mark.row as usize][mark.col as usize][d] = true;
                    match mark.offset(dr, dc, 1) {
                        Some(next) => mark = next,
                        None => break,
                    }
                }
            }
        }
    }

    // Capture pressure: what this side can take next move, and what can be
    // taken from it.
    let mut opportunities = 0i32;
    for opp in find_capture_opportunities(pos, player) {
        let new_total = pos.captures(player) + 1;
        opportunities += evaluate_capture_context(pos, player, &opp.pair, new_total);
    }
    let mut threats = 0i32;
    for threat in find_capture_opportunities(pos, opponent) {
        let new_total = pos.captures(opponent) + 1;
        threats += evaluate_capture_context(pos, opponent, &threat.pair, new_total);
    }

    // Accumulated captures. The opponent side of the tally is weighted
    // heavier: losing pairs hurts more than taking them helps.
    let mine = i32::from(pos.captures(player));
    let theirs = i32::from(pos.captures(opponent));
    total += match mine {
        9.. => 300_000,
        8 => 200_000,
        6..=7 => 15_000,
        4..=5 => 6_000,
        _ => mine * 500,
    };
    total -= match theirs {
        9.. => 400_000,
        8 => 300_000,
        6..=7 => 20_000,
        4..=5 => 8_000,
        _ => theirs * 800,
    };

    total + opportunities - threats
}

/// Whether `start` begins a line segment (previous cell not the player's).
#[inline]
fn is_line_start(pos: &Position, start: Pos, dr: i32, dc: i32, player: Stone) -> bool {
    match start.offset(dr, dc, -1) {
        Some(prev) => pos.get(prev) != player,
        None => true,
    }
}

/// A capture available to a player: the empty cell to play and the pair
/// that would fall.
#[derive(Debug, Clone, Copy)]
pub struct CaptureOpportunity {
    pub at: Pos,
    pub pair: [Pos; 2],
}

/// All capture opportunities for `player` on the static board.
///
/// Scans opponent pairs along the 4 line directions and checks both
/// flanking shapes: `player, pair, empty` (play the empty ahead) and
/// `empty, pair, player` (play the empty behind).
pub fn find_capture_opportunities(pos: &Position, player: Stone) -> Vec<CaptureOpportunity> {
    let opponent = player.opponent();
    let mut found = Vec::new();

    for row in 0..BOARD_SIZE as u8 {
        for col in 0..BOARD_SIZE as u8 {
            let first = Pos::new(row, col);
            if pos.get(first) != opponent {
                continue;
            }
            for &(dr, dc) in &LINE_DIRECTIONS {
                let Some(second) = first.offset(dr, dc, 1) else {
                    continue;
                };
                if pos.get(second) != opponent {
                    continue;
                }

                let back = first.offset(dr, dc, -1);
                let front = second.offset(dr, dc, 1);

                if let (Some(back), Some(front)) = (back, front) {
                    if pos.get(back) == player && pos.is_empty(front) {
                        found.push(CaptureOpportunity {
                            at: front,
                            pair: [first, second],
                        });
                    }
                    if pos.is_empty(back) && pos.get(front) == player {
                        found.push(CaptureOpportunity {
                            at: back,
                            pair: [first, second],
                        });
                    }
                }
            }
        }
    }

    found
}

/// Count the opponent's stones on the line through `through` (excluding the
/// cell itself) along one direction.
fn run_through(pos: &Position, through: Pos, dr: i32, dc: i32, player: Stone) -> u32 {
    let mut count = 0;
    for sign in [-1i32, 1] {
        let mut step = 1;
        while let Some(p) = through.offset(dr * sign, dc * sign, step) {
            if pos.get(p) != player {
                break;
            }
            count += 1;
            step += 1;
        }
    }
    count
}

/// Value of one specific capture for `player`, given the pair that would
/// fall and the pair total the capture would reach.
///
/// Blends distance to the capture win, the defensive worth of the pair
/// (does removing it break an opponent run?) and tactical adjacency.
pub fn evaluate_capture_context(
    pos: &Position,
    player: Stone,
    pair: &[Pos; 2],
    new_total: u8,
) -> i32 {
    if new_total >= 10 {
        return 500_000;
    }

    let opponent = player.opponent();
    let mut value = match new_total {
        9 => 100_000,
        8 => 50_000,
        6..=7 => 15_000,
        _ => i32::from(new_total) * 2_000,
    };

    // Defensive worth: how long an opponent run passes through each
    // captured cell.
    for &cell in pair {
        for &(dr, dc) in &LINE_DIRECTIONS {
            let run = run_through(pos, cell, dr, dc, opponent);
            value += match run {
                4.. => 30_000,
                3 => 12_000,
                2 => 3_000,
                _ => 0,
            };
        }
    }

    // Tactical adjacency: captured cells sitting next to own stones open
    // lines for the capturing side.
    for &cell in pair {
        for &(dr, dc) in &LINE_DIRECTIONS {
            let ahead = cell.offset(dr, dc, 1).map(|p| pos.get(p) == player);
            let behind = cell.offset(dr, dc, -1).map(|p| pos.get(p) == player);
            if ahead == Some(true) || behind == Some(true) {
                value += 1_500;
            }
        }
    }

    // Urgency when the opponent is closing in on the capture win.
    if pos.captures(opponent) >= 8 {
        value += 25_000;
    }

    value
}

/// Count line-start patterns of `player` with the given consecutive length
/// and free ends. Gapped fours count alongside consecutive fours.
pub fn count_pattern_type(pos: &Position, player: Stone, length: u8, free_ends: u8) -> u32 {
    let mut count = 0;

    for row in 0..BOARD_SIZE as u8 {
        for col in 0..BOARD_SIZE as u8 {
            let p = Pos::new(row, col);
            if pos.get(p) != player {
                continue;
            }
            for &(dr, dc) in &LINE_DIRECTIONS {
                if !is_line_start(pos, p, dr, dc, player) {
                    continue;
                }
                let info = analyze_line(pos, p, dr, dc, player);
                let matches = if length == 4 {
                    (info.consecutive == 4 && info.free_ends == free_ends)
                        || (info.total == 4 && info.gaps > 0 && info.free_ends == free_ends)
                } else {
                    info.consecutive == length && info.free_ends == free_ends
                };
                if matches {
                    count += 1;
                }
            }
        }
    }

    count
}

/// Whether `player` threatens to win on their next move: any four with a
/// free end, or two open threes at once.
pub fn has_winning_threats(pos: &Position, player: Stone) -> bool {
    if count_pattern_type(pos, player, 4, 2) > 0 {
        return true;
    }
    if count_pattern_type(pos, player, 4, 1) > 0 {
        return true;
    }
    count_pattern_type(pos, player, 3, 2) >= 2
}

/// Large delta for mate-in-1 threats, applied on top of the pattern
/// scores. Defending is weighted heavier than attacking so the engine
/// never trades its own threat against a faster one.
fn immediate_threat_score(pos: &Position, player: Stone) -> i32 {
    let opponent = player.opponent();
    let mut score = 0;

    if has_winning_threats(pos, player) {
        score += 90_000;
    }
    if has_winning_threats(pos, opponent) {
        score -= 105_000;
    }

    if count_pattern_type(pos, opponent, 4, 2) > 0 {
        score -= 80_000;
    }
    if count_pattern_type(pos, opponent, 4, 1) > 0 {
        score -= 60_000;
    }
    if count_pattern_type(pos, player, 4, 2) > 0 {
        score += 70_000;
    }
    if count_pattern_type(pos, player, 4, 1) > 0 {
        score += 40_000;
    }

    score
}
