//! Game rules for the Ninuki capture variant
//!
//! - Pair captures (`Self,Opp,Opp,Self` bracket in any of 8 directions)
//! - Double free-three prohibition
//! - Win by 10 captured pairs, or five-in-a-row with the break-by-capture
//!   and capture-loss overrides

pub mod apply;
pub mod capture;
pub mod forbidden;
pub mod win;

// Re-exports for convenient access
pub use apply::{apply_move, Applied, IllegalMove};
pub use capture::{find_captures, has_capture};
pub use forbidden::{creates_double_free_three, is_legal_move};
pub use win::{
    can_break_line_by_capture, check_win, find_five_run, line_break_moves, opponent_can_capture,
};
