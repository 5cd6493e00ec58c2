//! Ninuki decision engine
//!
//! The move-deciding core of a Gomoku variant with captures, played on the
//! standard 19x19 board:
//! - five or more in a row wins, unless the opponent can immediately break
//!   the line by capturing a pair out of it;
//! - bracketing an opposing pair (`X O O X`) captures it; ten captured
//!   pairs win outright;
//! - a move creating two free-threes at once is forbidden.
//!
//! # Architecture
//!
//! - [`board`]: grid, positions and the pending-win record
//! - [`rules`]: legality, capture resolution and win detection
//! - [`eval`]: pattern-based static evaluation
//! - [`search`]: Zobrist hashing, transposition table, iterative-deepening
//!   negamax
//! - [`engine`]: the entry point consumed by front-ends, plus the
//!   game-flow helpers that carry the break-by-capture protocol between
//!   plies
//!
//! # Quick start
//!
//! ```
//! use ninuki::{apply_human_move, Engine, Pos, Position};
//!
//! let mut pos = Position::new();
//! let mut engine = Engine::with_config(1024 * 1024, 2);
//!
//! apply_human_move(&mut pos, Pos::new(9, 9)).unwrap();
//! if let Some(reply) = engine.apply_engine_move(&mut pos) {
//!     println!("engine answers {}", ninuki::engine::notation(reply));
//! }
//! ```
//!
//! The engine is single-threaded and synchronous: a search call runs to
//! completion for its fixed depth budget. Each instance owns its caches,
//! so independent games want independent engines.

pub mod board;
pub mod engine;
pub mod eval;
pub mod rules;
pub mod search;

// Re-export the common surface
pub use board::{Pos, Position, Stone, BOARD_SIZE};
pub use engine::{apply_human_move, is_game_over, winner, Engine, EngineStats};
pub use rules::{apply_move, Applied, IllegalMove};
pub use search::{SearchObserver, SearchResult, Searcher};
