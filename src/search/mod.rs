//! Search components
//!
//! - Zobrist hashing for position identification
//! - Bounded transposition table with aging replacement
//! - Iterative-deepening negamax with alpha-beta pruning

pub mod alphabeta;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{SearchObserver, SearchResult, Searcher};
pub use tt::{Bound, TranspositionTable, TtEntry, TtStats};
pub use zobrist::ZobristTable;
