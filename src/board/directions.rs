//! Shared direction tables for board traversal.
//!
//! Line scans (win detection, pattern analysis) walk the 4 main directions
//! in both signs; capture detection and neighbourhood checks walk all 8.

/// Main 4 directions: horizontal, vertical, both diagonals.
pub const LINE_DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal SW
];

/// All 8 neighbourhood directions.
pub const ALL_DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
