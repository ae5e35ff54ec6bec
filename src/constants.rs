//! Constants for board geometry, game rules, evaluation weights and search parameters.
//!
//! The board is the standard Bagh-Chal grid of 5x5 intersections:
//!
//! ```text
//!       0   1   2   3   4
//!     0 T - . - . - . - T
//!       | \ | / | \ | / |
//!     1 . - . - . - . - .
//!       | / | \ | / | \ |
//!     2 . - . - . - . - .
//!       | \ | / | \ | / |
//!     3 . - . - . - . - .
//!       | / | \ | / | \ |
//!     4 T - . - . - . - T
//! ```
//!
//! Diagonal lines only run through intersections whose coordinates share parity.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN intersections).
pub const N: i32 = 5;

/// Largest valid coordinate on either axis.
pub const MAX_COORD: i32 = N - 1;

/// Starting squares of the four tigers (the corners).
pub const TIGER_START: [(i32, i32); 4] = [(0, 0), (0, MAX_COORD), (MAX_COORD, 0), (MAX_COORD, MAX_COORD)];

// =============================================================================
// Game Rules
// =============================================================================

/// Number of tigers on the board for the whole game.
pub const TIGER_COUNT: usize = 4;

/// Goats the goat player starts with in hand.
pub const PLACEABLE_GOATS: u32 = 20;

/// Captured goats needed for the tigers to win.
pub const CAPTURES_TO_WIN: u32 = 5;

/// Trapped tigers needed for the goats to win.
pub const TRAPPED_TO_WIN: u32 = 4;

/// Number of recent moves kept for repetition detection.
pub const HISTORY_LEN: usize = 5;

/// Step distance of an ordinary move.
pub const STEP_DISTANCE: i32 = 1;

/// Jump distance of a tiger capture.
pub const CAPTURE_DISTANCE: i32 = 2;

// =============================================================================
// Evaluation (tiger perspective)
// =============================================================================

/// Score of a won game for the tigers.
pub const TIGER_WIN_SCORE: i32 = 100_000;

/// Score of a won game for the goats.
pub const GOAT_WIN_SCORE: i32 = -100_000;

/// Score of a drawn game.
pub const DRAW_SCORE: i32 = -50_000;

pub const WEIGHT_GOAT_CAPTURED: i32 = 1000;
pub const WEIGHT_POSSIBLE_CAPTURE: i32 = 200;
pub const WEIGHT_TIGER_IN_CORNER: i32 = 50;
pub const WEIGHT_TIGER_TRAPPED: i32 = -500;
pub const WEIGHT_OUTSIDE_GOAT: i32 = -10;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default minimax depth.
pub const DEFAULT_DEPTH: u32 = 4;

/// Deepest minimax search offered to users.
pub const MAX_DEPTH: u32 = 5;

/// Default MCTS thinking time in seconds.
pub const DEFAULT_TIME_SECS: f64 = 2.0;

/// Longest MCTS thinking time accepted from users, in seconds.
pub const MAX_TIME_SECS: f64 = 3600.0;

/// UCB exploration bias.
pub const UCB_BIAS: f64 = 2.0;

/// Win increment credited during backpropagation.
pub const WIN_REWARD: f64 = 1.0;

/// Increment credited to every node on a drawn playout.
pub const DRAW_REWARD: f64 = 0.5;

/// Maximum plies of a single random playout before it is scored as a draw.
pub const MAX_PLAYOUT_PLIES: usize = 400;
