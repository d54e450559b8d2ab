//! Constants for board geometry, starting layout and search parameters.
//!
//! The board is a fixed 8x8 grid. Cells are addressed either by `(row, col)`
//! or by a bit index `row * BOARD_SIZE + col` into the per-color bitboards.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN).
pub const BOARD_SIZE: usize = 8;

/// Number of cells on the board.
pub const NUM_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// Starting white pieces as bit indices: (3,3) and (4,4).
pub const START_WHITE: [usize; 2] = [27, 36];

/// Starting black pieces as bit indices: (3,4) and (4,3).
pub const START_BLACK: [usize; 2] = [28, 35];

/// Directions scanned for captures, as `(d_row, d_col)`.
pub const DIRECTIONS: [(isize, isize); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default number of simulations per move.
pub const N_SIMS: usize = 1000;

/// Default UCT exploration constant.
pub const EXPLORATION: f64 = 2.0;

/// Stand-in for a node's total visit count while it is still zero.
pub const UNVISITED_TOTAL: f64 = 10_000_000.0;

// =============================================================================
// Transposition Store
// =============================================================================

/// Number of buckets in the transposition store. Never resized.
pub const TABLE_BUCKETS: usize = 10_000;
