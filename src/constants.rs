//! Constants for board dimensions, game limits, and search parameters.
//!
//! The board is a 7x7 torus of hexagonal cells addressed with axial
//! coordinates. Cells are stored in a flat array in row-major order, so a
//! cell at `(r, q)` lives at index `r * BOARD_N + q`.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Both axial components wrap modulo this value.
pub const BOARD_N: usize = 7;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = BOARD_N * BOARD_N;

// =============================================================================
// Game Limits
// =============================================================================

/// Highest power a single stack can hold. Spreading onto a stack at this
/// power destroys it.
pub const MAX_CELL_POWER: u8 = 6;

/// Cap on the combined power of every stack on the board. Spawning is not
/// allowed once the board reaches it.
pub const MAX_TOTAL_POWER: u32 = 49;

/// Turn limit (7^3). The game ends once this many actions have been played.
pub const MAX_TURNS: u32 = 343;

/// Minimum power lead needed to be declared the winner of a finished game.
pub const WIN_POWER_DIFF: u32 = 2;

// =============================================================================
// Evaluation
// =============================================================================

/// Sentinel score for a certain win.
pub const WIN_SCORE: f64 = 10_000.0;

/// Sentinel score for a certain (or near-certain) loss.
pub const LOSS_SCORE: f64 = -10_000.0;

/// Upper bound of the tie-breaking jitter added to heuristic scores.
pub const JITTER: f64 = 0.1;

/// Safety weight used when the evaluated side does not lead in cell count.
pub const TRAILING_SAFETY_WEIGHT: f64 = 1.5;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// UCB1 exploration constant.
pub const UCB_EXPLORATION: f64 = 0.1;

/// Weight of the static evaluation in the child selection score.
pub const HEURISTIC_NUDGE: f64 = 0.01;

/// Default wall-clock budget for one MCTS decision, in milliseconds.
pub const MCTS_BUDGET_MS: u64 = 1_000;

// =============================================================================
// Minimax Depth Schedule
// =============================================================================

/// Remaining time (seconds) at or above which minimax searches at full depth.
pub const DEEP_SEARCH_SECS: u64 = 80;

/// Remaining time (seconds) at or above which minimax searches at medium depth.
pub const MEDIUM_SEARCH_SECS: u64 = 20;

/// Search depths for the three time tiers, deepest first.
pub const DEPTH_SCHEDULE: [u32; 3] = [3, 2, 1];

/// Turns during which agents only spawn (no search).
pub const OPENING_TURNS: u32 = 2;
