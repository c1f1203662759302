//! Static evaluation shared by minimax and MCTS.
//!
//! The score is built from three terms seen from one side of the board:
//! the power differential, the cell-count differential, and "safety", the
//! power sitting on cells the opponent cannot reach with a single spread.

use crate::constants::{BOARD_CELLS, JITTER, LOSS_SCORE, TRAILING_SAFETY_WEIGHT, WIN_SCORE};
use crate::state::{Color, GameState};

/// Score `state` from `perspective`'s point of view. Higher is better.
///
/// Once the opening is over (turn 2 onwards), a board where the opponent has
/// no power scores [`WIN_SCORE`], and a board where `perspective` is down to
/// at most one cell with no safe power scores [`LOSS_SCORE`].
pub fn evaluate(state: &GameState, perspective: Color) -> f64 {
    let opponent = perspective.opponent();
    let decided = state.turn_number() >= 2;

    let opp_power = state.color_power(opponent);
    if decided && opp_power == 0 {
        return WIN_SCORE;
    }

    let threatened: [bool; BOARD_CELLS] = state.threatened_cells(opponent);
    let mut own_power = 0u32;
    let mut own_cells = 0u32;
    let mut safety = 0u32;
    for (pos, cell) in state.color_cells(perspective) {
        own_power += cell.power as u32;
        own_cells += 1;
        if !threatened[pos.index()] {
            safety += cell.power as u32;
        }
    }

    if decided && safety == 0 && own_cells <= 1 {
        return LOSS_SCORE;
    }

    let opp_cells = state.color_cell_count(opponent) as f64;
    let diff_power = own_power as f64 - opp_power as f64;
    let diff_cells = own_cells as f64 - opp_cells;

    // Leading on cells makes safety matter less; trailing makes it matter more
    let safety_weight = if diff_cells > 0.0 {
        1.0 - diff_cells / own_cells as f64
    } else {
        TRAILING_SAFETY_WEIGHT
    };

    0.5 * diff_power - opp_power as f64 + diff_cells + safety_weight * safety as f64
}

/// [`evaluate`] plus a small uniform jitter in `[0, JITTER)` drawn from `rng`.
///
/// Only used to break ties between equally scored moves.
pub fn evaluate_with_jitter(state: &GameState, perspective: Color, rng: &mut fastrand::Rng) -> f64 {
    evaluate(state, perspective) + rng.f64() * JITTER
}
