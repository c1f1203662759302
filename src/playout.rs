//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random legal actions until the game ends, then
//! reports the winner. All randomness comes from the caller's generator, so a
//! fixed seed replays the same game.

use crate::state::{Color, GameState};

/// Play random legal actions from `state` until the game is over.
///
/// Returns the winner, or `None` for a game too close to call. A side left
/// without any legal action forfeits to its opponent.
pub fn mcplayout(state: &GameState, rng: &mut fastrand::Rng) -> Option<Color> {
    let mut state = state.clone();

    while !state.is_terminal() {
        let mover = state.turn_color();
        let actions = state.legal_actions(mover);
        if actions.is_empty() {
            return Some(mover.opponent());
        }
        let action = actions[rng.usize(..actions.len())];
        state.advance(mover, action);
    }

    state.result()
}
