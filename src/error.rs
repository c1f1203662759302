//! Error types for rule violations.

use thiserror::Error;

use crate::state::{Action, Color};

/// Errors raised by the game-state transition engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The action breaks a game rule. The state is left untouched.
    #[error("Illegal action {action} by {color}: {reason}")]
    IllegalAction {
        color: Color,
        action: Action,
        reason: IllegalReason,
    },

    /// The side to move has no legal action and forfeits.
    #[error("No legal actions for {0}")]
    NoLegalActions(Color),

    /// A decision was requested for the side that is not to move.
    #[error("{0} asked to move out of turn")]
    OutOfTurn(Color),

    /// A hand-built board does not satisfy the state invariants.
    #[error("Invalid setup: {0}")]
    InvalidSetup(String),
}

/// Why an action was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalReason {
    #[error("cell is occupied")]
    Occupied,
    #[error("board is at the power cap")]
    PowerCap,
    #[error("cell is empty")]
    EmptySource,
    #[error("cell belongs to the opponent")]
    NotOwned,
}
