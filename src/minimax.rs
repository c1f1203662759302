//! Fixed-depth minimax with alpha-beta pruning.
//!
//! The searcher walks a private working copy of the root state, advancing it
//! with [`GameState::play`] semantics and restoring it with
//! [`GameState::undo`] after every child, so sibling branches always start
//! from the same board. Leaves are scored with [`evaluate`] from the root
//! mover's perspective.

use tracing::debug;

use crate::constants::WIN_SCORE;
use crate::eval::evaluate;
use crate::state::{Action, Color, GameState};

/// Outcome of a root search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best action found, `None` if the root had no legal action.
    pub action: Option<Action>,
    /// Backed-up value of `action`.
    pub score: f64,
    /// Depth the search ran at.
    pub depth: u32,
    /// Number of positions visited.
    pub nodes: u64,
}

/// Alpha-beta searcher for one root player.
pub struct AlphaBeta {
    perspective: Color,
    nodes: u64,
}

impl AlphaBeta {
    pub fn new(perspective: Color) -> Self {
        Self {
            perspective,
            nodes: 0,
        }
    }

    /// Search `state` to `depth` plies with `self.perspective` to move.
    ///
    /// Ties keep the first action in [`GameState::legal_actions`] order, and a
    /// child that backs up a certain win is returned without looking at its
    /// siblings. A depth of 0 is treated as 1.
    pub fn search(&mut self, state: &GameState, depth: u32) -> SearchResult {
        let depth = depth.max(1);
        let root = self.perspective;
        let mut working = state.clone();

        let mut best_action = None;
        let mut best_value = f64::NEG_INFINITY;
        let beta = f64::INFINITY;

        for action in working.legal_actions(root) {
            let undo = working.play_unchecked(root, action);
            let value = self.min_value(&mut working, best_value, beta, depth - 1);
            working.undo(undo);

            if value >= WIN_SCORE {
                best_action = Some(action);
                best_value = value;
                break;
            }
            if value > best_value {
                best_value = value;
                best_action = Some(action);
            }
        }

        debug!(
            color = %root,
            depth,
            nodes = self.nodes,
            score = best_value,
            action = ?best_action,
            "alpha-beta search finished"
        );

        SearchResult {
            action: best_action,
            score: best_value,
            depth,
            nodes: self.nodes,
        }
    }

    /// Value of `state` for the maximising (root) player.
    pub fn max_value(&mut self, state: &mut GameState, mut alpha: f64, beta: f64, depth: u32) -> f64 {
        self.nodes += 1;
        if depth == 0 || state.is_terminal() {
            return evaluate(state, self.perspective);
        }

        let mover = state.turn_color();
        let actions = state.legal_actions(mover);
        if actions.is_empty() {
            return evaluate(state, self.perspective);
        }

        let mut value = f64::NEG_INFINITY;
        for action in actions {
            let undo = state.play_unchecked(mover, action);
            let v = self.min_value(state, alpha, beta, depth - 1);
            state.undo(undo);

            value = value.max(v);
            if value >= beta {
                return value;
            }
            alpha = alpha.max(value);
        }
        value
    }

    /// Value of `state` when the root player's opponent is to move.
    pub fn min_value(&mut self, state: &mut GameState, alpha: f64, mut beta: f64, depth: u32) -> f64 {
        self.nodes += 1;
        if depth == 0 || state.is_terminal() {
            return evaluate(state, self.perspective);
        }

        let mover = state.turn_color();
        let actions = state.legal_actions(mover);
        if actions.is_empty() {
            return evaluate(state, self.perspective);
        }

        let mut value = f64::INFINITY;
        for action in actions {
            let undo = state.play_unchecked(mover, action);
            let v = self.max_value(state, alpha, beta, depth - 1);
            state.undo(undo);

            value = value.min(v);
            if value <= alpha {
                return value;
            }
            beta = beta.min(value);
        }
        value
    }
}

/// Best action for the side to move in `state`, searched to `depth` plies.
pub fn choose_move(state: &GameState, depth: u32) -> Option<Action> {
    AlphaBeta::new(state.turn_color()).search(state, depth).action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{HexDir, HexPos};
    use crate::state::Cell;

    fn pos(r: i32, q: i32) -> HexPos {
        HexPos::new(r, q)
    }

    #[test]
    fn test_depth_one_matches_greedy_evaluation() {
        let state = GameState::from_cells(
            [
                (pos(1, 1), Cell::new(Color::Red, 2)),
                (pos(4, 4), Cell::new(Color::Blue, 3)),
                (pos(4, 6), Cell::new(Color::Blue, 1)),
            ],
            Color::Red,
            6,
        )
        .unwrap();

        let mut greedy = None;
        let mut greedy_value = f64::NEG_INFINITY;
        for action in state.legal_actions(Color::Red) {
            let child = state.apply(Color::Red, action).unwrap();
            let value = evaluate(&child, Color::Red);
            if value > greedy_value {
                greedy_value = value;
                greedy = Some(action);
            }
        }

        let result = AlphaBeta::new(Color::Red).search(&state, 1);
        assert_eq!(result.action, greedy);
        assert_eq!(result.score, greedy_value);
    }

    #[test]
    fn test_takes_last_enemy_stack() {
        let state = GameState::from_cells(
            [
                (pos(3, 3), Cell::new(Color::Red, 2)),
                (pos(3, 4), Cell::new(Color::Blue, 1)),
            ],
            Color::Red,
            4,
        )
        .unwrap();
        for depth in 1..=3 {
            assert_eq!(
                choose_move(&state, depth),
                Some(Action::Spread {
                    at: pos(3, 3),
                    dir: HexDir::DownRight
                }),
                "depth {depth}"
            );
        }
    }

    #[test]
    fn test_no_legal_actions_returns_none() {
        // Blue owns the whole board at the power cap; Red has nothing to do
        let cells: Vec<_> = HexPos::all()
            .map(|p| (p, Cell::new(Color::Blue, 1)))
            .collect();
        let state = GameState::from_cells(cells, Color::Red, 60).unwrap();
        let result = AlphaBeta::new(Color::Red).search(&state, 2);
        assert_eq!(result.action, None);
    }
}
