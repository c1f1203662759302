//! Decision facade: picks one action per turn.
//!
//! The opening is played with a cheap random spawn policy. After that the
//! configured [`Strategy`] takes over: alpha-beta at a depth chosen from the
//! remaining time, time-budgeted MCTS, or a uniformly random legal action.
//!
//! [`Agent`] wraps the facade with the board it tracks for one player, the
//! way an orchestrator drives a player: ask for an `action`, then report
//! every played action back through `turn`.

use std::time::Duration;

use tracing::debug;

use crate::config::{SearchConfig, Strategy};
use crate::constants::OPENING_TURNS;
use crate::error::GameError;
use crate::mcts::tree_search;
use crate::minimax::AlphaBeta;
use crate::state::{Action, Color, GameState};

/// Choose an action for `color`, which must be the side to move in `state`.
///
/// # Errors
/// - [`GameError::OutOfTurn`] if `color` is not to move.
/// - [`GameError::NoLegalActions`] if `color` has nothing to play. The
///   caller should treat this as a forfeit.
pub fn choose_action(
    state: &GameState,
    color: Color,
    time_remaining: Duration,
    config: &SearchConfig,
    rng: &mut fastrand::Rng,
) -> Result<Action, GameError> {
    if state.turn_color() != color {
        return Err(GameError::OutOfTurn(color));
    }

    let actions = state.legal_actions(color);
    if actions.is_empty() {
        return Err(GameError::NoLegalActions(color));
    }

    if state.turn_number() < OPENING_TURNS || state.color_cell_count(color) == 0 {
        let spawns: Vec<Action> = actions
            .iter()
            .copied()
            .filter(|a| matches!(a, Action::Spawn { .. }))
            .collect();
        if !spawns.is_empty() {
            let action = spawns[rng.usize(..spawns.len())];
            debug!(%color, %action, "opening spawn");
            return Ok(action);
        }
    }

    let action = match config.strategy {
        Strategy::Random => Some(actions[rng.usize(..actions.len())]),
        Strategy::Minimax => {
            let depth = config.depth_for(time_remaining);
            AlphaBeta::new(color).search(state, depth).action
        }
        Strategy::Mcts => {
            // Never plan past the caller's clock
            let budgeted = SearchConfig {
                mcts_budget: config.mcts_budget.min(time_remaining),
                ..config.clone()
            };
            tree_search(state, &budgeted, rng).action
        }
    };

    // Both searches return an action whenever one is legal
    let action = action.unwrap_or(actions[0]);
    debug!(%color, %action, strategy = ?config.strategy, "action chosen");
    Ok(action)
}

/// A player that owns its own copy of the board.
pub struct Agent {
    color: Color,
    state: GameState,
    config: SearchConfig,
    rng: fastrand::Rng,
}

impl Agent {
    /// Create an agent on an empty board, seeding its generator from
    /// `config.seed`.
    pub fn new(color: Color, config: SearchConfig) -> Self {
        let rng = fastrand::Rng::with_seed(config.seed);
        Self::with_rng(color, config, rng)
    }

    pub fn with_rng(color: Color, config: SearchConfig, rng: fastrand::Rng) -> Self {
        Self {
            color,
            state: GameState::new(),
            config,
            rng,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// The agent's view of the board.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Pick the next action. The board is not changed until the action comes
    /// back through [`Agent::turn`].
    pub fn action(&mut self, time_remaining: Duration) -> Result<Action, GameError> {
        choose_action(
            &self.state,
            self.color,
            time_remaining,
            &self.config,
            &mut self.rng,
        )
    }

    /// Record that `color` played `action`.
    pub fn turn(&mut self, color: Color, action: Action) -> Result<(), GameError> {
        self.state.play(color, action)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::hex::HexPos;
    use crate::state::Cell;

    #[test]
    fn test_opening_only_spawns() {
        for strategy in [Strategy::Minimax, Strategy::Mcts, Strategy::Random] {
            let config = SearchConfig {
                strategy,
                ..SearchConfig::for_testing()
            };
            let mut rng = fastrand::Rng::with_seed(11);
            let state = GameState::new();
            let action = choose_action(&state, Color::Red, Duration::from_secs(180), &config, &mut rng)
                .unwrap();
            assert!(matches!(action, Action::Spawn { .. }), "{strategy:?} gave {action}");
        }
    }

    #[test]
    fn test_out_of_turn_is_rejected() {
        let mut rng = fastrand::Rng::with_seed(1);
        let err = choose_action(
            &GameState::new(),
            Color::Blue,
            Duration::from_secs(1),
            &SearchConfig::for_testing(),
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, GameError::OutOfTurn(Color::Blue));
    }

    #[test]
    fn test_no_legal_actions_is_forfeit() {
        let cells: Vec<_> = HexPos::all()
            .map(|p| (p, Cell::new(Color::Blue, 1)))
            .collect();
        let state = GameState::from_cells(cells, Color::Red, 30).unwrap();
        let mut rng = fastrand::Rng::with_seed(1);
        let err = choose_action(
            &state,
            Color::Red,
            Duration::from_secs(1),
            &SearchConfig::for_testing(),
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, GameError::NoLegalActions(Color::Red));
    }

    #[test]
    fn test_mcts_stays_within_time_remaining() {
        let state = GameState::from_cells(
            [
                (HexPos::new(1, 1), Cell::new(Color::Red, 2)),
                (HexPos::new(4, 4), Cell::new(Color::Blue, 2)),
            ],
            Color::Red,
            4,
        )
        .unwrap();
        let config = SearchConfig::with_strategy(Strategy::Mcts);
        assert!(config.mcts_budget > Duration::from_millis(100));
        let mut rng = fastrand::Rng::with_seed(9);

        let started = Instant::now();
        let action =
            choose_action(&state, Color::Red, Duration::from_millis(100), &config, &mut rng).unwrap();
        let elapsed = started.elapsed();

        assert!(state.legal_actions(Color::Red).contains(&action));
        // The last iteration may run a little past the deadline
        assert!(elapsed < Duration::from_millis(600), "took {elapsed:?}");
    }

    #[test]
    fn test_mover_without_cells_spawns_at_random() {
        // Red was wiped out mid-game; the facade falls back to a random spawn
        let state = GameState::from_cells(
            [
                (HexPos::new(2, 2), Cell::new(Color::Blue, 3)),
                (HexPos::new(5, 0), Cell::new(Color::Blue, 1)),
            ],
            Color::Red,
            9,
        )
        .unwrap();
        let config = SearchConfig::with_strategy(Strategy::Minimax);
        let spawns: Vec<Action> = state
            .legal_actions(Color::Red)
            .into_iter()
            .filter(|a| matches!(a, Action::Spawn { .. }))
            .collect();

        for seed in 0..4 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let action =
                choose_action(&state, Color::Red, Duration::from_secs(180), &config, &mut rng)
                    .unwrap();

            let mut expected_rng = fastrand::Rng::with_seed(seed);
            let expected = spawns[expected_rng.usize(..spawns.len())];
            assert_eq!(action, expected, "seed {seed}");
            assert!(state.is_empty(action.origin()));
        }
    }

    #[test]
    fn test_agent_tracks_both_players() {
        let mut red = Agent::new(Color::Red, SearchConfig::for_testing());
        let first = red.action(Duration::from_secs(180)).unwrap();
        red.turn(Color::Red, first).unwrap();

        let reply = Action::Spawn {
            at: HexPos::all()
                .find(|&p| p != first.origin())
                .unwrap(),
        };
        red.turn(Color::Blue, reply).unwrap();

        assert_eq!(red.state().turn_number(), 2);
        assert_eq!(red.state().turn_color(), Color::Red);
        assert_eq!(red.state().color_power(Color::Red), 1);
        assert_eq!(red.state().color_power(Color::Blue), 1);
    }
}
