//! Runtime search configuration.

use std::time::Duration;

use crate::constants::{
    DEEP_SEARCH_SECS, DEPTH_SCHEDULE, HEURISTIC_NUDGE, MCTS_BUDGET_MS, MEDIUM_SEARCH_SECS,
    UCB_EXPLORATION,
};

/// Which engine picks moves once the opening is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Alpha-beta with a depth chosen from the remaining time.
    Minimax,
    /// Time-budgeted Monte-Carlo tree search.
    Mcts,
    /// Uniformly random legal action.
    Random,
}

/// Configuration for the decision facade and both search engines.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub strategy: Strategy,

    /// Wall-clock budget for one MCTS decision.
    pub mcts_budget: Duration,

    /// Optional cap on MCTS iterations. The search stops at whichever of the
    /// budget or the cap is reached first.
    pub mcts_max_iterations: Option<usize>,

    /// UCB1 exploration constant.
    pub exploration: f64,

    /// Weight of the static evaluation term in MCTS child selection.
    pub heuristic_nudge: f64,

    /// Remaining time at or above which minimax uses `depth_schedule[0]`.
    pub deep_search_after: Duration,

    /// Remaining time at or above which minimax uses `depth_schedule[1]`.
    /// Below it, `depth_schedule[2]` is used.
    pub medium_search_after: Duration,

    pub depth_schedule: [u32; 3],

    /// Seed for the agent's random generator.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Minimax,
            mcts_budget: Duration::from_millis(MCTS_BUDGET_MS),
            mcts_max_iterations: None,
            exploration: UCB_EXPLORATION,
            heuristic_nudge: HEURISTIC_NUDGE,
            deep_search_after: Duration::from_secs(DEEP_SEARCH_SECS),
            medium_search_after: Duration::from_secs(MEDIUM_SEARCH_SECS),
            depth_schedule: DEPTH_SCHEDULE,
            seed: 0,
        }
    }
}

impl SearchConfig {
    /// Same defaults with a different strategy.
    pub fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// A small, reproducible config for tests: MCTS is bounded by an
    /// iteration cap well inside a generous time budget.
    pub fn for_testing() -> Self {
        Self {
            mcts_budget: Duration::from_secs(30),
            mcts_max_iterations: Some(48),
            seed: 42,
            ..Self::default()
        }
    }

    /// Minimax depth for the given remaining time.
    pub fn depth_for(&self, time_remaining: Duration) -> u32 {
        if time_remaining >= self.deep_search_after {
            self.depth_schedule[0]
        } else if time_remaining >= self.medium_search_after {
            self.depth_schedule[1]
        } else {
            self.depth_schedule[2]
        }
    }
}
