//! Infexion-Rust: a game engine and search agents for Infexion.
//!
//! Infexion is a two-player game on a 7x7 toroidal hex board. Each player
//! owns power stacks; a turn either spawns a new stack or spreads an existing
//! one along a direction, capturing or overflowing the stacks it lands on.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, game limits and search parameters
//! - [`hex`] - Axial coordinates with wraparound
//! - [`state`] - Core game logic (board state, legality, spawn/spread)
//! - [`error`] - Rule-violation errors
//! - [`eval`] - Static evaluation shared by both searches
//! - [`minimax`] - Fixed-depth alpha-beta search
//! - [`mcts`] - Time-budgeted Monte Carlo Tree Search
//! - [`playout`] - Random game simulation for MCTS
//! - [`config`] - Runtime search configuration
//! - [`agent`] - Decision facade and stateful player
//!
//! ## Example
//!
//! ```
//! use infexion_rust::hex::{HexDir, HexPos};
//! use infexion_rust::minimax::choose_move;
//! use infexion_rust::state::{Action, Color, GameState};
//!
//! // Red and Blue each spawn a stack next to each other
//! let state = GameState::new()
//!     .apply(Color::Red, Action::Spawn { at: HexPos::new(3, 3) })?
//!     .apply(Color::Blue, Action::Spawn { at: HexPos::new(3, 4) })?;
//!
//! // Red can capture Blue's only stack
//! let best = choose_move(&state, 2);
//! assert_eq!(
//!     best,
//!     Some(Action::Spread { at: HexPos::new(3, 3), dir: HexDir::DownRight })
//! );
//! # Ok::<(), infexion_rust::error::GameError>(())
//! ```

pub mod agent;
pub mod config;
pub mod constants;
pub mod error;
pub mod eval;
pub mod hex;
pub mod mcts;
pub mod minimax;
pub mod playout;
pub mod state;

pub use agent::{Agent, choose_action};
pub use error::GameError;
pub use state::{Action, Color, GameState, apply_action};
