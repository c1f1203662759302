//! Infexion game state and action execution.
//!
//! This module provides the core game logic, including:
//! - Board representation as a flat array of power stacks
//! - Spawn and spread execution with capture and overflow destruction
//! - Legal action generation in a fixed, reproducible order
//! - Terminal detection and result scoring
//!
//! The board is dense: a cell nobody owns is stored as [`Cell::EMPTY`], so a
//! lookup of any position always yields a cell. `apply` returns a fresh state;
//! hot search loops can instead `play` on a privately owned copy and `undo`
//! afterwards.

use std::fmt;

use crate::constants::{
    BOARD_CELLS, BOARD_N, MAX_CELL_POWER, MAX_TOTAL_POWER, MAX_TURNS, WIN_POWER_DIFF,
};
use crate::error::{GameError, IllegalReason};
use crate::hex::{HexDir, HexPos};

/// A player color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.write_str("RED"),
            Color::Blue => f.write_str("BLUE"),
        }
    }
}

/// A power stack. Power is 0 exactly when the cell has no owner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub owner: Option<Color>,
    pub power: u8,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        owner: None,
        power: 0,
    };

    pub fn new(owner: Color, power: u8) -> Self {
        Self {
            owner: Some(owner),
            power,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.owner.is_none()
    }

    #[inline]
    pub fn is_owned_by(&self, color: Color) -> bool {
        self.owner == Some(color)
    }
}

/// An action a player can take on their turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Place a power-1 stack on an empty cell.
    Spawn { at: HexPos },
    /// Lift the stack at `at` and drop one power on each of the next
    /// `power` cells along `dir`.
    Spread { at: HexPos, dir: HexDir },
}

impl Action {
    /// The cell the action originates from.
    pub fn origin(&self) -> HexPos {
        match *self {
            Action::Spawn { at } | Action::Spread { at, .. } => at,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Spawn { at } => write!(f, "SPAWN({at})"),
            Action::Spread { at, dir } => write!(f, "SPREAD({at}, {dir})"),
        }
    }
}

/// Everything [`GameState::undo`] needs to reverse one [`GameState::play`].
#[derive(Debug, Clone)]
pub struct Undo {
    /// Previous contents of every touched cell, in the order they were touched.
    cells: Vec<(HexPos, Cell)>,
    turn_color: Color,
    turn_number: u32,
}

/// An Infexion board together with whose turn it is.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    cells: [Cell; BOARD_CELLS],
    turn_color: Color,
    turn_number: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Empty board, Red to move, turn 0.
    pub fn new() -> Self {
        Self {
            cells: [Cell::EMPTY; BOARD_CELLS],
            turn_color: Color::Red,
            turn_number: 0,
        }
    }

    /// Build a state from explicit stacks.
    ///
    /// # Errors
    /// Returns [`GameError::InvalidSetup`] if a stack has no owner, a power
    /// outside `1..=MAX_CELL_POWER`, a position is listed twice, or the total
    /// power exceeds [`MAX_TOTAL_POWER`].
    pub fn from_cells<I>(cells: I, turn_color: Color, turn_number: u32) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = (HexPos, Cell)>,
    {
        let mut state = Self {
            cells: [Cell::EMPTY; BOARD_CELLS],
            turn_color,
            turn_number,
        };
        for (pos, cell) in cells {
            if cell.owner.is_none() || cell.power == 0 || cell.power > MAX_CELL_POWER {
                return Err(GameError::InvalidSetup(format!(
                    "bad stack {cell:?} at {pos}"
                )));
            }
            if !state.cell(pos).is_empty() {
                return Err(GameError::InvalidSetup(format!("{pos} listed twice")));
            }
            state.set(pos, cell);
        }
        if state.total_power() > MAX_TOTAL_POWER {
            return Err(GameError::InvalidSetup(format!(
                "total power {} exceeds {MAX_TOTAL_POWER}",
                state.total_power()
            )));
        }
        Ok(state)
    }

    #[inline]
    pub fn turn_color(&self) -> Color {
        self.turn_color
    }

    #[inline]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// The cell at `pos` (empty cells included).
    #[inline]
    pub fn cell(&self, pos: HexPos) -> Cell {
        self.cells[pos.index()]
    }

    #[inline]
    pub fn is_empty(&self, pos: HexPos) -> bool {
        self.cell(pos).is_empty()
    }

    #[inline]
    fn set(&mut self, pos: HexPos, cell: Cell) {
        self.cells[pos.index()] = cell;
    }

    /// Empty positions in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = HexPos> + '_ {
        HexPos::all().filter(move |&pos| self.is_empty(pos))
    }

    /// Combined power of every stack on the board.
    pub fn total_power(&self) -> u32 {
        self.cells.iter().map(|c| c.power as u32).sum()
    }

    /// Combined power of `color`'s stacks.
    pub fn color_power(&self, color: Color) -> u32 {
        self.cells
            .iter()
            .filter(|c| c.is_owned_by(color))
            .map(|c| c.power as u32)
            .sum()
    }

    /// `color`'s stacks in row-major order.
    pub fn color_cells(&self, color: Color) -> Vec<(HexPos, Cell)> {
        HexPos::all()
            .map(|pos| (pos, self.cell(pos)))
            .filter(|(_, c)| c.is_owned_by(color))
            .collect()
    }

    /// Number of stacks `color` owns.
    pub fn color_cell_count(&self, color: Color) -> usize {
        self.cells.iter().filter(|c| c.is_owned_by(color)).count()
    }

    /// All legal actions for `color`.
    ///
    /// Spreads come first (cells row-major, directions in [`HexDir::ALL`]
    /// order), followed by spawns (row-major). Spawns are omitted once the
    /// board reaches [`MAX_TOTAL_POWER`].
    pub fn legal_actions(&self, color: Color) -> Vec<Action> {
        let mut actions = Vec::with_capacity(BOARD_CELLS * 2);

        for pos in HexPos::all() {
            if self.cell(pos).is_owned_by(color) {
                actions.extend(HexDir::ALL.iter().map(|&dir| Action::Spread { at: pos, dir }));
            }
        }

        if self.total_power() < MAX_TOTAL_POWER {
            actions.extend(self.empty_cells().map(|at| Action::Spawn { at }));
        }

        actions
    }

    /// Check an action against the rules without touching the board.
    pub fn validate(&self, color: Color, action: Action) -> Result<(), GameError> {
        let reason = match action {
            Action::Spawn { at } => {
                if !self.is_empty(at) {
                    Some(IllegalReason::Occupied)
                } else if self.total_power() >= MAX_TOTAL_POWER {
                    Some(IllegalReason::PowerCap)
                } else {
                    None
                }
            }
            Action::Spread { at, .. } => {
                let source = self.cell(at);
                if source.is_empty() {
                    Some(IllegalReason::EmptySource)
                } else if !source.is_owned_by(color) {
                    Some(IllegalReason::NotOwned)
                } else {
                    None
                }
            }
        };

        match reason {
            Some(reason) => Err(GameError::IllegalAction {
                color,
                action,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Play `action` for `color` in place.
    ///
    /// The action is validated before anything is changed, so an error leaves
    /// the state exactly as it was. On success the turn passes to
    /// `color.opponent()` and the returned [`Undo`] reverses the move.
    pub fn play(&mut self, color: Color, action: Action) -> Result<Undo, GameError> {
        self.validate(color, action)?;
        Ok(self.play_unchecked(color, action))
    }

    /// [`GameState::play`] for actions taken from [`GameState::legal_actions`].
    pub(crate) fn play_unchecked(&mut self, color: Color, action: Action) -> Undo {
        let mut trail = Vec::with_capacity(MAX_CELL_POWER as usize + 1);
        let undo_turn = (self.turn_color, self.turn_number);
        self.execute(color, action, Some(&mut trail));
        Undo {
            cells: trail,
            turn_color: undo_turn.0,
            turn_number: undo_turn.1,
        }
    }

    /// Advance a throwaway copy (rollouts) without recording an undo trail.
    pub(crate) fn advance(&mut self, color: Color, action: Action) {
        self.execute(color, action, None);
    }

    fn execute(&mut self, color: Color, action: Action, mut trail: Option<&mut Vec<(HexPos, Cell)>>) {
        debug_assert!(self.validate(color, action).is_ok(), "{action} is illegal for {color}");

        let mut touch = |state: &mut GameState, pos: HexPos, cell: Cell| {
            if let Some(trail) = trail.as_deref_mut() {
                trail.push((pos, state.cell(pos)));
            }
            state.set(pos, cell);
        };

        match action {
            Action::Spawn { at } => touch(self, at, Cell::new(color, 1)),
            Action::Spread { at, dir } => {
                let power = self.cell(at).power;
                touch(self, at, Cell::EMPTY);

                let mut cursor = at;
                for _ in 0..power {
                    cursor = cursor + dir;
                    let target = self.cell(cursor);
                    if target.power == MAX_CELL_POWER {
                        // Overflow: the stack is destroyed and its power lost
                        touch(self, cursor, Cell::EMPTY);
                    } else {
                        touch(self, cursor, Cell::new(color, target.power + 1));
                    }
                }
            }
        }

        self.turn_color = color.opponent();
        self.turn_number += 1;
    }

    /// Reverse the [`GameState::play`] call that produced `undo`.
    ///
    /// Undo records must be applied in the reverse order they were created.
    pub fn undo(&mut self, undo: Undo) {
        for (pos, cell) in undo.cells.into_iter().rev() {
            self.set(pos, cell);
        }
        self.turn_color = undo.turn_color;
        self.turn_number = undo.turn_number;
    }

    /// Return the state after `color` plays `action`, leaving `self` intact.
    pub fn apply(&self, color: Color, action: Action) -> Result<GameState, GameError> {
        let mut next = self.clone();
        next.play(color, action)?;
        Ok(next)
    }

    /// Whether the game is over. Never true during the first two turns.
    pub fn is_terminal(&self) -> bool {
        if self.turn_number < 2 {
            return false;
        }
        self.turn_number >= MAX_TURNS
            || self.color_power(Color::Red) == 0
            || self.color_power(Color::Blue) == 0
    }

    /// Winner of a finished game, or `None` when the powers are too close.
    ///
    /// Must only be called once [`GameState::is_terminal`] holds.
    pub fn result(&self) -> Option<Color> {
        debug_assert!(self.is_terminal(), "result() queried on a live game");
        if !self.is_terminal() {
            return None;
        }

        let red = self.color_power(Color::Red);
        let blue = self.color_power(Color::Blue);
        if red.abs_diff(blue) < WIN_POWER_DIFF {
            return None;
        }
        Some(if red > blue { Color::Red } else { Color::Blue })
    }

    /// Mark every cell one of `color`'s spreads could land on.
    ///
    /// Sources are not lifted and overflow is ignored: this is a reach map,
    /// not a simulation.
    pub fn threatened_cells(&self, color: Color) -> [bool; BOARD_CELLS] {
        let mut threatened = [false; BOARD_CELLS];
        for (pos, cell) in self.color_cells(color) {
            for dir in HexDir::ALL {
                let mut cursor = pos;
                for _ in 0..cell.power {
                    cursor = cursor + dir;
                    threatened[cursor.index()] = true;
                }
            }
        }
        threatened
    }

    /// Positions held by `color.opponent()` that `color` can reach with a
    /// single spread.
    pub fn unsafe_positions(&self, color: Color) -> Vec<HexPos> {
        let threatened = self.threatened_cells(color);
        let victim = color.opponent();
        HexPos::all()
            .filter(|&pos| threatened[pos.index()] && self.cell(pos).is_owned_by(victim))
            .collect()
    }
}

/// Apply `action` for `color` to `state`, producing the next state.
pub fn apply_action(state: &GameState, color: Color, action: Action) -> Result<GameState, GameError> {
    state.apply(color, action)
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "turn {} ({} to move) red={} blue={}",
            self.turn_number,
            self.turn_color,
            self.color_power(Color::Red),
            self.color_power(Color::Blue)
        )?;
        for r in (0..BOARD_N).rev() {
            write!(f, "{:width$}", "", width = BOARD_N - 1 - r)?;
            for q in 0..BOARD_N {
                let cell = self.cell(HexPos::new(r as i32, q as i32));
                match cell.owner {
                    Some(Color::Red) => write!(f, "r{} ", cell.power)?,
                    Some(Color::Blue) => write!(f, "b{} ", cell.power)?,
                    None => write!(f, " . ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
