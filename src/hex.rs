//! Axial hex coordinates on a toroidal board.
//!
//! Every coordinate is kept normalised to `0..BOARD_N` on both axes, so
//! structural equality and hashing already account for wraparound.

use std::fmt;
use std::ops::Add;

use crate::constants::{BOARD_CELLS, BOARD_N};

/// A cell position `(r, q)` on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexPos {
    r: u8,
    q: u8,
}

impl HexPos {
    /// Create a position, wrapping both components onto the board.
    pub fn new(r: i32, q: i32) -> Self {
        let n = BOARD_N as i32;
        Self {
            r: r.rem_euclid(n) as u8,
            q: q.rem_euclid(n) as u8,
        }
    }

    #[inline]
    pub fn r(self) -> usize {
        self.r as usize
    }

    #[inline]
    pub fn q(self) -> usize {
        self.q as usize
    }

    /// Index of this position in a row-major cell array.
    #[inline]
    pub fn index(self) -> usize {
        self.r() * BOARD_N + self.q()
    }

    /// Inverse of [`HexPos::index`].
    #[inline]
    pub fn from_index(idx: usize) -> Self {
        debug_assert!(idx < BOARD_CELLS);
        Self {
            r: (idx / BOARD_N) as u8,
            q: (idx % BOARD_N) as u8,
        }
    }

    /// All board positions in row-major order.
    pub fn all() -> impl Iterator<Item = HexPos> {
        (0..BOARD_CELLS).map(HexPos::from_index)
    }
}

impl Add<HexDir> for HexPos {
    type Output = HexPos;

    fn add(self, dir: HexDir) -> HexPos {
        let (dr, dq) = dir.delta();
        HexPos::new(self.r as i32 + dr, self.q as i32 + dq)
    }
}

impl fmt::Display for HexPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.r, self.q)
    }
}

/// One of the six axial unit directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HexDir {
    DownRight,
    Down,
    DownLeft,
    UpLeft,
    Up,
    UpRight,
}

impl HexDir {
    /// Fixed iteration order used for move generation.
    pub const ALL: [HexDir; 6] = [
        HexDir::Down,
        HexDir::DownRight,
        HexDir::DownLeft,
        HexDir::Up,
        HexDir::UpRight,
        HexDir::UpLeft,
    ];

    /// `(dr, dq)` offset of this direction.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            HexDir::DownRight => (0, 1),
            HexDir::Down => (-1, 1),
            HexDir::DownLeft => (-1, 0),
            HexDir::UpLeft => (0, -1),
            HexDir::Up => (1, -1),
            HexDir::UpRight => (1, 0),
        }
    }

    pub fn opposite(self) -> HexDir {
        match self {
            HexDir::DownRight => HexDir::UpLeft,
            HexDir::Down => HexDir::Up,
            HexDir::DownLeft => HexDir::UpRight,
            HexDir::UpLeft => HexDir::DownRight,
            HexDir::Up => HexDir::Down,
            HexDir::UpRight => HexDir::DownLeft,
        }
    }
}

impl fmt::Display for HexDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HexDir::DownRight => "down-right",
            HexDir::Down => "down",
            HexDir::DownLeft => "down-left",
            HexDir::UpLeft => "up-left",
            HexDir::Up => "up",
            HexDir::UpRight => "up-right",
        };
        f.write_str(name)
    }
}
