//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation tick counter
pub type Tick = u64;

/// Grid width in cells
pub const GRID_WIDTH: i32 = 16;

/// Grid height in cells
pub const GRID_HEIGHT: i32 = 16;

/// Cell coordinate on the level grid
///
/// Row 0 is the top of the level; "below" is `y + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn above(&self) -> Self {
        Self::new(self.x, self.y - 1)
    }

    pub fn below(&self) -> Self {
        Self::new(self.x, self.y + 1)
    }

    pub fn left(&self) -> Self {
        Self::new(self.x - 1, self.y)
    }

    pub fn right(&self) -> Self {
        Self::new(self.x + 1, self.y)
    }

    /// Step one cell towards `side`
    pub fn step(&self, side: Side) -> Self {
        match side {
            Side::Above => self.above(),
            Side::Below => self.below(),
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }
}

/// One of the four orthogonal neighbours of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Above,
    Below,
    Left,
    Right,
}

impl Side {
    /// Order used when a wet cell or damp tile hands water to its neighbours.
    ///
    /// Gravity first, then sideways, upward last.
    pub const HYDRATION_ORDER: [Side; 4] = [Side::Below, Side::Right, Side::Left, Side::Above];
}
