//! Level grid: two parallel row-major arrays of tiles and water cells
//!
//! Every coordinate-taking method bounds-checks first. Out-of-bounds reads
//! come back as `None` or as "blocked", writes as `false` or `0`.

pub mod water;

pub use water::{FlowMomentum, WaterCell, MAX_WATER_LEVEL};

use crate::core::types::{GridPos, Side, GRID_HEIGHT, GRID_WIDTH};
use crate::tiles::Tile;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    water: Vec<WaterCell>,
}

impl Grid {
    /// Standard 16x16 level grid filled with dry air
    pub fn new() -> Self {
        Self::with_size(GRID_WIDTH, GRID_HEIGHT)
    }

    /// Grid of arbitrary size, filled with dry air
    pub fn with_size(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let mut water = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                water.push(WaterCell::new(x, y));
            }
        }
        Self {
            width,
            height,
            tiles: vec![Tile::Air; (width * height) as usize],
            water,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Row-major array index, `None` outside the grid
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn index_of(&self, pos: GridPos) -> Option<usize> {
        self.index(pos.x, pos.y)
    }

    /// Number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        self.index(x, y).map(|i| &self.tiles[i])
    }

    #[inline]
    pub fn tile_at_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        let i = self.index(x, y)?;
        Some(&mut self.tiles[i])
    }

    #[inline]
    pub fn water_at(&self, x: i32, y: i32) -> Option<&WaterCell> {
        self.index(x, y).map(|i| &self.water[i])
    }

    #[inline]
    pub fn water_at_mut(&mut self, x: i32, y: i32) -> Option<&mut WaterCell> {
        let i = self.index(x, y)?;
        Some(&mut self.water[i])
    }

    /// Water level at a cell; zero outside the grid
    #[inline]
    pub fn level_at(&self, x: i32, y: i32) -> u8 {
        self.water_at(x, y).map(|w| w.level).unwrap_or(0)
    }

    /// Replace a tile; false if out of bounds
    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        match self.tile_at_mut(x, y) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    /// Water passes through this cell; cells outside the grid are blocking
    #[inline]
    pub fn is_transparent(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y).map(|t| t.is_transparent()).unwrap_or(false)
    }

    /// In-bounds orthogonal neighbours (above, below, left, right)
    pub fn neighbors4(&self, x: i32, y: i32) -> Vec<GridPos> {
        let origin = GridPos::new(x, y);
        [Side::Above, Side::Below, Side::Left, Side::Right]
            .into_iter()
            .map(|side| origin.step(side))
            .filter(|p| self.in_bounds(p.x, p.y))
            .collect()
    }

    /// Pour up to `qty` units into a cell; returns the units accepted.
    ///
    /// Opaque tiles and cells outside the grid accept nothing.
    pub fn add_water(&mut self, x: i32, y: i32, qty: u8) -> u8 {
        if !self.is_transparent(x, y) {
            return 0;
        }
        let Some(cell) = self.water_at_mut(x, y) else {
            return 0;
        };
        let added = qty.min(cell.headroom());
        cell.level += added;
        added
    }

    /// Take up to `qty` units out of a cell; returns the units removed
    pub fn absorb_water(&mut self, x: i32, y: i32, qty: u8) -> u8 {
        let Some(cell) = self.water_at_mut(x, y) else {
            return 0;
        };
        let taken = qty.min(cell.level);
        cell.level -= taken;
        taken
    }

    /// Sum of water over every cell
    pub fn total_water(&self) -> u32 {
        self.water.iter().map(|w| u32::from(w.level)).sum()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn water_cells(&self) -> &[WaterCell] {
        &self.water
    }

    /// Direct slice access for index-based passes
    pub(crate) fn water_cells_mut(&mut self) -> &mut [WaterCell] {
        &mut self.water
    }

    /// Clear the flow bookkeeping on every cell
    pub fn clear_no_calc(&mut self) {
        for cell in &mut self.water {
            cell.no_calc = false;
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
