//! Per-cell view data for a front end

use serde::Serialize;

use crate::simulation::state::Simulation;
use crate::tiles::TileKind;

/// What a renderer needs to draw one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderInfo {
    pub terrain: TileKind,
    /// Artwork stage (dirt wetness, sapling growth)
    pub variant: u8,
    pub water_level: u8,
    /// Water here with a dry cell (or the grid edge) directly above
    pub is_top_of_body: bool,
}

impl Simulation {
    /// Render data for a cell, `None` outside the grid
    pub fn render_info(&self, x: i32, y: i32) -> Option<RenderInfo> {
        let tile = self.grid.tile_at(x, y)?;
        let water_level = self.grid.level_at(x, y);

        Some(RenderInfo {
            terrain: tile.kind(),
            variant: tile.variant(),
            water_level,
            is_top_of_body: water_level > 0 && self.grid.level_at(x, y - 1) == 0,
        })
    }
}
