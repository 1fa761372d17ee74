//! Tile reactor: per-tick tile behavior and hydration exchange
//!
//! Runs before body detection. Tiles are visited in row-major order; each
//! gets its own update, then the water sitting in its cell offers one unit
//! to each hydratable neighbour (below, right, left, and above only when
//! the cell is full). Finally the cell's per-tick flow bookkeeping is reset.

use crate::core::types::{GridPos, Side};
use crate::grid::{Grid, MAX_WATER_LEVEL};
use crate::simulation::tick::SimulationEvent;
use crate::tiles::{Tile, SAPLING_MAX_HYDRATION};

/// Applies tile state machines and water absorption for one tick
#[derive(Debug, Clone)]
pub struct TileReactor {
    drip_cooldown: u8,
}

impl TileReactor {
    pub fn new(drip_cooldown: u8) -> Self {
        Self { drip_cooldown }
    }

    /// Run one reaction pass over the whole grid
    pub fn run(&self, grid: &mut Grid, events: &mut Vec<SimulationEvent>) {
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let pos = GridPos::new(x, y);
                self.update_tile(grid, pos, events);
                hydrate_neighbors(grid, pos);
                if let Some(cell) = grid.water_at_mut(x, y) {
                    cell.reset_tick_state();
                }
            }
        }
    }

    fn update_tile(&self, grid: &mut Grid, pos: GridPos, events: &mut Vec<SimulationEvent>) {
        let Some(tile) = grid.tile_at(pos.x, pos.y).copied() else {
            return;
        };

        match tile {
            Tile::Air | Tile::Stone => {}
            Tile::Dirt { hydration } => update_dirt(grid, pos, hydration),
            Tile::CrackedStone { cracked } => {
                if cracked {
                    replace_tile(grid, pos, Tile::Air, events);
                }
            }
            Tile::Perlite {
                has_water,
                drip_timer,
            } => self.update_perlite(grid, pos, has_water, drip_timer, events),
            Tile::Sapling { hydration } => update_sapling(grid, pos, hydration, events),
        }
    }

    fn update_perlite(
        &self,
        grid: &mut Grid,
        pos: GridPos,
        mut has_water: bool,
        mut drip_timer: u8,
        events: &mut Vec<SimulationEvent>,
    ) {
        if has_water && drip_timer == 0 {
            let below = pos.below();
            if grid.add_water(below.x, below.y, 1) > 0 {
                drip_timer = self.drip_cooldown;
                has_water = false;
                events.push(SimulationEvent::PerliteDripped { pos });
            }
        }

        drip_timer = drip_timer.saturating_sub(1);

        grid.set_tile(
            pos.x,
            pos.y,
            Tile::Perlite {
                has_water,
                drip_timer,
            },
        );
    }
}

/// Damp dirt passes water on to drier hydratable neighbours.
///
/// A neighbour receives a unit only while it is at least two steps drier
/// than this dirt, so moisture spreads without the two tiles swapping it
/// back and forth.
fn update_dirt(grid: &mut Grid, pos: GridPos, mut hydration: u8) {
    for side in Side::HYDRATION_ORDER {
        let target = pos.step(side);
        let Some(neighbor) = grid.tile_at_mut(target.x, target.y) else {
            continue;
        };
        let Some(theirs) = neighbor.hydration() else {
            continue;
        };
        if theirs + 1 < hydration {
            hydration -= neighbor.hydrate(1);
        }
    }

    grid.set_tile(pos.x, pos.y, Tile::Dirt { hydration });
}

/// Saplings grow with the tile they stand on and wither without one
fn update_sapling(
    grid: &mut Grid,
    pos: GridPos,
    hydration: u8,
    events: &mut Vec<SimulationEvent>,
) {
    let below = pos.below();
    let support = grid.tile_at(below.x, below.y).and_then(Tile::hydration);

    match support {
        Some(wetness) if wetness > hydration => {
            grid.set_tile(
                pos.x,
                pos.y,
                Tile::Sapling {
                    hydration: wetness.min(SAPLING_MAX_HYDRATION),
                },
            );
        }
        Some(_) => {}
        None => replace_tile(grid, pos, Tile::Air, events),
    }
}

/// Offer the water in this cell to hydratable neighbours, one unit each
fn hydrate_neighbors(grid: &mut Grid, pos: GridPos) {
    let level = grid.level_at(pos.x, pos.y);
    if level == 0 {
        return;
    }
    let saturated = level >= MAX_WATER_LEVEL;

    for side in Side::HYDRATION_ORDER {
        if side == Side::Above && !saturated {
            continue;
        }
        if grid.level_at(pos.x, pos.y) == 0 {
            break;
        }

        let target = pos.step(side);
        let absorbed = match grid.tile_at_mut(target.x, target.y) {
            Some(tile) => tile.hydrate(1),
            None => 0,
        };
        if absorbed > 0 {
            grid.absorb_water(pos.x, pos.y, absorbed);
        }
    }
}

fn replace_tile(grid: &mut Grid, pos: GridPos, tile: Tile, events: &mut Vec<SimulationEvent>) {
    let Some(from) = grid.tile_at(pos.x, pos.y).map(Tile::kind) else {
        return;
    };
    if grid.set_tile(pos.x, pos.y, tile) {
        tracing::debug!(x = pos.x, y = pos.y, ?from, to = ?tile.kind(), "Tile replaced");
        events.push(SimulationEvent::TileReplaced {
            pos,
            from,
            to: tile.kind(),
        });
    }
}
