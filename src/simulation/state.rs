//! Level state: grid, goals, chisel budget and lifecycle

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{GridPos, Tick};
use crate::flow::{BodyDetector, BodyTable, FlowEngine};
use crate::grid::{Grid, MAX_WATER_LEVEL};
use crate::simulation::reactor::TileReactor;
use crate::tiles::{tile_from_code, Tile, TileKind};

/// Level lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Cells are being loaded; the level has not started
    #[default]
    Loading,
    /// Ticking, goals not yet all complete
    Active,
    /// Every goal completed; the score is frozen
    Won { score: u32 },
}

/// Receives the final score once, when a level is won
pub trait CompletionListener {
    fn level_completed(&mut self, score: u32);
}

impl<F: FnMut(u32)> CompletionListener for F {
    fn level_completed(&mut self, score: u32) {
        self(score)
    }
}

/// One running level
pub struct Simulation {
    pub(crate) config: SimulationConfig,
    pub(crate) grid: Grid,
    pub(crate) goals: Vec<GridPos>,
    pub(crate) chisels: u32,
    pub(crate) phase: LevelPhase,
    pub(crate) tick: Tick,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) bodies: BodyTable,
    pub(crate) reactor: TileReactor,
    pub(crate) detector: BodyDetector,
    pub(crate) engine: FlowEngine,
    pub(crate) listener: Option<Box<dyn CompletionListener>>,
    /// Score sent with the completion event; outlives snapshot restores
    pub(crate) reported_score: Option<u32>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("phase", &self.phase)
            .field("tick", &self.tick)
            .field("chisels", &self.chisels)
            .field("goals", &self.goals)
            .field("water", &self.grid.total_water())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Empty 16x16 level waiting for cells
    pub fn new(config: SimulationConfig) -> Self {
        Self::from_grid(config, Grid::new())
    }

    /// Level over a prepared grid, still in `Loading`
    pub fn from_grid(config: SimulationConfig, grid: Grid) -> Self {
        Self {
            chisels: config.chisels,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            reactor: TileReactor::new(config.perlite_drip_cooldown),
            config,
            grid,
            goals: Vec::new(),
            phase: LevelPhase::Loading,
            tick: 0,
            bodies: BodyTable::default(),
            detector: BodyDetector::new(),
            engine: FlowEngine::new(),
            listener: None,
            reported_score: None,
        }
    }

    /// Ingest one cell from level data
    pub fn load_cell(&mut self, x: i32, y: i32, tile_code: i32, water_level: i32) -> Result<()> {
        if self.phase != LevelPhase::Loading {
            return Err(SimError::NotLoading);
        }
        if !self.grid.in_bounds(x, y) {
            return Err(SimError::OutOfBounds { x, y });
        }
        if !(0..=i32::from(MAX_WATER_LEVEL)).contains(&water_level) {
            return Err(SimError::InvalidWaterLevel(water_level));
        }
        let tile = tile_from_code(tile_code)?;

        self.grid.set_tile(x, y, tile);
        if let Some(cell) = self.grid.water_at_mut(x, y) {
            cell.level = water_level as u8;
        }
        Ok(())
    }

    /// Override the chisel budget before the level starts
    pub fn set_chisels(&mut self, chisels: u32) -> Result<()> {
        if self.phase != LevelPhase::Loading {
            return Err(SimError::NotLoading);
        }
        self.chisels = chisels;
        Ok(())
    }

    /// Finish loading: register every sapling as a goal and start ticking
    pub fn begin(&mut self) -> Result<()> {
        if self.phase != LevelPhase::Loading {
            return Err(SimError::NotLoading);
        }

        self.goals.clear();
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                if self.grid.tile_at(x, y).is_some_and(Tile::is_goal) {
                    self.goals.push(GridPos::new(x, y));
                }
            }
        }

        self.phase = LevelPhase::Active;
        tracing::info!(
            goals = self.goals.len(),
            chisels = self.chisels,
            water = self.grid.total_water(),
            "Level started"
        );
        Ok(())
    }

    /// Register the listener told about the final score
    pub fn set_completion_listener<L: CompletionListener + 'static>(&mut self, listener: L) {
        self.listener = Some(Box::new(listener));
    }

    /// Chisel a tile away; false when nothing happened
    pub fn chisel(&mut self, x: i32, y: i32) -> bool {
        match self.try_chisel(x, y) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(x, y, %err, "Chisel rejected");
                false
            }
        }
    }

    /// Chisel a tile away, returning the kind of tile removed
    pub fn try_chisel(&mut self, x: i32, y: i32) -> Result<TileKind> {
        if self.chisels == 0 {
            return Err(SimError::NoChiselsLeft);
        }
        let tile = self
            .grid
            .tile_at(x, y)
            .copied()
            .ok_or(SimError::OutOfBounds { x, y })?;
        if !tile.is_chiselable() {
            return Err(SimError::NotChiselable(tile.kind()));
        }

        self.grid.set_tile(x, y, Tile::Air);
        self.chisels -= 1;
        tracing::debug!(x, y, removed = ?tile.kind(), left = self.chisels, "Chiselled tile");
        Ok(tile.kind())
    }

    /// Pour water into a cell; returns the units accepted
    pub fn add_water(&mut self, x: i32, y: i32, qty: u8) -> u8 {
        self.grid.add_water(x, y, qty)
    }

    /// Remove water from a cell; returns the units removed
    pub fn absorb_water(&mut self, x: i32, y: i32, qty: u8) -> u8 {
        self.grid.absorb_water(x, y, qty)
    }

    /// Goals whose sapling is fully grown
    pub fn goals_complete(&self) -> usize {
        self.goals
            .iter()
            .filter(|pos| {
                self.grid
                    .tile_at(pos.x, pos.y)
                    .is_some_and(Tile::goal_complete)
            })
            .count()
    }

    /// True once at least one goal exists and all of them are complete
    pub fn all_goals_complete(&self) -> bool {
        !self.goals.is_empty() && self.goals_complete() == self.goals.len()
    }

    /// Score the level would earn if it ended now
    pub fn score(&self) -> u32 {
        let weights = self.config.score;
        let grass = self.grid.tiles().iter().filter(|t| t.has_grass()).count() as u32;
        weights
            .chisel
            .saturating_mul(self.chisels)
            .saturating_add(weights.goal.saturating_mul(self.goals_complete() as u32))
            .saturating_add(weights.grass.saturating_mul(grass))
    }

    /// Frozen score once the level is won
    pub fn final_score(&self) -> Option<u32> {
        match self.phase {
            LevelPhase::Won { score } => Some(score),
            _ => None,
        }
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn is_won(&self) -> bool {
        matches!(self.phase, LevelPhase::Won { .. })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn goals(&self) -> &[GridPos] {
        &self.goals
    }

    /// Bodies found on the most recent tick
    pub fn bodies(&self) -> &BodyTable {
        &self.bodies
    }

    pub fn chisels_remaining(&self) -> u32 {
        self.chisels
    }

    pub fn tick_count(&self) -> Tick {
        self.tick
    }

    pub fn water_total(&self) -> u32 {
        self.grid.total_water()
    }
}
