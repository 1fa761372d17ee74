//! In-memory copy of a level's mutable state, for undo

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{GridPos, Tick};
use crate::flow::BodyTable;
use crate::grid::{FlowMomentum, MAX_WATER_LEVEL};
use crate::simulation::state::{LevelPhase, Simulation};
use crate::tiles::Tile;

/// Persistent part of one water cell; per-tick bookkeeping is not kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterSnapshot {
    pub level: u8,
    pub momentum: FlowMomentum,
    pub static_full: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
    pub water: Vec<WaterSnapshot>,
    pub chisels: u32,
    pub phase: LevelPhase,
    pub tick: Tick,
    pub goals: Vec<GridPos>,
}

impl Simulation {
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            tiles: self.grid.tiles().to_vec(),
            water: self
                .grid
                .water_cells()
                .iter()
                .map(|cell| WaterSnapshot {
                    level: cell.level,
                    momentum: cell.momentum,
                    static_full: cell.static_full,
                })
                .collect(),
            chisels: self.chisels,
            phase: self.phase,
            tick: self.tick,
            goals: self.goals.clone(),
        }
    }

    /// Put the level back into a snapshotted state.
    ///
    /// The snapshot must match this grid's size and hold valid water
    /// levels; nothing is changed if it does not. The random stream is not
    /// part of the snapshot and carries on from where it is. A completion
    /// already reported stays reported.
    pub fn restore(&mut self, snapshot: &GridSnapshot) -> Result<()> {
        let (width, height) = (self.grid.width(), self.grid.height());
        if snapshot.width != width || snapshot.height != height {
            return Err(SimError::InvalidLevel(format!(
                "snapshot is {}x{}, grid is {}x{}",
                snapshot.width, snapshot.height, width, height
            )));
        }
        let cells = self.grid.len();
        if snapshot.tiles.len() != cells || snapshot.water.len() != cells {
            return Err(SimError::InvalidLevel(format!(
                "snapshot holds {} tiles and {} water cells, expected {}",
                snapshot.tiles.len(),
                snapshot.water.len(),
                cells
            )));
        }
        if let Some(bad) = snapshot.water.iter().find(|w| w.level > MAX_WATER_LEVEL) {
            return Err(SimError::InvalidWaterLevel(i32::from(bad.level)));
        }

        for (i, (tile, water)) in snapshot.tiles.iter().zip(&snapshot.water).enumerate() {
            let x = i as i32 % width;
            let y = i as i32 / width;
            self.grid.set_tile(x, y, *tile);
            if let Some(cell) = self.grid.water_at_mut(x, y) {
                cell.level = water.level;
                cell.momentum = water.momentum;
                cell.static_full = water.static_full;
                cell.reset_tick_state();
            }
        }

        self.chisels = snapshot.chisels;
        self.phase = snapshot.phase;
        self.tick = snapshot.tick;
        self.goals = snapshot.goals.clone();
        self.bodies = BodyTable::default();

        tracing::debug!(tick = self.tick, "Restored snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::simulation::SimulationEvent;

    fn level() -> Simulation {
        let mut sim = Simulation::new(SimulationConfig::default());
        sim.load_cell(2, 2, -1, 8).unwrap();
        sim.load_cell(2, 3, 1, 0).unwrap();
        sim.load_cell(6, 14, 5, 0).unwrap();
        sim.load_cell(6, 15, 1, 0).unwrap();
        sim.begin().unwrap();
        sim
    }

    #[test]
    fn test_restore_rewinds_ticks_and_chisels() {
        let mut sim = level();
        let saved = sim.snapshot();

        sim.run(4);
        assert!(sim.chisel(2, 3));
        assert_ne!(sim.snapshot(), saved);

        sim.restore(&saved).unwrap();
        assert_eq!(sim.snapshot(), saved);
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.chisels_remaining(), 3);
        assert_eq!(sim.grid().level_at(2, 2), 8);
    }

    #[test]
    fn test_restore_before_win_does_not_report_again() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        let mut sim = Simulation::new(SimulationConfig::default());
        sim.load_cell(5, 14, 5, 0).unwrap();
        sim.load_cell(5, 15, 4, 0).unwrap();
        sim.set_completion_listener(move |_score: u32| counter.set(counter.get() + 1));
        sim.begin().unwrap();
        let saved = sim.snapshot();

        let first = sim.run(3);
        let won = sim.phase();
        sim.restore(&saved).unwrap();
        assert_eq!(sim.phase(), LevelPhase::Active);
        let second = sim.run(3);

        let completions = first
            .iter()
            .chain(&second)
            .filter(|e| matches!(e, SimulationEvent::LevelCompleted { .. }))
            .count();
        assert_eq!(completions, 1);
        assert_eq!(calls.get(), 1);
        assert_eq!(sim.phase(), won);
        assert_eq!(sim.final_score(), Some(3110));
    }

    #[test]
    fn test_restore_rejects_wrong_size() {
        let mut sim = level();
        let mut saved = sim.snapshot();
        saved.width = 8;
        assert!(matches!(sim.restore(&saved), Err(SimError::InvalidLevel(_))));
    }

    #[test]
    fn test_restore_rejects_overfull_water() {
        let mut sim = level();
        let mut saved = sim.snapshot();
        saved.water[0].level = 9;
        assert!(matches!(
            sim.restore(&saved),
            Err(SimError::InvalidWaterLevel(9))
        ));
        assert_eq!(sim.grid().level_at(0, 0), 0);
    }
}
