//! Tick system - advances a level by one step
//!
//! Order per tick: tile reactions, body detection, pressure, flow, then the
//! goal check. Each step sees the grid exactly as the previous one left it.

use serde::Serialize;

use crate::core::types::{GridPos, Tick};
use crate::simulation::state::{LevelPhase, Simulation};
use crate::tiles::TileKind;

/// Events generated during a simulation tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SimulationEvent {
    /// A tile turned into another kind (cracked stone crumbling, a sapling dying)
    TileReplaced {
        pos: GridPos,
        from: TileKind,
        to: TileKind,
    },
    /// A perlite block released its unit of water into the cell below
    PerliteDripped { pos: GridPos },
    /// Every goal completed on this tick
    LevelCompleted { tick: Tick, score: u32 },
}

impl Simulation {
    /// Run one simulation tick and return what happened.
    ///
    /// A level still in `Loading` is started first. Ticking continues after
    /// the level is won; the final score stays as recorded. Completion is
    /// reported at most once per level, even across snapshot restores.
    pub fn tick(&mut self) -> Vec<SimulationEvent> {
        let mut events = Vec::new();

        if self.phase == LevelPhase::Loading {
            if let Err(err) = self.begin() {
                tracing::warn!(%err, "Could not start level");
            }
        }

        self.tick += 1;

        self.reactor.run(&mut self.grid, &mut events);
        self.bodies = self.detector.detect(&mut self.grid);
        let report = self
            .engine
            .step(&mut self.grid, &self.bodies, &mut self.rng);

        tracing::debug!(
            tick = self.tick,
            bodies = self.bodies.len(),
            lifted = report.lifted,
            transfers = report.transfers,
            water = self.grid.total_water(),
            "Tick complete"
        );

        if self.phase == LevelPhase::Active && self.all_goals_complete() {
            match self.reported_score {
                // Won again after a restore: keep the first score, stay quiet
                Some(score) => self.phase = LevelPhase::Won { score },
                None => self.complete(&mut events),
            }
        }

        events
    }

    /// Run `n` ticks, collecting every event
    pub fn run(&mut self, n: u32) -> Vec<SimulationEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(self.tick());
        }
        events
    }

    fn complete(&mut self, events: &mut Vec<SimulationEvent>) {
        let score = self.score();
        self.phase = LevelPhase::Won { score };
        self.reported_score = Some(score);
        events.push(SimulationEvent::LevelCompleted {
            tick: self.tick,
            score,
        });

        tracing::info!(tick = self.tick, score, "Level complete");

        if let Some(listener) = self.listener.as_mut() {
            listener.level_completed(score);
        }
    }
}
