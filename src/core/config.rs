//! Simulation configuration with documented constants
//!
//! Values that tune a level's pacing and scoring live here. Grid size and
//! water capacity are fixed by the game rules and are not configurable.

use serde::Deserialize;
use std::path::Path;

use crate::core::error::{Result, SimError};

/// Configuration for a single level run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Chisels the player starts with
    ///
    /// Level files may override this per level.
    pub chisels: u32,

    /// Seed for the left/right tie-break in three-way equalization
    ///
    /// Only consulted when a cell has no momentum yet. Same seed and same
    /// inputs give the same run.
    pub seed: u64,

    /// Ticks a perlite tile waits after dripping before it can drip again
    pub perlite_drip_cooldown: u8,

    /// Weights used to compute the final score
    pub score: ScoreWeights,
}

/// Points awarded per scoring item when a level is won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Points per unused chisel
    pub chisel: u32,
    /// Points per completed goal
    pub goal: u32,
    /// Points per dirt tile that has grown grass
    pub grass: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            chisel: 1000,
            goal: 100,
            grass: 10,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            chisels: 3,
            seed: 12345,
            perlite_drip_cooldown: 5,
            score: ScoreWeights::default(),
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.perlite_drip_cooldown == 0 {
            return Err(SimError::InvalidConfig(
                "perlite_drip_cooldown must be at least 1".into(),
            ));
        }

        // An unused chisel is worth at least one goal
        if self.score.chisel < self.score.goal {
            return Err(SimError::InvalidConfig(format!(
                "score.chisel ({}) should be >= score.goal ({})",
                self.score.chisel, self.score.goal
            )));
        }

        Ok(())
    }
}
