//! Load level layouts from TOML files
//!
//! A level file holds a 16x16 table of tile codes, an optional table of
//! starting water levels of the same shape, and an optional chisel budget
//! that overrides the configured default.
//!
//! ```toml
//! name = "First Sprout"
//! tip = "Chisel the plug."
//! chisels = 1
//! tiles = [
//!     [0, 0, 0, ...],
//!     ...
//! ]
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{GRID_HEIGHT, GRID_WIDTH};
use crate::simulation::Simulation;

/// A level as authored on disk
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LevelDefinition {
    pub name: String,
    /// Hint shown to the player when the level opens
    #[serde(default)]
    pub tip: String,
    /// Chisel budget for this level; the config default when absent
    #[serde(default)]
    pub chisels: Option<u32>,
    /// Tile codes, one row per grid row, top row first
    pub tiles: Vec<Vec<i32>>,
    /// Starting water levels; an empty table means a dry level
    #[serde(default)]
    pub water: Vec<Vec<i32>>,
}

impl LevelDefinition {
    /// Parse a level from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let level: LevelDefinition = toml::from_str(content)?;
        level.validate()?;
        Ok(level)
    }

    /// Load a level from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content).inspect_err(|err| {
            tracing::warn!(path = %path.display(), %err, "Failed to load level");
        })
    }

    /// Check table shapes; cell values are checked when the level is built
    pub fn validate(&self) -> Result<()> {
        check_table("tiles", &self.tiles)?;
        if !self.water.is_empty() {
            check_table("water", &self.water)?;
        }
        Ok(())
    }

    /// Create a running level from this definition
    pub fn build(&self, config: &SimulationConfig) -> Result<Simulation> {
        self.validate()?;

        let mut sim = Simulation::new(config.clone());
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, &code) in row.iter().enumerate() {
                let water = self
                    .water
                    .get(y)
                    .and_then(|r| r.get(x))
                    .copied()
                    .unwrap_or(0);
                sim.load_cell(x as i32, y as i32, code, water)?;
            }
        }

        if let Some(chisels) = self.chisels {
            sim.set_chisels(chisels)?;
        }
        sim.begin()?;

        tracing::info!(level = %self.name, "Loaded level");
        Ok(sim)
    }
}

fn check_table(label: &str, rows: &[Vec<i32>]) -> Result<()> {
    if rows.len() != GRID_HEIGHT as usize {
        return Err(SimError::InvalidLevel(format!(
            "{} has {} rows, expected {}",
            label,
            rows.len(),
            GRID_HEIGHT
        )));
    }
    if let Some((y, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != GRID_WIDTH as usize)
    {
        return Err(SimError::InvalidLevel(format!(
            "{} row {} has {} cells, expected {}",
            label,
            y,
            row.len(),
            GRID_WIDTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::LevelPhase;
    use crate::tiles::Tile;

    /// Air everywhere except a stone floor and one sapling on grass
    fn level_toml(extra: &str) -> String {
        let mut tiles = vec![vec![-1; 16]; 16];
        tiles[15] = vec![0; 16];
        tiles[14][8] = 4;
        tiles[13][8] = 5;
        let rows: Vec<String> = tiles.iter().map(|r| format!("{:?}", r)).collect();
        format!(
            "name = \"Test\"\n{}\ntiles = [\n{}\n]\n",
            extra,
            rows.join(",\n")
        )
    }

    #[test]
    fn test_parse_minimal_level() {
        let level = LevelDefinition::from_toml_str(&level_toml("")).unwrap();
        assert_eq!(level.name, "Test");
        assert_eq!(level.tip, "");
        assert_eq!(level.chisels, None);
        assert!(level.water.is_empty());
    }

    #[test]
    fn test_build_places_tiles_and_goals() {
        let level = LevelDefinition::from_toml_str(&level_toml("chisels = 2")).unwrap();
        let sim = level.build(&SimulationConfig::default()).unwrap();

        assert_eq!(sim.phase(), LevelPhase::Active);
        assert_eq!(sim.chisels_remaining(), 2);
        assert_eq!(sim.goals().len(), 1);
        assert_eq!(sim.grid().tile_at(8, 14), Some(&Tile::dirt(3)));
        assert_eq!(sim.grid().tile_at(3, 15), Some(&Tile::Stone));
    }

    #[test]
    fn test_build_uses_config_chisels_by_default() {
        let level = LevelDefinition::from_toml_str(&level_toml("")).unwrap();
        let config = SimulationConfig {
            chisels: 7,
            ..SimulationConfig::default()
        };
        assert_eq!(level.build(&config).unwrap().chisels_remaining(), 7);
    }

    #[test]
    fn test_huge_chisel_budget_wins_without_overflow() {
        let level = LevelDefinition::from_toml_str(&level_toml("chisels = 5000000")).unwrap();
        let mut sim = level.build(&SimulationConfig::default()).unwrap();

        sim.tick();
        assert_eq!(sim.final_score(), Some(u32::MAX));
    }

    #[test]
    fn test_short_table_rejected() {
        let content = "name = \"Bad\"\ntiles = [[0, 0], [0, 0]]\n";
        assert!(matches!(
            LevelDefinition::from_toml_str(content),
            Err(SimError::InvalidLevel(_))
        ));
    }

    #[test]
    fn test_unknown_code_fails_build() {
        let mut level = LevelDefinition::from_toml_str(&level_toml("")).unwrap();
        level.tiles[0][0] = 99;
        assert!(matches!(
            level.build(&SimulationConfig::default()),
            Err(SimError::UnknownTileCode(99))
        ));
    }

    #[test]
    fn test_water_table_applied() {
        let mut level = LevelDefinition::from_toml_str(&level_toml("")).unwrap();
        level.water = vec![vec![0; 16]; 16];
        level.water[2][3] = 6;
        let sim = level.build(&SimulationConfig::default()).unwrap();
        assert_eq!(sim.grid().level_at(3, 2), 6);
        assert_eq!(sim.water_total(), 6);
    }

    #[test]
    fn test_malformed_toml_is_toml_error() {
        assert!(matches!(
            LevelDefinition::from_toml_str("name = "),
            Err(SimError::TomlError(_))
        ));
    }
}
