use thiserror::Error;

use crate::tiles::TileKind;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Coordinate out of bounds: ({x}, {y})")]
    OutOfBounds { x: i32, y: i32 },

    #[error("No chisels left")]
    NoChiselsLeft,

    #[error("Tile is not chiselable: {0:?}")]
    NotChiselable(TileKind),

    #[error("Unknown tile code: {0}")]
    UnknownTileCode(i32),

    #[error("Water level out of range: {0}")]
    InvalidWaterLevel(i32),

    #[error("Level is no longer loading")]
    NotLoading,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
