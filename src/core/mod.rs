pub mod config;
pub mod error;
pub mod types;

pub use config::{ScoreWeights, SimulationConfig};
pub use error::{Result, SimError};
pub use types::{GridPos, Tick};
