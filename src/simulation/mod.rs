//! Level orchestration: state, per-tick tile reactions, and the tick loop

pub mod reactor;
pub mod render;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use reactor::TileReactor;
pub use render::RenderInfo;
pub use snapshot::{GridSnapshot, WaterSnapshot};
pub use state::{CompletionListener, LevelPhase, Simulation};
pub use tick::SimulationEvent;
