//! Water bodies and the per-tick flow solver

pub mod bodies;
pub mod engine;

pub use bodies::{Body, BodyDetector, BodyTable};
pub use engine::{FlowEngine, FlowReport};
