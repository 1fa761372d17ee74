//! Trickle - grid water-flow puzzle simulation
//!
//! A 16x16 level of tiles and water cells. Each tick, tiles react to the
//! water around them, connected water is grouped into bodies, pressure
//! pushes water up out of saturated pockets, and gravity plus sideways
//! equalization move it around. A level is won once every sapling is
//! fully grown.

pub mod core;
pub mod flow;
pub mod grid;
pub mod level;
pub mod simulation;
pub mod tiles;
