//! Per-cell fluid state

use serde::{Deserialize, Serialize};

/// Units of water a single cell can hold
pub const MAX_WATER_LEVEL: u8 = 8;

/// Lateral bias remembered from the last sideways flow into a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlowMomentum {
    #[default]
    None,
    Left,
    Right,
}

/// Water held by one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterCell {
    pub x: i32,
    pub y: i32,
    /// Volume, 0..=MAX_WATER_LEVEL
    pub level: u8,
    /// Already moved this tick
    pub no_calc: bool,
    pub momentum: FlowMomentum,
    /// Body this cell belongs to for the current tick
    pub body: Option<usize>,
    /// Full and without outflow on the last flow pass
    pub static_full: bool,
}

impl WaterCell {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            level: 0,
            no_calc: false,
            momentum: FlowMomentum::None,
            body: None,
            static_full: false,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.level == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.level >= MAX_WATER_LEVEL
    }

    /// Room left before the cell is full
    #[inline]
    pub fn headroom(&self) -> u8 {
        MAX_WATER_LEVEL.saturating_sub(self.level)
    }

    /// Hydrostatic height: higher rows and fuller cells score higher
    #[inline]
    pub fn height_metric(&self, grid_height: i32) -> i32 {
        (grid_height - self.y) * i32::from(MAX_WATER_LEVEL) + i32::from(self.level)
    }

    /// Clear the per-tick bookkeeping ahead of body detection
    pub fn reset_tick_state(&mut self) {
        self.no_calc = false;
        self.body = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_is_dry() {
        let cell = WaterCell::new(2, 3);
        assert!(cell.is_empty());
        assert_eq!(cell.headroom(), MAX_WATER_LEVEL);
        assert_eq!(cell.body, None);
        assert_eq!(cell.momentum, FlowMomentum::None);
    }

    #[test]
    fn test_height_metric_prefers_higher_rows() {
        let mut high = WaterCell::new(0, 2);
        high.level = 1;
        let mut low = WaterCell::new(0, 3);
        low.level = 8;
        assert!(high.height_metric(16) > low.height_metric(16));
        assert_eq!(high.height_metric(16), 14 * 8 + 1);
    }

    #[test]
    fn test_reset_tick_state() {
        let mut cell = WaterCell::new(0, 0);
        cell.no_calc = true;
        cell.body = Some(4);
        cell.static_full = true;
        cell.reset_tick_state();
        assert!(!cell.no_calc);
        assert_eq!(cell.body, None);
        assert!(cell.static_full);
    }
}
