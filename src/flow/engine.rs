//! Per-tick water solver
//!
//! Two passes, both scanning rows bottom to top and columns left to right:
//!
//! 1. Pressure: a full cell that had no outflow last tick pushes one unit
//!    into the cell above when its body reaches higher than that cell.
//! 2. Flow: each wet cell falls as far as the cell below allows, then
//!    equalizes sideways with strictly lower neighbours.
//!
//! Scan order matters: lower rows settle before the rows above them spill
//! into them. All access goes through indices into the grid's water slice;
//! availability for a cell is decided before any of its transfers run.

use rand::Rng;

use crate::flow::bodies::BodyTable;
use crate::grid::{FlowMomentum, Grid, WaterCell};

const FLOW_LEFT: u8 = 1 << 0;
const FLOW_RIGHT: u8 = 1 << 1;
const FLOW_BOTTOM: u8 = 1 << 2;
const FLOW_BOTH: u8 = FLOW_LEFT | FLOW_RIGHT;

/// What one tick of the solver did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowReport {
    /// Units lifted by the pressure pass
    pub lifted: u32,
    /// Transfers performed by the flow pass
    pub transfers: u32,
    /// Per cell: flow-pass transfers taken part in, either as the cell being
    /// processed or as a sideways receiver. Receiving from directly above is
    /// not counted; a source's fall-then-spread counts once.
    pub touches: Vec<u8>,
}

impl FlowReport {
    fn new(cells: usize) -> Self {
        Self {
            lifted: 0,
            transfers: 0,
            touches: vec![0; cells],
        }
    }
}

/// Pressure + flow solver with reusable scratch space
#[derive(Debug, Default)]
pub struct FlowEngine {
    open: Vec<bool>,
}

impl FlowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the pressure pass, then the flow pass, then clear `no_calc`
    pub fn step<R: Rng>(
        &mut self,
        grid: &mut Grid,
        bodies: &BodyTable,
        rng: &mut R,
    ) -> FlowReport {
        let mut report = FlowReport::new(grid.len());
        report.lifted = self.pressure_pass(grid, bodies);
        self.flow_pass(grid, rng, &mut report);
        grid.clear_no_calc();

        tracing::trace!(
            lifted = report.lifted,
            transfers = report.transfers,
            "Flow step complete"
        );

        report
    }

    fn refresh_open(&mut self, grid: &Grid) {
        self.open.clear();
        self.open
            .extend(grid.tiles().iter().map(|tile| tile.is_transparent()));
    }

    /// Push water up out of saturated pockets; returns units lifted
    pub fn pressure_pass(&mut self, grid: &mut Grid, bodies: &BodyTable) -> u32 {
        self.refresh_open(grid);
        let width = grid.width();
        let height = grid.height();
        let cells = grid.water_cells_mut();
        let mut lifted = 0;

        for y in (1..height).rev() {
            for x in 0..width {
                let i = (y * width + x) as usize;
                let cell = cells[i];
                if !cell.static_full || !cell.is_full() {
                    continue;
                }

                let up = i - width as usize;
                if !self.open[up] || cells[up].is_full() {
                    continue;
                }

                let Some(max_height) = cell.body.and_then(|id| bodies.max_height(id)) else {
                    continue;
                };
                if max_height <= cells[up].height_metric(height) {
                    continue;
                }

                cells[i].level -= 1;
                cells[i].static_full = false;
                cells[up].level += 1;
                cells[up].no_calc = true;
                lifted += 1;
            }
        }

        lifted
    }

    /// Gravity and sideways equalization
    pub fn flow_pass<R: Rng>(
        &mut self,
        grid: &mut Grid,
        rng: &mut R,
        report: &mut FlowReport,
    ) {
        self.refresh_open(grid);
        let width = grid.width();
        let height = grid.height();
        let stride = width as usize;
        let cells = grid.water_cells_mut();

        for y in (0..height).rev() {
            for x in 0..width {
                let i = (y * width + x) as usize;
                let level = cells[i].level;
                if level == 0 || cells[i].no_calc {
                    continue;
                }

                let below = i + stride;
                let right = i + 1;
                let left = i.wrapping_sub(1);

                let mut flow = 0;
                if y + 1 < height && self.open[below] && !cells[below].is_full() {
                    flow |= FLOW_BOTTOM;
                }
                if x + 1 < width && lateral_open(&self.open, cells, right, level) {
                    flow |= FLOW_RIGHT;
                }
                if x > 0 && lateral_open(&self.open, cells, left, level) {
                    flow |= FLOW_LEFT;
                }

                if flow == 0 {
                    cells[i].static_full = cells[i].is_full();
                    continue;
                }
                cells[i].static_full = false;
                report.touches[i] += 1;

                match flow {
                    FLOW_BOTTOM => {
                        flow_bottom(cells, i, below);
                        report.transfers += 1;
                    }
                    FLOW_RIGHT => {
                        flow_side(cells, i, right, FlowMomentum::Right);
                        report.touches[right] += 1;
                        report.transfers += 1;
                    }
                    FLOW_LEFT => {
                        flow_side(cells, i, left, FlowMomentum::Left);
                        report.touches[left] += 1;
                        report.transfers += 1;
                    }
                    FLOW_BOTH => {
                        flow_both(cells, i, left, right, rng);
                        report.touches[left] += 1;
                        report.touches[right] += 1;
                        report.transfers += 1;
                    }
                    _ => {
                        // Gravity first; spread whatever the cell below could not take
                        report.transfers += 1;
                        if flow_bottom(cells, i, below) == 0 {
                            continue;
                        }
                        report.transfers += 1;
                        match flow & FLOW_BOTH {
                            FLOW_RIGHT => {
                                flow_side(cells, i, right, FlowMomentum::Right);
                                report.touches[right] += 1;
                            }
                            FLOW_LEFT => {
                                flow_side(cells, i, left, FlowMomentum::Left);
                                report.touches[left] += 1;
                            }
                            _ => {
                                flow_both(cells, i, left, right, rng);
                                report.touches[left] += 1;
                                report.touches[right] += 1;
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A sideways neighbour accepts water if it is open, has not moved yet this
/// tick, and holds strictly less than the source.
#[inline]
fn lateral_open(open: &[bool], cells: &[WaterCell], target: usize, level: u8) -> bool {
    open[target] && !cells[target].no_calc && cells[target].level < level
}

/// Move as much as fits into the cell below; returns what is left in the source
fn flow_bottom(cells: &mut [WaterCell], src: usize, dst: usize) -> u8 {
    let spread = cells[src].level.min(cells[dst].headroom());
    cells[dst].level += spread;
    cells[src].level -= spread;

    cells[src].no_calc = true;
    cells[dst].no_calc = true;

    cells[src].level
}

/// Split evenly with one neighbour; the odd unit goes to the neighbour
fn flow_side(cells: &mut [WaterCell], src: usize, dst: usize, momentum: FlowMomentum) {
    let total = cells[src].level + cells[dst].level;
    let spread = total / 2;
    let remainder = total % 2;

    cells[src].level = spread;
    cells[dst].level = spread + remainder;
    cells[dst].momentum = momentum;

    cells[src].no_calc = true;
    cells[dst].no_calc = true;
}

/// Split three ways; the remainder goes to the side the source leans toward
fn flow_both<R: Rng>(
    cells: &mut [WaterCell],
    src: usize,
    left: usize,
    right: usize,
    rng: &mut R,
) {
    let total = cells[src].level + cells[left].level + cells[right].level;
    let spread = total / 3;
    let remainder = total % 3;

    cells[src].level = spread;
    cells[left].level = spread;
    cells[right].level = spread;

    if remainder > 0 {
        let to_left = match cells[src].momentum {
            FlowMomentum::Left => true,
            FlowMomentum::Right => false,
            FlowMomentum::None => {
                let pick_left = rng.gen_bool(0.5);
                cells[src].momentum = if pick_left {
                    FlowMomentum::Left
                } else {
                    FlowMomentum::Right
                };
                pick_left
            }
        };

        if to_left {
            cells[left].level += remainder;
            cells[left].momentum = FlowMomentum::Left;
        } else {
            cells[right].level += remainder;
            cells[right].momentum = FlowMomentum::Right;
        }
    }

    cells[src].no_calc = true;
    cells[left].no_calc = true;
    cells[right].no_calc = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::bodies::BodyDetector;
    use crate::tiles::Tile;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn pour(grid: &mut Grid, x: i32, y: i32, level: u8) {
        grid.water_at_mut(x, y).unwrap().level = level;
    }

    fn step(grid: &mut Grid) -> FlowReport {
        let bodies = BodyDetector::new().detect(grid);
        FlowEngine::new().step(grid, &bodies, &mut rng())
    }

    /// 5x3 grid: stone floor on the bottom row
    fn floored_grid() -> Grid {
        let mut grid = Grid::with_size(5, 3);
        for x in 0..5 {
            grid.set_tile(x, 2, Tile::Stone);
        }
        grid
    }

    #[test]
    fn test_falls_into_empty_cell_below() {
        let mut grid = floored_grid();
        pour(&mut grid, 2, 0, 6);
        step(&mut grid);
        assert_eq!(grid.level_at(2, 0), 0);
        assert_eq!(grid.level_at(2, 1), 6);
    }

    #[test]
    fn test_fall_bounded_by_capacity() {
        let mut grid = floored_grid();
        // Walls either side keep the test to the vertical transfer
        grid.set_tile(1, 0, Tile::Stone);
        grid.set_tile(3, 0, Tile::Stone);
        pour(&mut grid, 2, 0, 5);
        pour(&mut grid, 2, 1, 6);
        grid.set_tile(1, 1, Tile::Stone);
        grid.set_tile(3, 1, Tile::Stone);
        step(&mut grid);
        assert_eq!(grid.level_at(2, 1), 8);
        assert_eq!(grid.level_at(2, 0), 3);
    }

    #[test]
    fn test_right_only_equalizes() {
        let mut grid = floored_grid();
        grid.set_tile(0, 1, Tile::Stone);
        pour(&mut grid, 1, 1, 5);
        pour(&mut grid, 2, 1, 1);
        grid.set_tile(3, 1, Tile::Stone);

        step(&mut grid);

        assert_eq!(grid.level_at(1, 1), 3);
        assert_eq!(grid.level_at(2, 1), 3);
        assert_eq!(grid.water_at(2, 1).unwrap().momentum, FlowMomentum::Right);
    }

    #[test]
    fn test_odd_remainder_goes_to_destination() {
        let mut grid = floored_grid();
        grid.set_tile(2, 1, Tile::Stone);
        pour(&mut grid, 4, 1, 4);
        pour(&mut grid, 3, 1, 1);

        step(&mut grid);

        assert_eq!(grid.level_at(4, 1), 2);
        assert_eq!(grid.level_at(3, 1), 3);
        assert_eq!(grid.water_at(3, 1).unwrap().momentum, FlowMomentum::Left);
    }

    #[test]
    fn test_equal_levels_do_not_move() {
        let mut grid = floored_grid();
        for x in 0..5 {
            pour(&mut grid, x, 1, 4);
        }
        let report = step(&mut grid);
        assert_eq!(report.transfers, 0);
        for x in 0..5 {
            assert_eq!(grid.level_at(x, 1), 4);
        }
    }

    #[test]
    fn test_three_way_with_momentum_is_deterministic() {
        for momentum in [FlowMomentum::Left, FlowMomentum::Right] {
            let mut grid = floored_grid();
            pour(&mut grid, 2, 1, 5);
            grid.water_at_mut(2, 1).unwrap().momentum = momentum;
            grid.set_tile(0, 1, Tile::Stone);
            grid.set_tile(4, 1, Tile::Stone);

            step(&mut grid);

            let (favoured, other) = match momentum {
                FlowMomentum::Left => ((1, 1), (3, 1)),
                _ => ((3, 1), (1, 1)),
            };
            assert_eq!(grid.level_at(2, 1), 1);
            assert_eq!(grid.level_at(favoured.0, favoured.1), 3);
            assert_eq!(grid.level_at(other.0, other.1), 1);
            assert_eq!(
                grid.water_at(favoured.0, favoured.1).unwrap().momentum,
                momentum
            );
        }
    }

    #[test]
    fn test_three_way_without_momentum_picks_a_side() {
        let mut grid = floored_grid();
        grid.set_tile(0, 1, Tile::Stone);
        grid.set_tile(4, 1, Tile::Stone);
        pour(&mut grid, 2, 1, 5);

        step(&mut grid);

        let left = grid.level_at(1, 1);
        let right = grid.level_at(3, 1);
        assert_eq!(grid.level_at(2, 1), 1);
        assert_eq!(left + right, 4);
        assert!((left, right) == (3, 1) || (left, right) == (1, 3));

        let chosen = grid.water_at(2, 1).unwrap().momentum;
        assert_ne!(chosen, FlowMomentum::None);
        let winner = if left == 3 { (1, 1) } else { (3, 1) };
        assert_eq!(grid.water_at(winner.0, winner.1).unwrap().momentum, chosen);
    }

    #[test]
    fn test_same_seed_same_tie_break() {
        let run = || {
            let mut grid = floored_grid();
            grid.set_tile(0, 1, Tile::Stone);
            grid.set_tile(4, 1, Tile::Stone);
            pour(&mut grid, 2, 1, 5);
            step(&mut grid);
            (grid.level_at(1, 1), grid.level_at(3, 1))
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_bottom_first_precedence() {
        let mut grid = Grid::with_size(4, 3);
        for x in 0..4 {
            grid.set_tile(x, 2, Tile::Stone);
        }
        grid.set_tile(0, 0, Tile::Stone);
        pour(&mut grid, 1, 0, 8);

        step(&mut grid);

        assert_eq!(grid.level_at(1, 1), 8);
        assert_eq!(grid.level_at(1, 0), 0);
        assert_eq!(grid.level_at(2, 0), 0);
    }

    #[test]
    fn test_residual_spreads_after_fall() {
        let mut grid = Grid::with_size(4, 3);
        for x in 0..4 {
            grid.set_tile(x, 2, Tile::Stone);
        }
        grid.set_tile(0, 0, Tile::Stone);
        grid.set_tile(3, 0, Tile::Stone);
        grid.set_tile(0, 1, Tile::Stone);
        grid.set_tile(2, 1, Tile::Stone);
        pour(&mut grid, 1, 1, 6);
        pour(&mut grid, 1, 0, 8);

        step(&mut grid);

        // Two units fit below, the remaining six split with the right cell
        assert_eq!(grid.level_at(1, 1), 8);
        assert_eq!(grid.level_at(1, 0), 3);
        assert_eq!(grid.level_at(2, 0), 3);
        assert_eq!(grid.total_water(), 14);
    }

    #[test]
    fn test_boundary_sides_are_blocked() {
        let mut grid = Grid::with_size(1, 1);
        pour(&mut grid, 0, 0, 8);
        let report = step(&mut grid);
        assert_eq!(report.transfers, 0);
        assert_eq!(grid.level_at(0, 0), 8);
        assert!(grid.water_at(0, 0).unwrap().static_full);
    }

    #[test]
    fn test_static_full_cleared_on_outflow() {
        let mut grid = floored_grid();
        pour(&mut grid, 0, 1, 8);
        grid.water_at_mut(0, 1).unwrap().static_full = true;
        step(&mut grid);
        assert!(!grid.water_at(0, 1).unwrap().static_full);
    }

    #[test]
    fn test_no_calc_cleared_after_step() {
        let mut grid = floored_grid();
        pour(&mut grid, 2, 0, 3);
        step(&mut grid);
        assert!(grid.water_cells().iter().all(|c| !c.no_calc));
    }

    /// Stone box holding a U-tube: left arm full to the top, right arm only
    /// its bottom cell, joined along the bottom row.
    fn u_tube() -> Grid {
        let mut grid = Grid::with_size(5, 6);
        for y in 0..6 {
            grid.set_tile(0, y, Tile::Stone);
            grid.set_tile(4, y, Tile::Stone);
        }
        for x in 0..5 {
            grid.set_tile(x, 5, Tile::Stone);
        }
        for y in 0..4 {
            grid.set_tile(2, y, Tile::Stone);
        }
        for y in 1..5 {
            pour(&mut grid, 1, y, 8);
        }
        pour(&mut grid, 2, 4, 8);
        pour(&mut grid, 3, 4, 8);
        grid
    }

    #[test]
    fn test_pressure_lifts_water_in_lower_arm() {
        let mut grid = u_tube();
        let before = grid.total_water();

        // First tick only marks the saturated cells
        let report = step(&mut grid);
        assert_eq!(report.lifted, 0);
        assert!(grid.water_at(3, 4).unwrap().static_full);

        let report = step(&mut grid);
        assert!(report.lifted >= 1);
        assert_eq!(grid.level_at(3, 3), 1);
        assert_eq!(grid.total_water(), before);
    }

    #[test]
    fn test_pressure_needs_higher_body_member() {
        let mut grid = Grid::with_size(3, 3);
        for x in 0..3 {
            grid.set_tile(x, 2, Tile::Stone);
        }
        grid.set_tile(0, 1, Tile::Stone);
        grid.set_tile(2, 1, Tile::Stone);
        pour(&mut grid, 1, 1, 8);
        grid.water_at_mut(1, 1).unwrap().static_full = true;

        let bodies = BodyDetector::new().detect(&mut grid);
        let lifted = FlowEngine::new().pressure_pass(&mut grid, &bodies);

        assert_eq!(lifted, 0);
        assert_eq!(grid.level_at(1, 0), 0);
    }

    #[test]
    fn test_touches_at_most_once() {
        let mut grid = Grid::with_size(8, 6);
        for x in 0..8 {
            grid.set_tile(x, 5, Tile::Stone);
        }
        for (x, y, level) in [(0, 0, 8), (3, 1, 5), (4, 1, 2), (6, 3, 7), (2, 4, 8), (1, 4, 3)] {
            pour(&mut grid, x, y, level);
        }
        let report = step(&mut grid);
        assert!(report.transfers > 0);
        assert!(report.touches.iter().all(|&t| t <= 1));
    }
}
