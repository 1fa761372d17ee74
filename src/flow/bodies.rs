//! Connected bodies of water
//!
//! Rebuilt from scratch every tick. A body is a maximal 4-connected set of
//! cells holding water; tiles play no part in membership. Each body records
//! the highest hydrostatic height of its members, which the pressure pass
//! compares against to decide whether water may be pushed upward.

use crate::grid::Grid;

/// One connected body of water for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body {
    /// Highest `height_metric` among member cells
    pub max_height: i32,
    /// Number of member cells
    pub cells: usize,
}

/// Bodies found on the last detection pass, indexed by body id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyTable {
    bodies: Vec<Body>,
}

impl BodyTable {
    pub fn get(&self, id: usize) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// Max height of a body, `None` for unknown ids
    pub fn max_height(&self, id: usize) -> Option<i32> {
        self.bodies.get(id).map(|b| b.max_height)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }
}

/// Flood-fills water cells into bodies
#[derive(Debug, Default)]
pub struct BodyDetector {
    stack: Vec<usize>,
}

impl BodyDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a body to every wet cell and clear it on every dry one.
    ///
    /// Scans row-major; each cell is pushed at most once, so the work is
    /// bounded by the grid area regardless of body shape.
    pub fn detect(&mut self, grid: &mut Grid) -> BodyTable {
        let width = grid.width();
        let height = grid.height();
        let cells = grid.water_cells_mut();

        for cell in cells.iter_mut() {
            cell.body = None;
        }

        let mut bodies = Vec::new();
        self.stack.clear();

        for start in 0..cells.len() {
            if cells[start].level == 0 || cells[start].body.is_some() {
                continue;
            }

            let id = bodies.len();
            let mut body = Body {
                max_height: i32::MIN,
                cells: 0,
            };

            cells[start].body = Some(id);
            self.stack.push(start);

            while let Some(index) = self.stack.pop() {
                let cell = cells[index];
                body.cells += 1;
                body.max_height = body.max_height.max(cell.height_metric(height));

                let neighbors = [
                    (cell.x, cell.y - 1),
                    (cell.x, cell.y + 1),
                    (cell.x - 1, cell.y),
                    (cell.x + 1, cell.y),
                ];
                for (nx, ny) in neighbors {
                    if nx < 0 || ny < 0 || nx >= width || ny >= height {
                        continue;
                    }
                    let n = (ny * width + nx) as usize;
                    if cells[n].level > 0 && cells[n].body.is_none() {
                        cells[n].body = Some(id);
                        self.stack.push(n);
                    }
                }
            }

            bodies.push(body);
        }

        tracing::trace!(bodies = bodies.len(), "Detected water bodies");

        BodyTable { bodies }
    }
}
