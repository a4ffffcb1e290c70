//! Grid layout planning.
//!
//! Positions depend only on the placement index, never on device size or
//! on whether earlier placements succeeded, so the same netlist always
//! produces the same layout.

/// Origin of the first grid cell
pub const GRID_ORIGIN: (f64, f64) = (20.0, 20.0);

/// Horizontal advance per component, in grid cells
const COLUMN_PITCH_CELLS: f64 = 3.0;
/// Vertical advance per row, in grid cells
const ROW_PITCH_CELLS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    max_components_per_row: usize,
    grid_size: f64,
}

impl GridLayout {
    /// A row capacity of 0 is treated as 1.
    pub fn new(max_components_per_row: usize, grid_size: f64) -> Self {
        Self {
            max_components_per_row: max_components_per_row.max(1),
            grid_size,
        }
    }

    pub fn max_components_per_row(&self) -> usize {
        self.max_components_per_row
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    /// Position of the zero-based `index`-th attempted placement.
    pub fn next_position(&self, index: usize) -> (f64, f64) {
        let column = (index % self.max_components_per_row) as f64;
        let row = (index / self.max_components_per_row) as f64;
        (
            GRID_ORIGIN.0 + column * COLUMN_PITCH_CELLS * self.grid_size,
            GRID_ORIGIN.1 + row * ROW_PITCH_CELLS * self.grid_size,
        )
    }

    pub fn cursor(&self) -> GridCursor {
        GridCursor {
            layout: *self,
            attempted: 0,
        }
    }
}

/// Running placement index for one reconstruction run.
#[derive(Debug, Clone)]
pub struct GridCursor {
    layout: GridLayout,
    attempted: usize,
}

impl GridCursor {
    /// Claim the next grid slot. Slots are consumed whether or not the
    /// placement that uses them succeeds.
    pub fn advance(&mut self) -> (f64, f64) {
        let position = self.layout.next_position(self.attempted);
        self.attempted += 1;
        position
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }
}
