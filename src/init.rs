//! Global grid initialization.
//!
//! Fixed Dirichlet values on the four edges of the logical grid plus an
//! interior fill. Use `GlobalGrid::par_set_values` for custom needs.

use crate::domain::GlobalGrid;
use rand::prelude::*;
use rayon::prelude::*;

/// Values held by the outermost rows and columns of the global grid.
/// The north and south rows win at the four corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundaryValues {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub interior: f64,
}

impl Default for BoundaryValues {
    fn default() -> Self {
        BoundaryValues {
            north: 100.0,
            south: 0.0,
            east: 0.0,
            west: 0.0,
            interior: 0.0,
        }
    }
}

impl BoundaryValues {
    pub fn value_at(&self, coord: [usize; 2], extent: [usize; 2]) -> f64 {
        let [i, j] = coord;
        if i == 0 {
            self.north
        } else if i + 1 == extent[0] {
            self.south
        } else if j == 0 {
            self.west
        } else if j + 1 == extent[1] {
            self.east
        } else {
            self.interior
        }
    }

    pub fn apply(&self, grid: &mut GlobalGrid, chunk_size: usize) {
        let extent = grid.extent();
        grid.par_set_values(|coord| self.value_at(coord, extent), chunk_size);
    }
}

/// Overwrite the interior (everything but the outermost logical rows and
/// columns) with random integers in `[0, max_val)`.
pub fn rand(grid: &mut GlobalGrid, max_val: i32) {
    let [rows, cols] = grid.extent();
    let width = grid.padded_extent()[1];
    if rows < 3 || cols < 3 {
        return;
    }
    let max_val = max_val.max(1);
    grid.buffer_mut()
        .par_chunks_mut(width)
        .enumerate()
        .filter(|(i, _)| *i > 0 && *i + 1 < rows)
        .for_each(|(_, row)| {
            let mut rng = thread_rng();
            for value in &mut row[1..cols - 1] {
                *value = rng.gen_range(0..max_val) as f64;
            }
        });
}
