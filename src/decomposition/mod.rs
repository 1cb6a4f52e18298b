//! Block decomposition of the global grid over the process grid.
//!
//! Each axis is split independently into equal blocks. When an axis does
//! not divide evenly the global grid is padded up to the next multiple of
//! the process count on that axis; the padding always sits at the far end
//! of the axis and is owned by the last process along it.

use crate::error::{DdsorError, Result};
use crate::topology::{CartesianTopology, Neighbors};
use crate::util::*;
use std::ops::Range;

/// Partition of one axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AxisPartition {
    /// Logical extent of the global grid.
    pub global: usize,
    /// Processes along the axis.
    pub processes: usize,
    /// Interior cells per process.
    pub local: usize,
    /// `local * processes`, at least `global`.
    pub padded: usize,
}

impl AxisPartition {
    pub fn new(axis: usize, global: usize, processes: usize) -> Result<Self> {
        let fail = |reason: String| DdsorError::Decomposition { axis, reason };
        if processes == 0 {
            return Err(fail("no processes on this axis".to_string()));
        }
        if global == 0 {
            return Err(fail("global grid is empty".to_string()));
        }
        let local = if global % processes == 0 {
            global / processes
        } else {
            global / processes + 1
        };
        let padded = local * processes;

        // The last process must own at least one real cell.
        if padded - global >= local {
            return Err(fail(format!(
                "{} cells over {} processes needs {} padding cells, \
                 a whole block of {}",
                global,
                processes,
                padded - global,
                local
            )));
        }

        Ok(AxisPartition {
            global,
            processes,
            local,
            padded,
        })
    }

    pub fn padding(&self) -> usize {
        self.padded - self.global
    }
}

/// Interior index ranges a process updates, in local buffer coordinates
/// (the ghost border is row/column `0` and `local + 1`).
///
/// A side without a neighbor holds the fixed global boundary in its first
/// (or last) interior row/column, so the range shrinks by one there.
/// The last process along a padded axis shrinks further to skip padding.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IterationBounds {
    pub i_min: usize,
    pub i_max: usize,
    pub j_min: usize,
    pub j_max: usize,
}

impl IterationBounds {
    pub fn rows(&self) -> Range<usize> {
        self.i_min..self.i_max.max(self.i_min)
    }

    pub fn cols(&self) -> Range<usize> {
        self.j_min..self.j_max.max(self.j_min)
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty() || self.cols().is_empty()
    }
}

impl std::fmt::Display for IterationBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imin {}, Imax {}, Jmin {}, Jmax {}",
            self.i_min, self.i_max, self.j_min, self.j_max
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Decomposition {
    pub axes: [AxisPartition; 2],
}

impl Decomposition {
    /// `global` is `[X, Y]` (rows, columns), `grid` is `[Px, Py]`.
    pub fn new(global: [usize; 2], grid: [usize; 2]) -> Result<Self> {
        Ok(Decomposition {
            axes: [
                AxisPartition::new(0, global[0], grid[0])?,
                AxisPartition::new(1, global[1], grid[1])?,
            ],
        })
    }

    pub fn global_extent(&self) -> [usize; 2] {
        self.axes.map(|a| a.global)
    }

    pub fn local_extent(&self) -> [usize; 2] {
        self.axes.map(|a| a.local)
    }

    pub fn padded_extent(&self) -> [usize; 2] {
        self.axes.map(|a| a.padded)
    }

    pub fn grid(&self) -> [usize; 2] {
        self.axes.map(|a| a.processes)
    }

    /// Bounds of the padded global grid.
    pub fn padded_bounds(&self) -> AABB<2> {
        let p = self.padded_extent();
        AABB::from_extent(vector![0, 0], vector![p[0] as i32, p[1] as i32])
    }

    /// Global coordinate of the first interior cell owned by `coords`.
    pub fn origin(&self, coords: [usize; 2]) -> [usize; 2] {
        let local = self.local_extent();
        [coords[0] * local[0], coords[1] * local[1]]
    }

    /// Block owned by `coords`, in padded global coordinates.
    pub fn block(&self, coords: [usize; 2]) -> AABB<2> {
        let origin = self.origin(coords);
        let local = self.local_extent();
        AABB::from_extent(
            vector![origin[0] as i32, origin[1] as i32],
            vector![local[0] as i32, local[1] as i32],
        )
    }

    /// Linear offset of the block's first cell in the padded row-major grid,
    /// `local_x * Py * local_y * coord_x + local_y * coord_y`.
    pub fn block_offset(&self, coords: [usize; 2]) -> usize {
        let local = self.local_extent();
        let grid = self.grid();
        local[0] * grid[1] * local[1] * coords[0] + local[1] * coords[1]
    }

    pub fn iteration_bounds(
        &self,
        topology: &CartesianTopology,
        coords: [usize; 2],
        neighbors: &Neighbors,
    ) -> IterationBounds {
        let local = self.local_extent();
        let mut bounds = IterationBounds {
            i_min: 1,
            i_max: local[0] + 1,
            j_min: 1,
            j_max: local[1] + 1,
        };

        if neighbors.north.is_none() {
            bounds.i_min += 1;
        }
        if neighbors.south.is_none() {
            bounds.i_max -= 1;
        }
        if neighbors.west.is_none() {
            bounds.j_min += 1;
        }
        if neighbors.east.is_none() {
            bounds.j_max -= 1;
        }

        // padding < local, so these never underflow
        if topology.is_last(coords, 0) {
            bounds.i_max -= self.axes[0].padding();
        }
        if topology.is_last(coords, 1) {
            bounds.j_max -= self.axes[1].padding();
        }
        bounds
    }
}
