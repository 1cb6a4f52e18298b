use crate::util::*;
use rayon::prelude::*;

/// The full `X x Y` problem as one row-major buffer.
///
/// The buffer may be padded past the logical extent on the far end of
/// either axis so that it splits evenly into process blocks.
/// Padding cells are never part of the solution.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalGrid {
    extent: [usize; 2],
    aabb: AABB<2>,
    buffer: Vec<f64>,
}

impl GlobalGrid {
    pub fn new(extent: [usize; 2]) -> Self {
        Self::with_padding(extent, extent)
    }

    /// Zeroed grid of logical size `extent` stored as `padded`.
    pub fn with_padding(extent: [usize; 2], padded: [usize; 2]) -> Self {
        debug_assert!(extent[0] <= padded[0] && extent[1] <= padded[1]);
        let aabb = AABB::from_extent(
            vector![0, 0],
            vector![padded[0] as i32, padded[1] as i32],
        );
        GlobalGrid {
            extent,
            buffer: vec![0.0; aabb.buffer_size()],
            aabb,
        }
    }

    /// Logical extent `[X, Y]`.
    pub fn extent(&self) -> [usize; 2] {
        self.extent
    }

    pub fn padded_extent(&self) -> [usize; 2] {
        let e = self.aabb.exclusive_bounds();
        [e[0] as usize, e[1] as usize]
    }

    pub fn aabb(&self) -> &AABB<2> {
        &self.aabb
    }

    pub fn buffer(&self) -> &[f64] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [f64] {
        &mut self.buffer
    }

    fn width(&self) -> usize {
        self.padded_extent()[1]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.buffer[i * self.width() + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let w = self.width();
        self.buffer[i * w + j] = value;
    }

    /// Logical cells of row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.width();
        &self.buffer[start..start + self.extent[1]]
    }

    /// Value at `(X / 2, Y / 2)`.
    pub fn midpoint(&self) -> f64 {
        self.get(self.extent[0] / 2, self.extent[1] / 2)
    }

    /// Set every logical cell to `f([i, j])`, one padded row per rayon task
    /// group of `chunk_size` values. Padding is left untouched.
    pub fn par_set_values<F: Fn([usize; 2]) -> f64 + Send + Sync>(
        &mut self,
        f: F,
        chunk_size: usize,
    ) {
        profiling::scope!("GlobalGrid::par_set_values");
        let width = self.width();
        let extent = self.extent;
        self.buffer
            .par_chunks_mut(chunk_size.max(1))
            .enumerate()
            .for_each(|(c, chunk)| {
                let start = c * chunk_size.max(1);
                for (offset, value) in chunk.iter_mut().enumerate() {
                    let linear = start + offset;
                    let (i, j) = (linear / width, linear % width);
                    if i < extent[0] && j < extent[1] {
                        *value = f([i, j]);
                    }
                }
            });
    }

    /// Same logical values stored with a different padding.
    pub fn repadded(&self, padded: [usize; 2]) -> GlobalGrid {
        let mut result = GlobalGrid::with_padding(self.extent, padded);
        let logical = AABB::from_extent(
            vector![0, 0],
            vector![self.extent[0] as i32, self.extent[1] as i32],
        );
        let values = StridedRegion::from_aabb(&logical, &self.aabb).pack(&self.buffer);
        StridedRegion::from_aabb(&logical, &result.aabb).unpack(&values, &mut result.buffer);
        result
    }

    pub fn unpadded(&self) -> GlobalGrid {
        self.repadded(self.extent)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn set_values_skips_padding() {
        let mut g = GlobalGrid::with_padding([3, 2], [4, 4]);
        g.par_set_values(|c| (10 * c[0] + c[1]) as f64, 3);
        assert_eq!(g.get(2, 1), 21.0);
        assert_eq!(g.get(2, 2), 0.0);
        assert_eq!(g.get(3, 0), 0.0);
        assert_eq!(g.row(1), &[10.0, 11.0]);
    }

    #[test]
    fn repadding_keeps_values() {
        let mut g = GlobalGrid::new([3, 3]);
        g.par_set_values(|c| (c[0] * 3 + c[1]) as f64, 4);
        let p = g.repadded([4, 6]);
        assert_eq!(p.padded_extent(), [4, 6]);
        assert_eq!(p.get(2, 2), 8.0);
        assert_eq!(p.get(1, 4), 0.0);
        assert_eq!(p.unpadded(), g);
        assert_eq!(g.midpoint(), 4.0);
    }
}
