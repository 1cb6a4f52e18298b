use crate::util::*;

/// A strided block of values inside a flat row-major buffer:
/// `count` runs of `block_len` contiguous values, with consecutive
/// runs starting `stride` values apart.
///
/// A grid row is one run, a grid column is `rows` runs of length one,
/// and a sub-rectangle of a wider grid is one run per rectangle row.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StridedRegion {
    pub offset: usize,
    pub count: usize,
    pub block_len: usize,
    pub stride: usize,
}

impl StridedRegion {
    pub fn new(offset: usize, count: usize, block_len: usize, stride: usize) -> Self {
        debug_assert!(count <= 1 || block_len <= stride);
        StridedRegion {
            offset,
            count,
            block_len,
            stride,
        }
    }

    /// Region covering `aabb` (in `[row, column]` coordinates) inside a buffer
    /// whose full extent is `buffer_bounds`.
    pub fn from_aabb(aabb: &AABB<2>, buffer_bounds: &AABB<2>) -> Self {
        debug_assert!(
            buffer_bounds.contains_aabb(aabb),
            "{} does not contain {}",
            buffer_bounds,
            aabb
        );
        let extent = aabb.exclusive_bounds();
        let width = buffer_bounds.exclusive_bounds()[1] as usize;
        StridedRegion::new(
            buffer_bounds.coord_to_linear(&aabb.min()),
            extent[0] as usize,
            extent[1] as usize,
            width,
        )
    }

    /// Total number of values described.
    pub fn len(&self) -> usize {
        self.count * self.block_len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index one past the last value touched.
    pub fn end(&self) -> usize {
        if self.is_empty() {
            self.offset
        } else {
            self.offset + (self.count - 1) * self.stride + self.block_len
        }
    }

    fn blocks(&self) -> impl Iterator<Item = std::ops::Range<usize>> + '_ {
        (0..self.count).map(move |b| {
            let start = self.offset + b * self.stride;
            start..start + self.block_len
        })
    }

    /// Copy the described values out into a contiguous vector.
    pub fn pack(&self, buffer: &[f64]) -> Vec<f64> {
        debug_assert!(self.end() <= buffer.len());
        let mut result = Vec::with_capacity(self.len());
        for block in self.blocks() {
            result.extend_from_slice(&buffer[block]);
        }
        result
    }

    /// Copy contiguous `data` into the described values of `buffer`.
    pub fn unpack(&self, data: &[f64], buffer: &mut [f64]) {
        debug_assert_eq!(data.len(), self.len());
        debug_assert!(self.end() <= buffer.len());
        for (block, chunk) in self.blocks().zip(data.chunks(self.block_len.max(1))) {
            buffer[block].copy_from_slice(chunk);
        }
    }
}
