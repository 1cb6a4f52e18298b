use crate::util::indexing::*;
use crate::util::*;

/// Axis aligned box of grid coordinates, inclusive of both corners.
/// Column 0 of `bounds` is the min corner, column 1 the max corner.
///
/// Process blocks inside the padded global grid, ghost rows and columns,
/// and whole buffers are all described by one of these.
#[derive(Hash, Debug, Copy, Clone, Eq, PartialEq)]
pub struct AABB<const DIMENSION: usize> {
    pub bounds: Bounds<DIMENSION>,
}

impl<const DIMENSION: usize> std::fmt::Display for AABB<DIMENSION> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?} ..= {:?}]", self.min().as_slice(), self.max().as_slice())
    }
}

impl<const DIMENSION: usize> AABB<DIMENSION> {
    #[inline]
    pub fn new(bounds: Bounds<DIMENSION>) -> Self {
        debug_assert!(
            (0..DIMENSION).all(|d| bounds[(d, 0)] <= bounds[(d, 1)]),
            "inverted bounds {:?}",
            bounds
        );
        AABB { bounds }
    }

    /// Box starting at `origin` spanning `extent` cells per axis,
    /// i.e. origin `[2, 3]` with extent `[4, 5]` covers `[2, 3] ..= [5, 7]`.
    pub fn from_extent(origin: Coord<DIMENSION>, extent: Coord<DIMENSION>) -> Self {
        Self::new(Bounds::from_columns(&[origin, origin + extent.add_scalar(-1)]))
    }

    pub fn min(&self) -> Coord<DIMENSION> {
        self.bounds.column(0).into()
    }

    pub fn max(&self) -> Coord<DIMENSION> {
        self.bounds.column(1).into()
    }

    /// Cells per axis, i.e. `[0, 9]` has an exclusive size of 10.
    pub fn exclusive_bounds(&self) -> Coord<DIMENSION> {
        (self.max() - self.min()).add_scalar(1)
    }

    #[inline]
    pub fn buffer_size(&self) -> usize {
        buffer_size(&self.exclusive_bounds())
    }

    /// Row-major position of `coord` in a buffer covering exactly this box.
    pub fn coord_to_linear(&self, coord: &Coord<DIMENSION>) -> usize {
        coord_to_linear(&(coord - self.min()), &self.exclusive_bounds())
    }

    pub fn contains_aabb(&self, other: &Self) -> bool {
        (0..DIMENSION).all(|d| {
            other.bounds[(d, 0)] >= self.bounds[(d, 0)]
                && other.bounds[(d, 1)] <= self.bounds[(d, 1)]
        })
    }
}
