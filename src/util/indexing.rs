//! Row-major index arithmetic.
//! The last axis varies fastest, so for 2D coordinates `[row, column]`
//! a whole grid row is contiguous in memory.

use crate::util::*;

/// Number of values needed to store every coordinate below `exclusive_bound`.
pub fn buffer_size<const DIMENSION: usize>(exclusive_bound: &Coord<DIMENSION>) -> usize {
    exclusive_bound.iter().map(|d| *d as usize).product()
}

pub fn coord_to_linear<const DIMENSION: usize>(
    coord: &Coord<DIMENSION>,
    exclusive_bounds: &Coord<DIMENSION>,
) -> usize {
    coord
        .iter()
        .zip(exclusive_bounds.iter())
        .fold(0, |accumulator, (c, extent)| {
            debug_assert!(*c >= 0 && c < extent);
            accumulator * *extent as usize + *c as usize
        })
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn buffer_size_test() {
        assert_eq!(buffer_size(&vector![5]), 5);
        assert_eq!(buffer_size(&vector![5, 7]), 35);
    }

    #[test]
    fn coord_to_linear_test() {
        assert_eq!(coord_to_linear(&vector![5, 7], &vector![10, 20]), 5 * 20 + 7);
        assert_eq!(coord_to_linear(&vector![0, 0], &vector![3, 3]), 0);
        assert_eq!(coord_to_linear(&vector![2, 2], &vector![3, 3]), 8);
        assert_eq!(
            coord_to_linear(&vector![5, 7, 11], &vector![20, 20, 20]),
            5 * 20 * 20 + 7 * 20 + 11
        );
    }
}
