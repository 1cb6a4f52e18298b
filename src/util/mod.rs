mod aabb;
pub mod indexing;
mod region;

pub use aabb::*;
pub use region::*;

/// Grid coordinate, `[row, column]` in 2D.
pub type Coord<const DIMENSION: usize> = nalgebra::SVector<i32, { DIMENSION }>;

/// Min corner in column 0, max corner in column 1.
pub type Bounds<const DIMENSION: usize> = nalgebra::SMatrix<i32, { DIMENSION }, 2>;

pub use nalgebra::{matrix, vector};
