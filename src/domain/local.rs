use crate::topology::Direction;
use crate::util::*;

/// A `(rows + 2) x (cols + 2)` row-major buffer: the interior block a
/// process owns, surrounded by one ghost cell on every side.
/// Indexed by `(i, j)` in local coordinates, interior is `1..=rows`, `1..=cols`.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalGrid {
    aabb: AABB<2>,
    buffer: Vec<f64>,
}

impl LocalGrid {
    /// `local` is the interior extent `[rows, cols]`.
    pub fn new(local: [usize; 2]) -> Self {
        let aabb = AABB::from_extent(
            vector![0, 0],
            vector![local[0] as i32 + 2, local[1] as i32 + 2],
        );
        LocalGrid {
            buffer: vec![0.0; aabb.buffer_size()],
            aabb,
        }
    }

    /// Interior rows.
    pub fn rows(&self) -> usize {
        self.aabb.exclusive_bounds()[0] as usize - 2
    }

    /// Interior columns.
    pub fn cols(&self) -> usize {
        self.aabb.exclusive_bounds()[1] as usize - 2
    }

    /// Row length including ghosts.
    pub fn width(&self) -> usize {
        self.cols() + 2
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

    pub fn row(&self, i: usize) -> &[f64] {
        let w = self.width();
        &self.buffer[i * w..(i + 1) * w]
    }

    /// The owned cells, without ghosts.
    pub fn interior(&self) -> AABB<2> {
        AABB::from_extent(
            vector![1, 1],
            vector![self.rows() as i32, self.cols() as i32],
        )
    }

    /// First or last interior row/column on side `direction`;
    /// what a neighbor on that side needs for its ghost border.
    pub fn edge(&self, direction: Direction) -> AABB<2> {
        let (r, c) = (self.rows() as i32, self.cols() as i32);
        match direction {
            Direction::North => AABB::new(matrix![1, 1; 1, c]),
            Direction::South => AABB::new(matrix![r, r; 1, c]),
            Direction::West => AABB::new(matrix![1, r; 1, 1]),
            Direction::East => AABB::new(matrix![1, r; c, c]),
        }
    }

    /// Ghost row/column on side `direction`, corners excluded.
    pub fn ghost(&self, direction: Direction) -> AABB<2> {
        let (r, c) = (self.rows() as i32, self.cols() as i32);
        match direction {
            Direction::North => AABB::new(matrix![0, 0; 1, c]),
            Direction::South => AABB::new(matrix![r + 1, r + 1; 1, c]),
            Direction::West => AABB::new(matrix![1, r; 0, 0]),
            Direction::East => AABB::new(matrix![1, r; c + 1, c + 1]),
        }
    }

    pub fn region(&self, aabb: &AABB<2>) -> StridedRegion {
        StridedRegion::from_aabb(aabb, &self.aabb)
    }

    pub fn pack(&self, aabb: &AABB<2>) -> Vec<f64> {
        self.region(aabb).pack(&self.buffer)
    }

    pub fn unpack(&mut self, aabb: &AABB<2>, data: &[f64]) {
        let region = self.region(aabb);
        region.unpack(data, &mut self.buffer);
    }

    pub fn copy_region_from(&mut self, other: &LocalGrid, aabb: &AABB<2>) {
        debug_assert_eq!(self.aabb, other.aabb);
        self.unpack(aabb, &other.pack(aabb));
    }
}

impl std::ops::Index<(usize, usize)> for LocalGrid {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.buffer[i * self.width() + j]
    }
}

impl std::ops::IndexMut<(usize, usize)> for LocalGrid {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        let w = self.width();
        &mut self.buffer[i * w + j]
    }
}
