//! Cartesian process grid.
//!
//! Ranks are laid out row-major over a `Px x Py` grid: axis 0 is the
//! row axis (north is `-1`, south is `+1`) and axis 1 is the column axis
//! (west is `-1`, east is `+1`). The grid is not periodic, so processes
//! on the edge of the grid have no neighbor on that side.

use crate::error::{DdsorError, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Unit step on the process grid, `[row, column]`.
    pub fn step(&self) -> [isize; 2] {
        match self {
            Direction::North => [-1, 0],
            Direction::South => [1, 0],
            Direction::East => [0, 1],
            Direction::West => [0, -1],
        }
    }
}

/// Up to four axis-aligned neighbor ranks, `None` on the edge of the grid.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Neighbors {
    pub north: Option<usize>,
    pub south: Option<usize>,
    pub east: Option<usize>,
    pub west: Option<usize>,
}

impl Neighbors {
    pub fn get(&self, direction: Direction) -> Option<usize> {
        match direction {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }
}

impl std::fmt::Display for Neighbors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |n: Option<usize>| n.map_or_else(|| "-".to_string(), |r| r.to_string());
        write!(
            f,
            "N: {} S: {} E: {} W: {}",
            show(self.north),
            show(self.south),
            show(self.east),
            show(self.west)
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CartesianTopology {
    dims: [usize; 2],
}

impl CartesianTopology {
    /// `dims` is `[Px, Py]`; their product must equal the number of processes.
    pub fn new(dims: [usize; 2], processes: usize) -> Result<Self> {
        if dims.iter().any(|d| *d == 0) {
            return Err(DdsorError::Config(format!(
                "process grid {}x{} has an empty axis",
                dims[0], dims[1]
            )));
        }
        if dims[0] * dims[1] != processes {
            return Err(DdsorError::Config(format!(
                "process grid {}x{} does not match {} processes",
                dims[0], dims[1], processes
            )));
        }
        Ok(CartesianTopology { dims })
    }

    pub fn size(&self) -> usize {
        self.dims[0] * self.dims[1]
    }

    pub fn rank_of(&self, coords: [usize; 2]) -> Option<usize> {
        (coords[0] < self.dims[0] && coords[1] < self.dims[1])
            .then(|| coords[0] * self.dims[1] + coords[1])
    }

    pub fn coords_of(&self, rank: usize) -> Option<[usize; 2]> {
        (rank < self.size()).then(|| [rank / self.dims[1], rank % self.dims[1]])
    }

    /// Rank one step away from `coords`, if that step stays on the grid.
    pub fn neighbor(&self, coords: [usize; 2], direction: Direction) -> Option<usize> {
        let step = direction.step();
        let row = coords[0].checked_add_signed(step[0])?;
        let column = coords[1].checked_add_signed(step[1])?;
        self.rank_of([row, column])
    }

    pub fn neighbors(&self, coords: [usize; 2]) -> Neighbors {
        Neighbors {
            north: self.neighbor(coords, Direction::North),
            south: self.neighbor(coords, Direction::South),
            east: self.neighbor(coords, Direction::East),
            west: self.neighbor(coords, Direction::West),
        }
    }

    /// Whether `coords` is the last process along `axis`.
    pub fn is_last(&self, coords: [usize; 2], axis: usize) -> bool {
        coords[axis] + 1 == self.dims[axis]
    }
}
