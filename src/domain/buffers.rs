use crate::domain::LocalGrid;
use crate::topology::Direction;

/// Previous and current iterate of one subdomain.
/// Swapping only flips which of the two grids is current.
#[derive(Clone, Debug)]
pub struct DoubleBuffer {
    grids: [LocalGrid; 2],
    current: usize,
}

impl DoubleBuffer {
    pub fn new(local: [usize; 2]) -> Self {
        DoubleBuffer {
            grids: [LocalGrid::new(local), LocalGrid::new(local)],
            current: 1,
        }
    }

    pub fn previous(&self) -> &LocalGrid {
        &self.grids[1 - self.current]
    }

    pub fn previous_mut(&mut self) -> &mut LocalGrid {
        &mut self.grids[1 - self.current]
    }

    pub fn current(&self) -> &LocalGrid {
        &self.grids[self.current]
    }

    pub fn current_mut(&mut self) -> &mut LocalGrid {
        &mut self.grids[self.current]
    }

    /// Read previous while writing current.
    pub fn split_mut(&mut self) -> (&LocalGrid, &mut LocalGrid) {
        let (first, second) = self.grids.split_at_mut(1);
        if self.current == 0 {
            (&second[0], &mut first[0])
        } else {
            (&first[0], &mut second[0])
        }
    }

    /// The current iterate becomes the previous one.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Bring the ghost border of previous (just exchanged) into current,
    /// for kernels that read neighbors out of the grid they write.
    pub fn copy_ghosts_to_current(&mut self) {
        let (previous, current) = self.split_mut();
        for direction in Direction::ALL {
            let ghost = previous.ghost(direction);
            current.copy_region_from(previous, &ghost);
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn swap_flips_roles() {
        let mut b = DoubleBuffer::new([2, 2]);
        b.current_mut()[(1, 1)] = 5.0;
        assert_eq!(b.previous()[(1, 1)], 0.0);
        b.swap();
        assert_eq!(b.previous()[(1, 1)], 5.0);
        assert_eq!(b.current()[(1, 1)], 0.0);

        let (prev, cur) = b.split_mut();
        cur[(2, 2)] = prev[(1, 1)] + 1.0;
        assert_eq!(b.current()[(2, 2)], 6.0);
    }

    #[test]
    fn ghosts_are_copied_without_interior() {
        let mut b = DoubleBuffer::new([2, 3]);
        for v in b.previous_mut().buffer_mut() {
            *v = 1.0;
        }
        b.copy_ghosts_to_current();
        let cur = b.current();
        assert_eq!(cur[(0, 1)], 1.0);
        assert_eq!(cur[(3, 3)], 1.0);
        assert_eq!(cur[(2, 0)], 1.0);
        assert_eq!(cur[(1, 4)], 1.0);
        assert_eq!(cur[(1, 1)], 0.0);
        // corners are never exchanged
        assert_eq!(cur[(0, 0)], 0.0);
    }
}
