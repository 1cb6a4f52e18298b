//! Ghost border exchange between neighboring subdomains.
//!
//! Done one axis at a time: post the sends of both edges on the axis,
//! post the receives for both ghosts, then wait on the receives.
//! Sends never block, so two neighbors that both send first cannot
//! deadlock. Corners are never exchanged; a 5-point stencil does not read them.

use crate::comm::*;
use crate::domain::LocalGrid;
use crate::error::Result;
use crate::topology::{Direction, Neighbors};

const AXES: [[Direction; 2]; 2] = [
    [Direction::North, Direction::South],
    [Direction::East, Direction::West],
];

#[derive(Copy, Clone, Debug)]
pub struct HaloExchange {
    neighbors: Neighbors,
}

impl HaloExchange {
    pub fn new(neighbors: Neighbors) -> Self {
        HaloExchange { neighbors }
    }

    pub fn neighbors(&self) -> &Neighbors {
        &self.neighbors
    }

    /// Refresh every ghost row/column of `grid` that faces a neighbor.
    pub fn exchange<C: Communicator + ?Sized>(
        &self,
        comm: &C,
        grid: &mut LocalGrid,
    ) -> Result<()> {
        profiling::scope!("HaloExchange::exchange");
        for axis in AXES {
            self.exchange_axis(comm, grid, axis)?;
        }
        Ok(())
    }

    fn exchange_axis<C: Communicator + ?Sized>(
        &self,
        comm: &C,
        grid: &mut LocalGrid,
        directions: [Direction; 2],
    ) -> Result<()> {
        let mut sends = Vec::with_capacity(2);
        let mut receives = Vec::with_capacity(2);
        let mut targets = Vec::with_capacity(2);

        for direction in directions {
            let Some(peer) = self.neighbors.get(direction) else {
                continue;
            };
            let edge = grid.pack(&grid.edge(direction));
            sends.push(comm.isend(peer, Tag::Halo(direction), &edge)?);

            // The neighbor's matching send travels the opposite way.
            let ghost = grid.ghost(direction);
            receives.push(comm.irecv(peer, Tag::Halo(direction.opposite()), ghost.buffer_size()));
            targets.push(ghost);
        }

        for (ghost, data) in targets.iter().zip(comm.wait_all(receives)?) {
            grid.unpack(ghost, &data);
        }
        sends.into_iter().for_each(SendRequest::wait);
        tracing::debug!(
            rank = comm.rank(),
            "exchanged {} ghost regions along {:?}/{:?}",
            targets.len(),
            directions[0],
            directions[1]
        );
        Ok(())
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::topology::CartesianTopology;

    #[test]
    fn no_neighbors_is_a_no_op() {
        let mut world = ThreadWorld::create(1);
        let comm = world.pop().unwrap();
        let mut grid = LocalGrid::new([2, 2]);
        grid[(1, 1)] = 3.0;
        let before = grid.clone();
        HaloExchange::new(Neighbors::default())
            .exchange(&comm, &mut grid)
            .unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn ghosts_hold_neighbor_edges() {
        // 2 x 2 process grid, every interior cell holds its owner's rank.
        let t = CartesianTopology::new([2, 2], 4).unwrap();
        let world = ThreadWorld::create(4);
        let grids: Vec<LocalGrid> = std::thread::scope(|s| {
            let handles: Vec<_> = world
                .into_iter()
                .map(|comm| {
                    let t = &t;
                    s.spawn(move || {
                        let rank = comm.rank();
                        let mut grid = LocalGrid::new([3, 2]);
                        let interior = grid.interior();
                        grid.unpack(&interior, &[rank as f64; 6]);
                        let halo = HaloExchange::new(t.neighbors(t.coords_of(rank).unwrap()));
                        halo.exchange(&comm, &mut grid).unwrap();
                        grid
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        // rank 0 at (0, 0): south is 2, east is 1
        let g = &grids[0];
        assert_eq!(g.pack(&g.ghost(Direction::South)), vec![2.0, 2.0]);
        assert_eq!(g.pack(&g.ghost(Direction::East)), vec![1.0, 1.0, 1.0]);
        assert_eq!(g.pack(&g.ghost(Direction::North)), vec![0.0, 0.0]);
        assert_eq!(g[(4, 3)], 0.0);

        // rank 3 at (1, 1): north is 1, west is 2
        let g = &grids[3];
        assert_eq!(g.pack(&g.ghost(Direction::North)), vec![1.0, 1.0]);
        assert_eq!(g.pack(&g.ghost(Direction::West)), vec![2.0, 2.0, 2.0]);
        assert_eq!(g.pack(&g.ghost(Direction::South)), vec![0.0, 0.0]);
    }
}
