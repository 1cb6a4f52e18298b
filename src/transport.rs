//! One-time redistribution of the global grid.
//!
//! `scatter` moves each process's block of the padded global grid into the
//! interior of its local buffers; `gather` is the exact inverse.
//! Blocks are cut out of the global row-major buffer with a
//! `StridedRegion` and travel as contiguous messages.

use crate::comm::*;
use crate::decomposition::Decomposition;
use crate::domain::*;
use crate::error::{DdsorError, Result};
use crate::topology::CartesianTopology;
use crate::util::*;

fn block_region(
    decomposition: &Decomposition,
    topology: &CartesianTopology,
    rank: usize,
    global_bounds: &AABB<2>,
) -> Result<StridedRegion> {
    let coords = topology.coords_of(rank).ok_or_else(|| {
        DdsorError::Config(format!("rank {} is outside the process grid", rank))
    })?;
    Ok(StridedRegion::from_aabb(&decomposition.block(coords), global_bounds))
}

/// Distribute `global` (present on `ROOT` only, consumed there) into the
/// interiors of both of every process's buffers. Ghost borders are left as
/// they are.
pub fn scatter<C: Communicator + ?Sized>(
    comm: &C,
    decomposition: &Decomposition,
    topology: &CartesianTopology,
    global: Option<GlobalGrid>,
    buffers: &mut DoubleBuffer,
) -> Result<()> {
    profiling::scope!("transport::scatter");
    let interior = buffers.current().interior();

    let block = if comm.rank() == ROOT {
        let global = global.ok_or_else(|| {
            DdsorError::Config("coordinator has no global grid to scatter".to_string())
        })?;
        if global.extent() != decomposition.global_extent() {
            return Err(DdsorError::Config(format!(
                "global grid is {:?} but the decomposition expects {:?}",
                global.extent(),
                decomposition.global_extent()
            )));
        }
        let global = if global.padded_extent() == decomposition.padded_extent() {
            global
        } else {
            global.repadded(decomposition.padded_extent())
        };

        let mut own = Vec::new();
        for rank in 0..comm.size() {
            let region = block_region(decomposition, topology, rank, global.aabb())?;
            let data = region.pack(global.buffer());
            if rank == ROOT {
                own = data;
            } else {
                comm.isend(rank, Tag::Scatter, &data)?.wait();
            }
        }
        own
    } else {
        comm.wait(comm.irecv(ROOT, Tag::Scatter, interior.buffer_size()))?
    };

    buffers.current_mut().unpack(&interior, &block);
    buffers.previous_mut().unpack(&interior, &block);
    tracing::debug!(rank = comm.rank(), "received block of {} values", block.len());
    Ok(())
}

/// Collect the interior of `local` from every process onto `ROOT`.
/// Returns the unpadded global grid on `ROOT` and `None` elsewhere.
pub fn gather<C: Communicator + ?Sized>(
    comm: &C,
    decomposition: &Decomposition,
    topology: &CartesianTopology,
    local: &LocalGrid,
) -> Result<Option<GlobalGrid>> {
    profiling::scope!("transport::gather");
    let interior = local.interior();
    let block = local.pack(&interior);

    if comm.rank() != ROOT {
        comm.isend(ROOT, Tag::Gather, &block)?.wait();
        return Ok(None);
    }

    let mut global = GlobalGrid::with_padding(
        decomposition.global_extent(),
        decomposition.padded_extent(),
    );
    let bounds = *global.aabb();
    let requests: Vec<RecvRequest> = (0..comm.size())
        .filter(|r| *r != ROOT)
        .map(|r| comm.irecv(r, Tag::Gather, block.len()))
        .collect();
    let ranks: Vec<usize> = requests.iter().map(|r| r.source).collect();
    let received = comm.wait_all(requests)?;

    block_region(decomposition, topology, ROOT, &bounds)?.unpack(&block, global.buffer_mut());
    for (rank, data) in ranks.into_iter().zip(received) {
        block_region(decomposition, topology, rank, &bounds)?.unpack(&data, global.buffer_mut());
    }
    Ok(Some(global.unpadded()))
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn single_process_round_trip() {
        let mut world = ThreadWorld::create(1);
        let comm = world.pop().unwrap();
        let d = Decomposition::new([5, 4], [1, 1]).unwrap();
        let t = CartesianTopology::new([1, 1], 1).unwrap();

        let mut g = GlobalGrid::new([5, 4]);
        g.par_set_values(|c| (c[0] * 4 + c[1]) as f64, 3);
        let mut buffers = DoubleBuffer::new(d.local_extent());
        scatter(&comm, &d, &t, Some(g.clone()), &mut buffers).unwrap();

        assert_eq!(buffers.previous()[(1, 1)], 0.0);
        assert_eq!(buffers.current()[(5, 4)], 19.0);
        assert_eq!(buffers.current()[(0, 0)], 0.0);

        let back = gather(&comm, &d, &t, buffers.current()).unwrap().unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn padded_round_trip_across_threads() {
        let d = Decomposition::new([7, 5], [3, 2]).unwrap();
        let t = CartesianTopology::new([3, 2], 6).unwrap();
        let mut g = GlobalGrid::new([7, 5]);
        g.par_set_values(|c| (c[0] * 10 + c[1]) as f64 + 0.5, 4);
        let expected = g.clone();

        let world = ThreadWorld::create(6);
        let mut global = Some(g);
        let results: Vec<Option<GlobalGrid>> = std::thread::scope(|s| {
            let handles: Vec<_> = world
                .into_iter()
                .map(|comm| {
                    let mine = if comm.rank() == ROOT { global.take() } else { None };
                    let (d, t) = (&d, &t);
                    s.spawn(move || {
                        let mut buffers = DoubleBuffer::new(d.local_extent());
                        scatter(&comm, d, t, mine, &mut buffers).unwrap();
                        gather(&comm, d, t, buffers.current()).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results[0].as_ref(), Some(&expected));
        assert!(results[1..].iter().all(|r| r.is_none()));
    }

    #[test]
    fn scatter_rejects_mismatched_grid() {
        let mut world = ThreadWorld::create(1);
        let comm = world.pop().unwrap();
        let d = Decomposition::new([5, 4], [1, 1]).unwrap();
        let t = CartesianTopology::new([1, 1], 1).unwrap();
        let mut buffers = DoubleBuffer::new(d.local_extent());
        assert!(scatter(&comm, &d, &t, Some(GlobalGrid::new([4, 4])), &mut buffers).is_err());
        assert!(scatter(&comm, &d, &t, None, &mut buffers).is_err());
    }
}
