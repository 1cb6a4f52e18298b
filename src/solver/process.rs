use crate::comm::*;
use crate::decomposition::{Decomposition, IterationBounds};
use crate::domain::*;
use crate::error::{DdsorError, Result};
use crate::halo::HaloExchange;
use crate::solver::SolverConfig;
use crate::stencil::{StencilKernel, StepContext};
use crate::topology::{CartesianTopology, Neighbors};
use crate::transport::{gather, scatter};
use std::time::{Duration, Instant};

/// Per-process view of a finished run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProcessSummary {
    pub rank: usize,
    pub coords: [usize; 2],
    pub neighbors: Neighbors,
    pub bounds: IterationBounds,
    pub iterations: usize,
    pub converged: bool,
    /// Time spent inside the kernel, summed over iterations.
    pub computation_time: Duration,
    /// Barrier to barrier.
    pub total_time: Duration,
}

#[derive(Debug)]
pub struct ProcessOutcome {
    pub summary: ProcessSummary,
    /// Gathered grid, `ROOT` only.
    pub result: Option<GlobalGrid>,
    /// Slowest `(computation, total)` seconds over all processes.
    pub timings: (f64, f64),
}

/// Everything one process does from scatter to gather.
/// `global` is the initial grid on `ROOT` and `None` elsewhere.
pub fn run_process<C: Communicator>(
    comm: &C,
    config: &SolverConfig,
    decomposition: &Decomposition,
    topology: &CartesianTopology,
    kernel: &dyn StencilKernel,
    global: Option<GlobalGrid>,
) -> Result<ProcessOutcome> {
    let rank = comm.rank();
    let coords = topology.coords_of(rank).ok_or_else(|| {
        DdsorError::Config(format!("rank {} is outside the process grid", rank))
    })?;
    let neighbors = topology.neighbors(coords);
    let bounds = decomposition.iteration_bounds(topology, coords, &neighbors);
    let origin = decomposition.origin(coords);
    let halo = HaloExchange::new(neighbors);
    tracing::info!(rank, ?coords, "{} {}", neighbors, bounds);

    let mut buffers = DoubleBuffer::new(decomposition.local_extent());
    scatter(comm, decomposition, topology, global, &mut buffers)?;

    let ctx = StepContext {
        comm,
        halo: &halo,
        bounds,
        parity: (origin[0] + origin[1]) % 2,
        chunk_size: config.chunk_size,
    };

    comm.barrier()?;
    let start = Instant::now();
    let mut computation_time = Duration::ZERO;
    let mut converged = false;
    let mut t = 0;
    while t < config.max_iterations && !converged {
        buffers.swap();
        halo.exchange(comm, buffers.previous_mut())?;

        let compute = Instant::now();
        kernel.update(&ctx, &mut buffers)?;
        computation_time += compute.elapsed();

        if let Some(check) = &config.convergence {
            if check.due(t) {
                converged = check.test(comm, &buffers, &bounds)?;
                if converged && rank == ROOT {
                    tracing::info!(iteration = t, "converged");
                }
            }
        }
        t += 1;
    }
    let total_time = start.elapsed();
    tracing::info!(rank, iterations = t, "done computing");
    comm.barrier()?;

    let timings = (
        comm.all_reduce(computation_time.as_secs_f64(), ReduceOp::Max)?,
        comm.all_reduce(total_time.as_secs_f64(), ReduceOp::Max)?,
    );
    let result = gather(comm, decomposition, topology, buffers.current())?;

    Ok(ProcessOutcome {
        summary: ProcessSummary {
            rank,
            coords,
            neighbors,
            bounds,
            iterations: t,
            converged,
            computation_time,
            total_time,
        },
        result,
        timings,
    })
}
