//! Solver driver.
//!
//! `solve` validates a `SolverConfig`, plays every process of the
//! `Px x Py` grid on its own thread, and hands back the gathered result.

mod process;

pub use process::*;

use crate::comm::{Communicator, ThreadWorld, ROOT};
use crate::convergence::ConvergenceCheck;
use crate::decomposition::Decomposition;
use crate::domain::GlobalGrid;
use crate::error::{CommError, DdsorError, Result};
use crate::stencil::*;
use crate::topology::CartesianTopology;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Global extent `[X, Y]`.
    pub global: [usize; 2],
    /// Process grid `[Px, Py]`.
    pub grid: [usize; 2],
    pub method: Method,
    /// Iteration cap, reached unless the convergence test stops the run first.
    pub max_iterations: usize,
    /// `None` runs exactly `max_iterations` iterations.
    pub convergence: Option<ConvergenceCheck>,
    /// Values per rayon task inside a process.
    pub chunk_size: usize,
}

impl SolverConfig {
    pub fn new(global: [usize; 2], grid: [usize; 2], method: Method) -> Self {
        SolverConfig {
            global,
            grid,
            method,
            max_iterations: 256,
            convergence: None,
            chunk_size: 1024,
        }
    }

    pub fn processes(&self) -> usize {
        self.grid[0] * self.grid[1]
    }

    /// Fixed for the run, from the logical (unpadded) leading extent.
    pub fn omega(&self) -> f64 {
        sor_omega(self.global[0])
    }

    /// Every check that can fail before a single message is sent.
    pub fn validate(&self) -> Result<(Decomposition, CartesianTopology)> {
        if self.chunk_size == 0 {
            return Err(DdsorError::Config("chunk size must be positive".to_string()));
        }
        if let Some(check) = &self.convergence {
            if check.tolerance.is_nan() || check.tolerance < 0.0 {
                return Err(DdsorError::Config(format!(
                    "tolerance {} must be a non-negative number",
                    check.tolerance
                )));
            }
        }
        let topology = CartesianTopology::new(self.grid, self.processes())?;
        let decomposition = Decomposition::new(self.global, self.grid)?;
        Ok((decomposition, topology))
    }
}

/// What a run hands back to the coordinator.
#[derive(Clone, Debug)]
pub struct SolveReport {
    pub config: SolverConfig,
    /// Iterations performed, identical on every process.
    pub iterations: usize,
    pub converged: bool,
    /// Slowest process, seconds.
    pub computation_time: f64,
    /// Slowest process, seconds.
    pub total_time: f64,
    /// Unpadded global grid after the last iteration.
    pub result: GlobalGrid,
    /// One entry per rank, in rank order.
    pub processes: Vec<ProcessSummary>,
}

pub fn solve(config: &SolverConfig, global: GlobalGrid) -> Result<SolveReport> {
    let kernel = kernel_for(config.method, config.omega());
    solve_with(config, global, &*kernel)
}

/// `solve` with the kernel supplied by the caller.
pub(crate) fn solve_with(
    config: &SolverConfig,
    global: GlobalGrid,
    kernel: &dyn StencilKernel,
) -> Result<SolveReport> {
    profiling::scope!("solve");
    let (decomposition, topology) = config.validate()?;
    if global.extent() != config.global {
        return Err(DdsorError::Config(format!(
            "initial grid is {:?}, expected {:?}",
            global.extent(),
            config.global
        )));
    }

    tracing::info!(
        method = %kernel.method(),
        omega = config.omega(),
        "solving {}x{} on a {}x{} process grid, local block {:?}",
        config.global[0],
        config.global[1],
        config.grid[0],
        config.grid[1],
        decomposition.local_extent()
    );

    let world = ThreadWorld::create(config.processes());
    let mut global = Some(global);
    let joined: Vec<std::thread::Result<Result<ProcessOutcome>>> = std::thread::scope(|s| {
        let handles: Vec<_> = world
            .into_iter()
            .map(|comm| {
                let mine = if comm.rank() == ROOT { global.take() } else { None };
                let (decomposition, topology) = (&decomposition, &topology);
                s.spawn(move || run_process(&comm, config, decomposition, topology, kernel, mine))
            })
            .collect();
        handles.into_iter().map(|h| h.join()).collect()
    });

    // A failing rank takes its peers down with `Disconnected`, so a panic
    // is reported first and then the first failure that is not a disconnect.
    if let Some(rank) = joined.iter().position(|j| j.is_err()) {
        return Err(DdsorError::ProcessPanicked { rank });
    }
    let mut outcomes = Vec::with_capacity(joined.len());
    let mut failures = Vec::new();
    for outcome in joined.into_iter().flatten() {
        match outcome {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => failures.push(e),
        }
    }
    let cause = failures
        .iter()
        .position(|e| !matches!(e, DdsorError::Comm(CommError::Disconnected { .. })))
        .unwrap_or(0);
    if cause < failures.len() {
        return Err(failures.swap_remove(cause));
    }

    let mut result = None;
    let mut timings = (0.0, 0.0);
    let mut processes = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        if outcome.summary.rank == ROOT {
            result = outcome.result;
            timings = outcome.timings;
        }
        processes.push(outcome.summary);
    }
    let result = result.ok_or_else(|| {
        DdsorError::Config("coordinator finished without a gathered grid".to_string())
    })?;
    let root = &processes[ROOT];

    Ok(SolveReport {
        config: *config,
        iterations: root.iterations,
        converged: root.converged,
        computation_time: timings.0,
        total_time: timings.1,
        result,
        processes,
    })
}
