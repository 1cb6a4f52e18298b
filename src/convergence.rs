//! Convergence detection.
//!
//! Each process compares its two iterates over the cells it updates;
//! the run has converged only once every process agrees.

use crate::comm::Communicator;
use crate::decomposition::IterationBounds;
use crate::domain::*;
use crate::error::Result;
use rayon::prelude::*;

/// Largest absolute change between `prev` and `cur` inside `bounds`.
pub fn max_change(prev: &LocalGrid, cur: &LocalGrid, bounds: &IterationBounds) -> f64 {
    profiling::scope!("max_change");
    let cols = bounds.cols();
    bounds
        .rows()
        .into_par_iter()
        .map(|i| {
            let (p, c) = (&prev.row(i)[cols.clone()], &cur.row(i)[cols.clone()]);
            p.iter()
                .zip(c)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max)
        })
        .reduce(|| 0.0, f64::max)
}

/// True on every rank iff `local` is true on every rank.
pub fn globally_converged<C: Communicator + ?Sized>(comm: &C, local: bool) -> Result<bool> {
    Ok(comm.all_reduce_and(local)?)
}

/// Convergence test run every `period` iterations, starting with the first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConvergenceCheck {
    pub period: usize,
    pub tolerance: f64,
}

impl ConvergenceCheck {
    pub fn new(period: usize, tolerance: f64) -> Self {
        ConvergenceCheck {
            period: period.max(1),
            tolerance,
        }
    }

    /// Whether iteration `t` (counting from zero) runs the test.
    pub fn due(&self, t: usize) -> bool {
        t % self.period == 0
    }

    pub fn locally_converged(&self, buffers: &DoubleBuffer, bounds: &IterationBounds) -> bool {
        max_change(buffers.previous(), buffers.current(), bounds) <= self.tolerance
    }

    /// Local test followed by the global reduction. Every rank must call
    /// this on the same iterations.
    pub fn test<C: Communicator + ?Sized>(
        &self,
        comm: &C,
        buffers: &DoubleBuffer,
        bounds: &IterationBounds,
    ) -> Result<bool> {
        let local = self.locally_converged(buffers, bounds);
        if local {
            tracing::debug!(rank = comm.rank(), "locally converged");
        }
        globally_converged(comm, local)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::comm::ThreadWorld;

    #[test]
    fn max_change_inside_bounds_only() {
        let mut buffers = DoubleBuffer::new([3, 3]);
        buffers.current_mut()[(2, 2)] = 0.5;
        buffers.current_mut()[(1, 1)] = 9.0;
        let bounds = IterationBounds {
            i_min: 2,
            i_max: 4,
            j_min: 2,
            j_max: 4,
        };
        assert_eq!(max_change(buffers.previous(), buffers.current(), &bounds), 0.5);

        let check = ConvergenceCheck::new(3, 0.5);
        assert!(check.locally_converged(&buffers, &bounds));
        assert!(!ConvergenceCheck::new(3, 0.4).locally_converged(&buffers, &bounds));
        assert!(check.due(0));
        assert!(!check.due(2));
        assert!(check.due(6));
    }

    #[test]
    fn empty_bounds_are_converged() {
        let buffers = DoubleBuffer::new([1, 1]);
        let bounds = IterationBounds {
            i_min: 2,
            i_max: 1,
            j_min: 2,
            j_max: 1,
        };
        assert!(ConvergenceCheck::new(1, 0.0).locally_converged(&buffers, &bounds));
    }

    #[test]
    fn global_flag_waits_for_slowest_rank() {
        // rank 0 is converged from the start, rank 1 only from iteration K
        const K: usize = 7;
        let world = ThreadWorld::create(2);
        let firsts: Vec<Option<usize>> = std::thread::scope(|s| {
            let handles: Vec<_> = world
                .into_iter()
                .map(|comm| {
                    s.spawn(move || {
                        for t in 0..20 {
                            let local = comm.rank() == 0 || t >= K;
                            if globally_converged(&comm, local).unwrap() {
                                return Some(t);
                            }
                        }
                        None
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(firsts, vec![Some(K), Some(K)]);
    }
}
