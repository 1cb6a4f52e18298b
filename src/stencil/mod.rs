//! 5-point stencil update strategies.
//!
//! Every kernel writes only the interior cells inside the process's
//! `IterationBounds` and reads the four axis neighbors plus, for the SOR
//! variants, the center of the previous iterate.
//! The solver exchanges the ghost border of the previous iterate before
//! calling `StencilKernel::update`; anything else a kernel needs from its
//! neighbors it fetches itself through `StepContext`.

mod gauss_seidel;
mod jacobi;
mod method;
mod pipelined;
mod red_black;

pub use gauss_seidel::*;
pub use jacobi::*;
pub use method::*;
pub use pipelined::*;
pub use red_black::*;

use crate::comm::Communicator;
use crate::decomposition::IterationBounds;
use crate::domain::DoubleBuffer;
use crate::error::Result;
use crate::halo::HaloExchange;

/// Relaxation factor from the spectral radius estimate of the Jacobi
/// iteration on an `n` point leading axis, `2 / (1 + sin(pi / n))`.
pub fn sor_omega(n: usize) -> f64 {
    2.0 / (1.0 + (std::f64::consts::PI / n as f64).sin())
}

/// Everything a kernel may need besides the buffers it updates.
pub struct StepContext<'a> {
    pub comm: &'a dyn Communicator,
    pub halo: &'a HaloExchange,
    pub bounds: IterationBounds,
    /// Parity of the global coordinate of local cell `(1, 1)`.
    pub parity: usize,
    pub chunk_size: usize,
}

pub trait StencilKernel: Send + Sync {
    fn method(&self) -> Method;

    /// Compute `buffers.current()` from `buffers.previous()`.
    fn update(&self, ctx: &StepContext<'_>, buffers: &mut DoubleBuffer) -> Result<()>;
}

pub fn kernel_for(method: Method, omega: f64) -> Box<dyn StencilKernel> {
    match method {
        Method::Jacobi => Box::new(Jacobi),
        Method::GaussSeidel => Box::new(GaussSeidelSor::new(omega)),
        Method::RedBlack => Box::new(RedBlackSor::new(omega)),
        Method::Pipelined => Box::new(PipelinedGaussSeidelSor::new(omega)),
    }
}

/// Whole rows handed to one rayon task for a buffer `width` values wide.
pub(crate) fn rows_per_task(chunk_size: usize, width: usize) -> usize {
    (chunk_size / width.max(1)).max(1)
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn omega_range() {
        let w = sor_omega(100);
        assert!(w > 1.0 && w < 2.0);
        assert_approx_eq!(f64, sor_omega(2), 1.0, epsilon = 1e-12);
        assert!(sor_omega(1000) > sor_omega(10));
    }

    #[test]
    fn kernel_selection() {
        for method in [
            Method::Jacobi,
            Method::GaussSeidel,
            Method::RedBlack,
            Method::Pipelined,
        ] {
            assert_eq!(kernel_for(method, 1.5).method(), method);
        }
    }

    #[test]
    fn rows_per_task_test() {
        assert_eq!(rows_per_task(1000, 10), 100);
        assert_eq!(rows_per_task(5, 10), 1);
    }
}
