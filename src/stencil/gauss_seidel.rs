use crate::decomposition::IterationBounds;
use crate::domain::*;
use crate::error::Result;
use crate::stencil::*;
use std::ops::Range;

/// One row of the row-major SOR sweep. North and west neighbors come from
/// `cur` (already updated this sweep), south, east and center from `prev`.
#[inline]
pub fn gauss_seidel_row(
    prev: &LocalGrid,
    cur: &mut LocalGrid,
    i: usize,
    cols: Range<usize>,
    omega: f64,
) {
    for j in cols {
        let center = prev[(i, j)];
        cur[(i, j)] = center
            + (cur[(i - 1, j)] + prev[(i + 1, j)] + cur[(i, j - 1)] + prev[(i, j + 1)]
                - 4.0 * center)
                * omega
                / 4.0;
    }
}

pub fn gauss_seidel_sweep(
    prev: &LocalGrid,
    cur: &mut LocalGrid,
    bounds: &IterationBounds,
    omega: f64,
) {
    profiling::scope!("gauss_seidel_sweep");
    for i in bounds.rows() {
        gauss_seidel_row(prev, cur, i, bounds.cols(), omega);
    }
}

/// Gauss-Seidel SOR over the local block. The ghost border of `cur` is
/// taken from the freshly exchanged `prev`, so across process borders the
/// update sees the neighbors' previous iterate.
pub struct GaussSeidelSor {
    omega: f64,
}

impl GaussSeidelSor {
    pub fn new(omega: f64) -> Self {
        GaussSeidelSor { omega }
    }
}

impl StencilKernel for GaussSeidelSor {
    fn method(&self) -> Method {
        Method::GaussSeidel
    }

    fn update(&self, ctx: &StepContext<'_>, buffers: &mut DoubleBuffer) -> Result<()> {
        buffers.copy_ghosts_to_current();
        let (prev, cur) = buffers.split_mut();
        gauss_seidel_sweep(prev, cur, &ctx.bounds, self.omega);
        Ok(())
    }
}
