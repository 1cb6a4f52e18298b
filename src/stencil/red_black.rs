use crate::decomposition::IterationBounds;
use crate::domain::*;
use crate::error::Result;
use crate::stencil::*;
use rayon::prelude::*;

/// Red cells are those where `(i + j + parity)` is even.
#[inline]
fn is_red(i: usize, j: usize, parity: usize) -> bool {
    (i + j + parity) % 2 == 0
}

/// SOR update of the red cells, reading only `prev`.
pub fn red_pass(
    prev: &LocalGrid,
    cur: &mut LocalGrid,
    bounds: &IterationBounds,
    omega: f64,
    parity: usize,
    chunk_size: usize,
) {
    profiling::scope!("red_pass");
    if bounds.is_empty() {
        return;
    }
    let width = cur.width();
    let per_task = rows_per_task(chunk_size, width);
    let (rows, cols) = (bounds.rows(), bounds.cols());
    let p = prev.buffer();

    cur.buffer_mut()
        .par_chunks_mut(width * per_task)
        .enumerate()
        .for_each(|(c, chunk)| {
            for (r, row) in chunk.chunks_mut(width).enumerate() {
                let i = c * per_task + r;
                if !rows.contains(&i) {
                    continue;
                }
                for j in cols.clone().filter(|j| is_red(i, *j, parity)) {
                    let l = i * width + j;
                    row[j] = p[l]
                        + (omega / 4.0)
                            * (p[l - width] + p[l + width] + p[l - 1] + p[l + 1] - 4.0 * p[l]);
                }
            }
        });
}

/// SOR update of the black cells. Every neighbor of a black cell is red
/// and this pass writes no red cell, so the neighbors are read from a
/// snapshot of `cur` taken once the red pass is done.
pub fn black_pass(
    prev: &LocalGrid,
    cur: &mut LocalGrid,
    bounds: &IterationBounds,
    omega: f64,
    parity: usize,
    chunk_size: usize,
) {
    profiling::scope!("black_pass");
    if bounds.is_empty() {
        return;
    }
    let width = cur.width();
    let per_task = rows_per_task(chunk_size, width);
    let (rows, cols) = (bounds.rows(), bounds.cols());
    let p = prev.buffer();
    let red = cur.buffer().to_vec();

    cur.buffer_mut()
        .par_chunks_mut(width * per_task)
        .enumerate()
        .for_each(|(c, chunk)| {
            for (r, row) in chunk.chunks_mut(width).enumerate() {
                let i = c * per_task + r;
                if !rows.contains(&i) {
                    continue;
                }
                for j in cols.clone().filter(|j| !is_red(i, *j, parity)) {
                    let l = i * width + j;
                    row[j] = p[l]
                        + (omega / 4.0)
                            * (red[l - width] + red[l + width] + red[l - 1] + red[l + 1]
                                - 4.0 * p[l]);
                }
            }
        });
}

/// Red then black, with the red values on the ghost border of `cur`
/// refreshed between the two passes.
pub struct RedBlackSor {
    omega: f64,
}

impl RedBlackSor {
    pub fn new(omega: f64) -> Self {
        RedBlackSor { omega }
    }
}

impl StencilKernel for RedBlackSor {
    fn method(&self) -> Method {
        Method::RedBlack
    }

    fn update(&self, ctx: &StepContext<'_>, buffers: &mut DoubleBuffer) -> Result<()> {
        {
            let (prev, cur) = buffers.split_mut();
            red_pass(prev, cur, &ctx.bounds, self.omega, ctx.parity, ctx.chunk_size);
        }
        ctx.halo.exchange(ctx.comm, buffers.current_mut())?;
        let (prev, cur) = buffers.split_mut();
        black_pass(prev, cur, &ctx.bounds, self.omega, ctx.parity, ctx.chunk_size);
        Ok(())
    }
}
