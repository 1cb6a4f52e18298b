use crate::decomposition::IterationBounds;
use crate::domain::*;
use crate::error::Result;
use crate::stencil::*;
use rayon::prelude::*;

/// `cur[i][j] = (prev[i-1][j] + prev[i+1][j] + prev[i][j-1] + prev[i][j+1]) / 4`.
/// Reads only `prev`, so rows are updated in parallel.
pub fn jacobi_sweep(
    prev: &LocalGrid,
    cur: &mut LocalGrid,
    bounds: &IterationBounds,
    chunk_size: usize,
) {
    profiling::scope!("jacobi_sweep");
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
                for j in cols.clone() {
                    let l = i * width + j;
                    row[j] = (p[l - width] + p[l + width] + p[l - 1] + p[l + 1]) / 4.0;
                }
            }
        });
}

pub struct Jacobi;

impl StencilKernel for Jacobi {
    fn method(&self) -> Method {
        Method::Jacobi
    }

    fn update(&self, ctx: &StepContext<'_>, buffers: &mut DoubleBuffer) -> Result<()> {
        let (prev, cur) = buffers.split_mut();
        jacobi_sweep(prev, cur, &ctx.bounds, ctx.chunk_size);
        Ok(())
    }
}
