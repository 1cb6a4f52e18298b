use crate::comm::Tag;
use crate::domain::*;
use crate::error::Result;
use crate::stencil::*;
use crate::topology::Direction;

/// Gauss-Seidel SOR where the sweep is pipelined across processes.
///
/// Before its first row a process blocks on the north neighbor's freshly
/// computed last row, and before each row on the west neighbor's freshly
/// computed last cell of that row. As soon as it finishes a row it sends
/// that row's last cell east, and after its last row it sends that row
/// south. The producer of every value is ahead of its consumer in the
/// global row-major order, so the result is identical to one sweep over
/// the undecomposed grid.
///
/// Sends and receives happen once per row whether or not the row has any
/// cells to update, so neighbors always agree on the message count.
pub struct PipelinedGaussSeidelSor {
    omega: f64,
}

impl PipelinedGaussSeidelSor {
    pub fn new(omega: f64) -> Self {
        PipelinedGaussSeidelSor { omega }
    }
}

impl StencilKernel for PipelinedGaussSeidelSor {
    fn method(&self) -> Method {
        Method::Pipelined
    }

    fn update(&self, ctx: &StepContext<'_>, buffers: &mut DoubleBuffer) -> Result<()> {
        profiling::scope!("pipelined_gauss_seidel");
        let neighbors = ctx.halo.neighbors();
        let (prev, cur) = buffers.split_mut();

        if let Some(north) = neighbors.north {
            let ghost = cur.ghost(Direction::North);
            let row = ctx
                .comm
                .wait(ctx.comm.irecv(north, Tag::PipelineRow, ghost.buffer_size()))?;
            cur.unpack(&ghost, &row);
        }

        let last_column = cur.cols();
        for i in ctx.bounds.rows() {
            if let Some(west) = neighbors.west {
                let mut cell = [0.0];
                ctx.comm.recv_into(west, Tag::PipelineCell, &mut cell)?;
                cur[(i, 0)] = cell[0];
            }

            gauss_seidel_row(prev, cur, i, ctx.bounds.cols(), self.omega);

            if let Some(east) = neighbors.east {
                ctx.comm
                    .isend(east, Tag::PipelineCell, &[cur[(i, last_column)]])?
                    .wait();
            }
        }

        if let Some(south) = neighbors.south {
            let edge = cur.pack(&cur.edge(Direction::South));
            ctx.comm.isend(south, Tag::PipelineRow, &edge)?.wait();
        }
        Ok(())
    }
}
