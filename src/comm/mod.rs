//! Point-to-point and collective messaging between subdomain processes.
//!
//! Provides a trait shaped after MPI's non-blocking interface
//! (post sends and receives, then wait) and an in-memory backend
//! where every process is an OS thread with its own mailbox.
//!
//! Messages between a given pair of ranks with the same tag are never
//! reordered. Receives match on `(source, tag)`; anything that arrives
//! early is held back until a matching receive is waited on.

mod thread_world;

pub use thread_world::*;

use crate::error::CommError;
use crate::topology::Direction;

/// Message classes. Each protocol step gets its own tag so that
/// halo traffic, pipeline traffic and collectives never match each other.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Tag {
    /// Boundary row or column travelling toward the given side.
    Halo(Direction),
    /// Freshly computed last interior row, sent to the south neighbor.
    PipelineRow,
    /// Freshly computed last interior cell of a row, sent to the east neighbor.
    PipelineCell,
    Scatter,
    Gather,
    Reduce,
    Broadcast,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReduceOp {
    Min,
    Max,
    Sum,
}

impl ReduceOp {
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            ReduceOp::Min => a.min(b),
            ReduceOp::Max => a.max(b),
            ReduceOp::Sum => a + b,
        }
    }
}

/// Handle for a posted send.
/// Payloads are copied when the send is posted, so the caller may reuse
/// its buffer immediately and the send is complete by construction.
#[derive(Debug)]
pub struct SendRequest {
    pub dest: usize,
    pub tag: Tag,
}

impl SendRequest {
    pub fn wait(self) {}
}

/// Handle for a posted receive of exactly `len` values.
#[derive(Debug)]
#[must_use = "a posted receive must be waited on"]
pub struct RecvRequest {
    pub source: usize,
    pub tag: Tag,
    pub len: usize,
}

pub const ROOT: usize = 0;

/// Abstraction over inter-process communication for the solver.
///
/// Implementations: `ThreadComm` (one thread per rank, channel mailboxes).
pub trait Communicator: Send {
    /// This process's rank.
    fn rank(&self) -> usize;

    /// Total number of ranks.
    fn size(&self) -> usize;

    /// Post a send of `data` to `dest`.
    fn isend(
        &self,
        dest: usize,
        tag: Tag,
        data: &[f64],
    ) -> Result<SendRequest, CommError>;

    /// Block until the message described by `request` has arrived.
    fn wait(&self, request: RecvRequest) -> Result<Vec<f64>, CommError>;

    /// Post a receive of `len` values from `source`.
    fn irecv(&self, source: usize, tag: Tag, len: usize) -> RecvRequest {
        RecvRequest { source, tag, len }
    }

    /// Wait on every request, returning payloads in request order.
    fn wait_all(
        &self,
        requests: Vec<RecvRequest>,
    ) -> Result<Vec<Vec<f64>>, CommError> {
        requests.into_iter().map(|r| self.wait(r)).collect()
    }

    /// Blocking receive straight into `buffer`.
    fn recv_into(
        &self,
        source: usize,
        tag: Tag,
        buffer: &mut [f64],
    ) -> Result<(), CommError> {
        let data = self.wait(self.irecv(source, tag, buffer.len()))?;
        buffer.copy_from_slice(&data);
        Ok(())
    }

    /// Combine one value from every rank, every rank gets the result.
    /// Reduces onto `ROOT`, which then broadcasts.
    fn all_reduce(&self, value: f64, op: ReduceOp) -> Result<f64, CommError> {
        if self.rank() == ROOT {
            let mut accumulator = value;
            for source in (0..self.size()).filter(|r| *r != ROOT) {
                let received = self.wait(self.irecv(source, Tag::Reduce, 1))?;
                accumulator = op.apply(accumulator, received[0]);
            }
            for dest in (0..self.size()).filter(|r| *r != ROOT) {
                self.isend(dest, Tag::Broadcast, &[accumulator])?;
            }
            Ok(accumulator)
        } else {
            self.isend(ROOT, Tag::Reduce, &[value])?;
            let received = self.wait(self.irecv(ROOT, Tag::Broadcast, 1))?;
            Ok(received[0])
        }
    }

    /// Logical AND across all ranks.
    fn all_reduce_and(&self, value: bool) -> Result<bool, CommError> {
        let local = if value { 1.0 } else { 0.0 };
        Ok(self.all_reduce(local, ReduceOp::Min)? > 0.5)
    }

    /// No rank leaves until every rank has arrived.
    fn barrier(&self) -> Result<(), CommError> {
        self.all_reduce(0.0, ReduceOp::Max).map(|_| ())
    }
}
