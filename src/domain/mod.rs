//! Grid storage.
//!
//! `GlobalGrid` is the whole (padded) problem, held only by the
//! coordinating rank before scatter and after gather.
//! `LocalGrid` is one process's block plus a one cell ghost border,
//! and `DoubleBuffer` pairs two of them as previous / current iterate.

mod buffers;
mod global;
mod local;

pub use buffers::*;
pub use global::*;
pub use local::*;
