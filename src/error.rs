use crate::comm::Tag;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommError {
    #[error("rank {peer} is no longer reachable")]
    Disconnected { peer: usize },

    #[error("message from rank {peer} tagged {tag:?}: expected {expected} values, got {actual}")]
    SizeMismatch {
        peer: usize,
        tag: Tag,
        expected: usize,
        actual: usize,
    },

    #[error("rank {rank} is outside a world of {size}")]
    InvalidRank { rank: usize, size: usize },
}

#[derive(Debug, Error)]
pub enum DdsorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("decomposition error on axis {axis}: {reason}")]
    Decomposition { axis: usize, reason: String },

    #[error("communication error: {0}")]
    Comm(#[from] CommError),

    #[error("process {rank} panicked")]
    ProcessPanicked { rank: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, DdsorError>;
