pub mod cli;
pub mod comm;
pub mod convergence;
pub mod decomposition;
pub mod domain;
pub mod error;
pub mod halo;
pub mod init;
pub mod output;
pub mod solver;
pub mod stencil;
pub mod topology;
pub mod transport;
pub mod util;
