use crate::convergence::ConvergenceCheck;
use crate::error::{DdsorError, Result};
use crate::init::BoundaryValues;
use crate::output::result_file_name;
use crate::solver::SolverConfig;
use crate::stencil::Method;
use clap::Parser;
use std::path::PathBuf;

/// Distributed 2D Laplace solver.
///
/// Splits an X x Y grid over a Px x Py grid of processes (one thread each)
/// and iterates the chosen 5-point kernel with halo exchange.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Global rows.
    #[arg(required_unless_present = "build_info")]
    pub x: Option<usize>,

    /// Global columns.
    #[arg(required_unless_present = "build_info")]
    pub y: Option<usize>,

    /// Processes along the rows.
    #[arg(required_unless_present = "build_info")]
    pub px: Option<usize>,

    /// Processes along the columns.
    #[arg(required_unless_present = "build_info")]
    pub py: Option<usize>,

    /// Interior update kernel.
    #[arg(short, long, default_value = "jacobi")]
    pub method: Method,

    /// Iteration count, or the cap when convergence testing is on.
    #[arg(short = 'n', long, default_value = "256")]
    pub max_iterations: usize,

    /// Test for convergence every this many iterations.
    #[arg(long)]
    pub check_period: Option<usize>,

    /// Largest per-cell change still counted as converged.
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Chunk size to use for parallelism inside a process.
    #[arg(short, long, default_value = "1024")]
    pub chunk_size: usize,

    /// Threads in the shared rayon pool.
    #[arg(short, long, default_value = "8")]
    pub threads: usize,

    #[arg(long, default_value = "100", allow_negative_numbers = true)]
    pub north: f64,

    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub south: f64,

    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub east: f64,

    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub west: f64,

    /// Initial value of every non-boundary cell.
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub interior: f64,

    /// Fill the interior with random integers below this value instead.
    #[arg(short, long)]
    pub rand_init: Option<i32>,

    /// Directory for output files, created if missing.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Dump the final grid as text.
    #[arg(short, long, requires("output_dir"))]
    pub write_results: bool,

    /// Write the final grid as a heat map PNG.
    #[arg(short = 'i', long, requires("output_dir"))]
    pub write_image: bool,

    /// Print build information and quit
    #[arg(long)]
    pub build_info: bool,
}

pub fn build_report(name: &str) -> String {
    format!(
        "{{\n  \"name\": \"{}\",\n  \"version\": \"{}\",\n  \"git_describe\": \"{}\",\n  \"git_hash\": \"{}\"\n}}",
        name,
        env!("CARGO_PKG_VERSION"),
        env!("GIT_DESCRIBE"),
        env!("GIT_HASH")
    )
}

impl Args {
    /// Parse the command line, handle `--build-info`, prepare the output
    /// directory and the global rayon pool.
    pub fn cli_setup(name: &str) -> Result<Self> {
        let args = Args::parse();

        if args.build_info {
            println!("{}", build_report(name));
            std::process::exit(0);
        }

        if let Some(output_dir) = &args.output_dir {
            std::fs::create_dir_all(output_dir)?;
        }

        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .thread_name(|i| format!("rayon_thread_{}", i))
            .build_global()
            .map_err(|e| DdsorError::Config(format!("rayon pool: {}", e)))?;

        Ok(args)
    }

    fn dimensions(&self) -> Result<[usize; 4]> {
        match (self.x, self.y, self.px, self.py) {
            (Some(x), Some(y), Some(px), Some(py)) => Ok([x, y, px, py]),
            _ => Err(DdsorError::Config(
                "expected four arguments: X Y Px Py".to_string(),
            )),
        }
    }

    pub fn solver_config(&self) -> Result<SolverConfig> {
        let [x, y, px, py] = self.dimensions()?;
        let mut config = SolverConfig::new([x, y], [px, py], self.method);
        config.max_iterations = self.max_iterations;
        config.chunk_size = self.chunk_size;
        config.convergence = self
            .check_period
            .map(|period| ConvergenceCheck::new(period, self.tolerance));
        Ok(config)
    }

    pub fn boundary(&self) -> BoundaryValues {
        BoundaryValues {
            north: self.north,
            south: self.south,
            east: self.east,
            west: self.west,
            interior: self.interior,
        }
    }

    pub fn result_path(&self, config: &SolverConfig) -> Option<PathBuf> {
        let mut result = self.output_dir.as_ref()?.clone();
        result.push(result_file_name(config));
        Some(result)
    }

    pub fn image_path(&self, config: &SolverConfig) -> Option<PathBuf> {
        let mut result = self.output_dir.as_ref()?.clone();
        result.push(format!("{}.png", result_file_name(config)));
        Some(result)
    }
}
