use ddsor::cli::Args;
use ddsor::domain::GlobalGrid;
use ddsor::error::Result;
use ddsor::{init, output, solver};

fn run() -> Result<()> {
    let args = Args::cli_setup("ddsor")?;

    #[cfg(feature = "profile-with-puffin")]
    let _puffin_server = {
        let server_addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
        eprintln!("Run this to view profiling data:  puffin_viewer {server_addr}");
        let server = puffin_http::Server::new(&server_addr).map_err(|e| {
            ddsor::error::DdsorError::Config(format!("puffin server: {e}"))
        })?;
        profiling::puffin::set_scopes_on(true);
        server
    };

    let config = args.solver_config()?;
    // Reject the configuration before allocating the global grid.
    config.validate()?;

    let mut global = GlobalGrid::new(config.global);
    args.boundary().apply(&mut global, config.chunk_size);
    if let Some(max_val) = args.rand_init {
        init::rand(&mut global, max_val);
    }

    let report = solver::solve(&config, global)?;
    profiling::finish_frame!();

    if report.converged {
        tracing::info!(iterations = report.iterations, "converged");
    }
    println!("{}", output::summary_line(&report));

    if args.write_results {
        if let Some(path) = args.result_path(&config) {
            output::write_grid_file(&report.result, &path)?;
            tracing::info!(?path, "wrote results");
        }
    }
    if args.write_image {
        if let Some(path) = args.image_path(&config) {
            output::write_image(&report.result, &path)?;
            tracing::info!(?path, "wrote image");
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
