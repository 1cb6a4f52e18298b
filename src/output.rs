//! Result files and the coordinator's summary line.

use crate::domain::GlobalGrid;
use crate::error::Result;
use crate::solver::{SolveReport, SolverConfig};
use std::io::Write;

/// `res<Kernel>MPI_<X>x<Y>_<Px>x<Py>`, the historical naming scheme.
pub fn result_file_name(config: &SolverConfig) -> String {
    format!(
        "res{}MPI_{}x{}_{}x{}",
        config.method.label(),
        config.global[0],
        config.global[1],
        config.grid[0],
        config.grid[1]
    )
}

/// One grid row per line, space separated.
pub fn write_grid<W: Write>(grid: &GlobalGrid, writer: &mut W) -> std::io::Result<()> {
    for i in 0..grid.extent()[0] {
        let row = grid.row(i);
        for (j, v) in row.iter().enumerate() {
            if j > 0 {
                write!(writer, " ")?;
            }
            write!(writer, "{:.6}", v)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn write_grid_file<P: AsRef<std::path::Path>>(grid: &GlobalGrid, path: &P) -> Result<()> {
    profiling::scope!("write_grid_file");
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_grid(grid, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Heat map of the grid, row `i` is image line `i`.
/// Values are scaled to the grid's own range before coloring.
pub fn write_image<P: AsRef<std::path::Path>>(grid: &GlobalGrid, path: &P) -> Result<()> {
    profiling::scope!("write_image");
    let [rows, cols] = grid.extent();
    let (lo, hi) = (0..rows)
        .flat_map(|i| grid.row(i).iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let span = if hi > lo { hi - lo } else { 1.0 };

    let gradient = colorous::TURBO;
    let mut img = image::RgbImage::new(cols as u32, rows as u32);
    for i in 0..rows {
        for (j, v) in grid.row(i).iter().enumerate() {
            let c = gradient.eval_continuous((v - lo) / span);
            img.put_pixel(j as u32, i as u32, image::Rgb(c.as_array()));
        }
    }
    img.save(path)?;
    Ok(())
}

/// `<Kernel> X <x> Y <y> Px <px> Py <py> Iter <t> ComputationTime <s>
/// TotalTime <s> midpoint <v>`
pub fn summary_line(report: &SolveReport) -> String {
    let config = &report.config;
    format!(
        "{} X {} Y {} Px {} Py {} Iter {} ComputationTime {:.6} TotalTime {:.6} midpoint {:.6}",
        config.method.label(),
        config.global[0],
        config.global[1],
        config.grid[0],
        config.grid[1],
        report.iterations,
        report.computation_time,
        report.total_time,
        report.result.midpoint()
    )
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::stencil::Method;

    #[test]
    fn file_name_test() {
        let config = SolverConfig::new([64, 32], [4, 2], Method::RedBlack);
        assert_eq!(result_file_name(&config), "resRedBlackSORMPI_64x32_4x2");
        let config = SolverConfig::new([8, 8], [1, 1], Method::Jacobi);
        assert_eq!(result_file_name(&config), "resJacobiMPI_8x8_1x1");
    }

    #[test]
    fn grid_dump_skips_padding() {
        let mut g = GlobalGrid::with_padding([2, 3], [4, 4]);
        g.par_set_values(|c| c[0] as f64 + c[1] as f64 / 4.0, 5);
        g.set(0, 3, 99.0);
        let mut out = Vec::new();
        write_grid(&g, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0.000000 0.250000 0.500000\n1.000000 1.250000 1.500000\n"
        );
    }

    #[test]
    fn summary_line_test() {
        let mut config = SolverConfig::new([4, 4], [1, 1], Method::Jacobi);
        config.max_iterations = 0;
        let mut g = GlobalGrid::new([4, 4]);
        g.set(2, 2, 1.5);
        let report = crate::solver::solve(&config, g).unwrap();
        let line = summary_line(&report);
        assert!(line.starts_with("Jacobi X 4 Y 4 Px 1 Py 1 Iter 0 ComputationTime "));
        assert!(line.ends_with("midpoint 1.500000"));
    }
}
