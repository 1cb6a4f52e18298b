use ddsor::decomposition::*;
use ddsor::domain::*;
use ddsor::solver::*;
use ddsor::stencil::Method;
use ddsor::topology::*;
use proptest::prelude::*;

proptest! {
    /// local * processes covers the axis, exactly when it divides evenly,
    /// and a rejected split is one where the padding would fill a block.
    #[test]
    fn axis_partition_covers_axis(global in 1usize..500, processes in 1usize..40) {
        let local = global.div_ceil(processes);
        match AxisPartition::new(0, global, processes) {
            Ok(a) => {
                prop_assert_eq!(a.local, local);
                prop_assert!(a.local * processes >= global);
                prop_assert_eq!(a.local * processes == global, global % processes == 0);
                prop_assert_eq!(a.padded, a.local * processes);
                prop_assert!(a.padding() < a.local);
            }
            Err(_) => prop_assert!(local * processes - global >= local),
        }
    }

    #[test]
    fn neighbor_symmetry(px in 1usize..8, py in 1usize..8) {
        let t = CartesianTopology::new([px, py], px * py).unwrap();
        for rank in 0..t.size() {
            let coords = t.coords_of(rank).unwrap();
            prop_assert_eq!(t.rank_of(coords), Some(rank));
            let n = t.neighbors(coords);
            if let Some(east) = n.east {
                prop_assert_eq!(t.neighbors(t.coords_of(east).unwrap()).west, Some(rank));
            }
            if let Some(south) = n.south {
                prop_assert_eq!(t.neighbors(t.coords_of(south).unwrap()).north, Some(rank));
            }
        }
        prop_assert_eq!(t.neighbors([0, 0]).north, None);
        prop_assert_eq!(t.neighbors([0, 0]).west, None);
        prop_assert_eq!(t.neighbors([px - 1, py - 1]).south, None);
        prop_assert_eq!(t.neighbors([px - 1, py - 1]).east, None);
    }

    /// Iteration ranges of all processes tile the updatable cells
    /// `1..X-1` x `1..Y-1` of the global grid exactly once.
    #[test]
    fn iteration_bounds_tile_the_interior(
        x in 3usize..40,
        y in 3usize..40,
        px in 1usize..6,
        py in 1usize..6,
    ) {
        let Ok(d) = Decomposition::new([x, y], [px, py]) else {
            return Ok(());
        };
        let t = CartesianTopology::new([px, py], px * py).unwrap();
        let mut hits = vec![0usize; x * y];
        for rank in 0..t.size() {
            let coords = t.coords_of(rank).unwrap();
            let origin = d.origin(coords);
            let b = d.iteration_bounds(&t, coords, &t.neighbors(coords));
            for i in b.rows() {
                for j in b.cols() {
                    let (gi, gj) = (origin[0] + i - 1, origin[1] + j - 1);
                    prop_assert!(gi < x && gj < y);
                    hits[gi * y + gj] += 1;
                }
            }
        }
        for gi in 0..x {
            for gj in 0..y {
                let interior = gi > 0 && gj > 0 && gi + 1 < x && gj + 1 < y;
                prop_assert_eq!(hits[gi * y + gj], interior as usize);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Scatter followed by gather with no update returns the input.
    #[test]
    fn scatter_gather_round_trip(
        x in 1usize..24,
        y in 1usize..24,
        px in 1usize..4,
        py in 1usize..4,
        seed in 0usize..1000,
    ) {
        let mut config = SolverConfig::new([x, y], [px, py], Method::Jacobi);
        config.max_iterations = 0;
        if config.validate().is_err() {
            return Ok(());
        }
        let mut global = GlobalGrid::new([x, y]);
        global.par_set_values(|[i, j]| ((i * 131 + j * 71 + seed) % 997) as f64 * 0.25, 16);

        let report = solve(&config, global.clone()).unwrap();
        prop_assert_eq!(report.result, global);
    }
}
