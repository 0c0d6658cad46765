use lu_solver::{
    lu_factor, lu_solve, solve, CpuDevice, DenseMatrix, LuCoreError, LuDecomposition,
    SolveAlgorithm,
};
use std::time::Instant;

/// Builds an n x n tridiagonal matrix with 4 on the diagonal and -1 beside it.
fn create_tridiagonal_matrix(n: usize) -> DenseMatrix<f64> {
    let mut a = DenseMatrix::zeros(n, n);
    for i in 0..n {
        a[(i, i)] = 4.0;
        if i >= 1 {
            a[(i, i - 1)] = -1.0;
        }
        if i + 1 < n {
            a[(i, i + 1)] = -1.0;
        }
    }
    a
}

fn main() -> Result<(), LuCoreError> {
    // Initialize logging based on RUST_LOG environment variable
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. One-shot solve
    let a = DenseMatrix::from_rows(&[[10.0_f64, -7.0, 1.0], [-3.0, 2.0, 6.0], [5.0, -1.0, 5.0]])?;
    let b = [8.0_f64, 4.0, 6.0];
    let x = solve(&a, &b)?;
    log::info!("A x = {:?} gives x = {:?}", b, x);

    // 2. Factor once, solve for two right-hand sides
    let a = DenseMatrix::from_rows(&[
        [2.0_f64, -3.0, 1.0, 3.0],
        [1.0, 4.0, -3.0, -3.0],
        [5.0, 3.0, -1.0, -1.0],
        [3.0, -6.0, -3.0, 1.0],
    ])?;
    let lu = lu_factor(a)?;
    log::info!("Pivot record: {:?}", lu.pivots());
    log::info!("Permutation: {:?}", lu.permutation());
    log::info!("Determinant: {}", lu.determinant());

    let b1 = [-4.0_f64, 1.0, 8.0, -5.0];
    let b2 = [-10.0_f64, 9.0, -3.0, -24.0];
    log::info!("x1 = {:?}", lu_solve(&lu, &b1)?);
    log::info!("x2 = {:?}", lu_solve(&lu, &b2)?);
    let both = lu_solve(&lu, &vec![b1.to_vec(), b2.to_vec()])?;
    log::info!("Batch solve: {:?}", both);

    // 3. A larger system through the algorithm interface
    let n = 200;
    let a = create_tridiagonal_matrix(n);
    let b: Vec<f64> = (0..n).map(|i| (i as f64 / n as f64).sin()).collect();

    log::info!("Running dense LU on a {}x{} tridiagonal system...", n, n);
    let start_time = Instant::now();
    let result = LuDecomposition::new().solve(&CpuDevice::new(), &a, &b)?;
    let duration = start_time.elapsed();

    log::info!("Solver finished successfully!");
    log::info!("  Row swaps: {}", result.metadata.row_swaps);
    log::info!("  Smallest pivot: {:.6e}", result.metadata.smallest_pivot);
    log::info!("  Residual norm: {:.6e}", result.metadata.residual_norm);
    log::info!("  Time elapsed: {:?}", duration);
    log::debug!("Solution vector x (first 10 elements): {:?}", &result.x[..10.min(n)]);

    // 4. A singular system
    let singular = DenseMatrix::from_rows(&[[1.0_f64, 2.0], [0.0, 0.0]])?;
    match solve(&singular, &[1.0, 2.0]) {
        Ok(x) => log::warn!("Unexpected solution for a singular system: {:?}", x),
        Err(e) => log::error!("Solver failed: {}", e),
    }

    Ok(())
}
