//! `lu-solver`: dense LU decomposition with partial pivoting.
//!
//! Solves systems of linear equations of the form Ax = b for one or many
//! right-hand sides, either in one call ([`solve`]) or by factoring once
//! ([`lu_factor`]) and solving repeatedly ([`lu_solve`]).
//!
//! ```
//! use lu_solver::{lu_factor, lu_solve, DenseMatrix};
//!
//! let a = DenseMatrix::from_rows(&[[10.0_f64, -7.0, 1.0], [-3.0, 2.0, 6.0], [5.0, -1.0, 5.0]])?;
//! let lu = lu_factor(a)?;
//! let x = lu_solve(&lu, &[8.0, 4.0, 6.0])?;
//! assert!((x[1] + 1.0).abs() < 1e-12);
//! # Ok::<(), lu_solver::LuCoreError>(())
//! ```

pub mod algorithms;

pub use algorithms::{
    cpu_dense_lu::{lu_factor, lu_solve, solve, LuDecompositionMetadata},
    factorization::{LuFactorization, LuFactorizationParts},
    substitution::RightHandSide,
    LuDecomposition, SingularityPolicy, SolveAlgorithm, SolveResult,
};

// Re-export from lu_core
pub use lu_core::{CpuDevice, DenseMatrix, Device, LuCoreError, Matrix, Scalar, Vector};
