use lu_core::{Device, LuCoreError, Matrix, Scalar};
use num_traits::NumCast;

pub struct SolveResult<V: Scalar, M> {
    pub x: Vec<V>,   // Solution vector
    pub metadata: M, // Metadata about the solve process
}

// --- Algorithm Trait Definition ---
/// Trait representing a specific linear system solving algorithm.
/// Generic over the Device and Matrix type it supports.
pub trait SolveAlgorithm<D: Device, M: Matrix> {
    /// The numeric type the algorithm operates on (e.g., f32, f64).
    /// Must match the Matrix::Value type.
    type Value: Scalar;
    type Metadata: std::fmt::Debug;

    /// Solves the linear system Ax = b for x.
    ///
    /// # Arguments
    ///
    /// * `device` - The execution device.
    /// * `a` - The coefficient matrix A.
    /// * `b` - The right-hand side vector b.
    fn solve(
        &self,
        device: &D,
        a: &M,
        b: &[Self::Value],
    ) -> Result<SolveResult<Self::Value, Self::Metadata>, LuCoreError>;

    // Helper for input validation, can be called by implementations.
    fn validate_inputs(&self, a: &M, b: &[Self::Value]) -> Result<(), LuCoreError> {
        let (rows, cols) = a.dims();
        if !a.is_square() {
            return Err(LuCoreError::DimensionMismatch(format!(
                "Matrix A must be square (dims: {}x{})",
                rows, cols
            )));
        }
        if rows != b.len() {
            return Err(LuCoreError::DimensionMismatch(format!(
                "Matrix A rows ({}) must match RHS vector b length ({})",
                rows,
                b.len()
            )));
        }
        Ok(())
    }
}

// --- Algorithm Implementations ---

pub mod cpu_dense_lu; // CPU dense LU with partial pivoting
pub mod factorization; // Elimination and the factored form
pub mod substitution; // Forward/back substitution and right-hand sides

// --- Algorithm Struct Definitions ---

/// What to do when elimination meets a pivot at or below the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingularityPolicy {
    /// Finish the factorization; solving against it fails with `SingularMatrix`.
    #[default]
    Deferred,
    /// Fail the factorization at the first singular pivot.
    Eager,
}

/// LU decomposition with partial pivoting.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    /// Pivots with magnitude at or below this are treated as zero.
    pub pivot_tolerance: f64,
    /// Reject NaN and infinite entries before factoring.
    pub check_finite: bool,
    pub singularity: SingularityPolicy,
}

impl Default for LuDecomposition {
    fn default() -> Self {
        Self {
            pivot_tolerance: 0.0, // Exact zero only
            check_finite: true,
            singularity: SingularityPolicy::Deferred,
        }
    }
}

impl LuDecomposition {
    /// Creates a new instance of the LU algorithm with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new instance of the LU algorithm with specified parameters.
    pub fn with_params(
        pivot_tolerance: f64,
        check_finite: bool,
        singularity: SingularityPolicy,
    ) -> Self {
        Self {
            pivot_tolerance,
            check_finite,
            singularity,
        }
    }

    /// The pivot tolerance converted to the element type.
    pub(crate) fn tolerance<T: Scalar>(&self) -> Result<T, LuCoreError> {
        if !self.pivot_tolerance.is_finite() || self.pivot_tolerance < 0.0 {
            return Err(LuCoreError::InvalidInput(format!(
                "Pivot tolerance must be finite and non-negative, got {}",
                self.pivot_tolerance
            )));
        }
        <T as NumCast>::from(self.pivot_tolerance).ok_or_else(|| {
            LuCoreError::InvalidInput(format!(
                "Pivot tolerance {} is not representable in the element type",
                self.pivot_tolerance
            ))
        })
    }
}
