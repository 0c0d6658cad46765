use lu_core::{norm2, CpuDevice, DenseMatrix, LuCoreError, Matrix, Scalar};
use log::info;

use super::{
    factorization::LuFactorization, substitution::RightHandSide, LuDecomposition,
    SolveAlgorithm, SolveResult,
};

#[derive(Debug, Clone, Copy)]
pub struct LuDecompositionMetadata<T: Scalar> {
    /// Steps of the elimination that exchanged two rows.
    pub row_swaps: usize,
    /// Smallest |U[i][i]|; a rough hint at how close A is to singular.
    pub smallest_pivot: T,
    /// ||A x - b||_2 for the returned x.
    pub residual_norm: T,
}

impl<T: Scalar> SolveAlgorithm<CpuDevice, DenseMatrix<T>> for LuDecomposition {
    type Value = T;
    type Metadata = LuDecompositionMetadata<T>;

    fn solve(
        &self,
        _device: &CpuDevice,
        a: &DenseMatrix<T>,
        b: &[T],
    ) -> Result<SolveResult<Self::Value, Self::Metadata>, LuCoreError> {
        self.validate_inputs(a, b)?;

        let lu = self.factor(a.clone())?;
        let x = lu.solve_vector(b)?;

        let ax = a.matvec(&x)?;
        let residual: Vec<T> = ax.iter().zip(b).map(|(&l, &r)| l - r).collect();
        let metadata = LuDecompositionMetadata {
            row_swaps: lu.row_swaps(),
            smallest_pivot: lu.smallest_pivot(),
            residual_norm: norm2(&residual),
        };
        info!(
            "LU solve of {}x{} system: {} row swaps, smallest pivot {:?}, residual norm {:?}",
            a.rows(),
            a.cols(),
            metadata.row_swaps,
            metadata.smallest_pivot,
            metadata.residual_norm
        );

        Ok(SolveResult { x, metadata })
    }
}

impl LuDecomposition {
    /// Factors a copy of `matrix` and solves once against it.
    ///
    /// Right-hand side lengths are checked before the O(n^3) factorization runs.
    pub fn factor_and_solve<T, R>(
        &self,
        matrix: &DenseMatrix<T>,
        rhs: &R,
    ) -> Result<R::Solution, LuCoreError>
    where
        T: Scalar,
        R: RightHandSide<T> + ?Sized,
    {
        if !matrix.is_square() {
            return Err(LuCoreError::DimensionMismatch(format!(
                "Matrix must be square (dims: {}x{})",
                matrix.rows(),
                matrix.cols()
            )));
        }
        rhs.validate_len(matrix.rows())?;
        self.factor(matrix.clone())?.solve(rhs)
    }
}

/// Factors `matrix` in place with partial pivoting and default settings.
///
/// Never fails on singular input: the zero pivot surfaces when solving.
pub fn lu_factor<T: Scalar>(matrix: DenseMatrix<T>) -> Result<LuFactorization<T>, LuCoreError> {
    LuDecomposition::default().factor(matrix)
}

/// Solves against a previously computed factorization.
pub fn lu_solve<T, R>(factored: &LuFactorization<T>, rhs: &R) -> Result<R::Solution, LuCoreError>
where
    T: Scalar,
    R: RightHandSide<T> + ?Sized,
{
    factored.solve(rhs)
}

/// Factor-then-solve for callers that do not reuse the factorization.
pub fn solve<T, R>(matrix: &DenseMatrix<T>, rhs: &R) -> Result<R::Solution, LuCoreError>
where
    T: Scalar,
    R: RightHandSide<T> + ?Sized,
{
    LuDecomposition::default().factor_and_solve(matrix, rhs)
}
