//! Forward and back substitution against an [`LuFactorization`].

use lu_core::{ensure_len, LuCoreError, Scalar};
use log::debug;

use super::factorization::LuFactorization;

/// A right-hand side accepted by [`LuFactorization::solve`]: either one
/// vector or a batch of vectors solved independently against the same
/// factorization.
///
/// The solution has the same shape as the input and keeps its order.
pub trait RightHandSide<T: Scalar> {
    type Solution;

    /// Checks every vector against the system dimension `n`.
    fn validate_len(&self, n: usize) -> Result<(), LuCoreError>;

    /// Solves against `lu`. Implementations validate before doing any work.
    fn solve_with(&self, lu: &LuFactorization<T>) -> Result<Self::Solution, LuCoreError>;
}

impl<T: Scalar> LuFactorization<T> {
    /// Solves `A x = b` for one vector or a batch of vectors.
    ///
    /// # Errors
    ///
    /// * `DimensionMismatch` if any right-hand side length differs from n.
    ///   Nothing is solved in that case, even for the well-formed vectors of a batch.
    /// * `InvalidInput` if a right-hand side holds NaN or infinite entries and
    ///   the factorization was built with `check_finite`. Checked up front as well.
    /// * `SingularMatrix` if back substitution meets a zero diagonal entry of U.
    pub fn solve<R>(&self, rhs: &R) -> Result<R::Solution, LuCoreError>
    where
        R: RightHandSide<T> + ?Sized,
    {
        rhs.solve_with(self)
    }

    /// Overwrites `x` (holding b on entry) with the solution.
    pub(crate) fn solve_in_place(&self, x: &mut [T]) -> Result<(), LuCoreError> {
        ensure_len(&*x, self.dim(), "Right-hand side")?;
        let n = self.dim();

        // Same swaps, same order as during elimination.
        for (k, &p) in self.pivots.iter().enumerate() {
            if p != k {
                x.swap(k, p);
            }
        }

        // Forward substitution: Ly = Pb, unit diagonal
        for i in 1..n {
            let row = &self.lu.row(i)[..i];
            let dot = row
                .iter()
                .zip(&x[..i])
                .fold(T::zero(), |acc, (&l, &y)| acc + l * y);
            x[i] = x[i] - dot;
        }

        // Backward substitution: Ux = y
        for i in (0..n).rev() {
            let row = self.lu.row(i);
            let dot = row[i + 1..]
                .iter()
                .zip(&x[i + 1..])
                .fold(T::zero(), |acc, (&u, &xj)| acc + u * xj);
            let u_ii = row[i];
            if u_ii.abs() <= self.pivot_tolerance {
                return Err(LuCoreError::SingularMatrix { index: i });
            }
            x[i] = (x[i] - dot) / u_ii;
        }

        Ok(())
    }

    fn check_rhs(&self, b: &[T]) -> Result<(), LuCoreError> {
        ensure_len(b, self.dim(), "Right-hand side")?;
        if self.check_finite && !b.iter().all(|v| v.is_finite()) {
            return Err(LuCoreError::InvalidInput(
                "Right-hand side contains NaN or infinite entries".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn solve_vector(&self, b: &[T]) -> Result<Vec<T>, LuCoreError> {
        self.check_rhs(b)?;
        let mut x = b.to_vec();
        self.solve_in_place(&mut x)?;
        Ok(x)
    }

    fn solve_batch<B: AsRef<[T]>>(&self, batch: &[B]) -> Result<Vec<Vec<T>>, LuCoreError> {
        for b in batch {
            self.check_rhs(b.as_ref())?;
        }
        let solutions = batch
            .iter()
            .map(|b| self.solve_vector(b.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "Solved {} right-hand sides against a {}x{} factorization",
            solutions.len(),
            self.dim(),
            self.dim()
        );
        Ok(solutions)
    }
}

// Impls are per concrete float type so the single-vector and batch forms can
// never overlap.
macro_rules! impl_right_hand_side {
    ($($t:ty),*) => {$(
        impl RightHandSide<$t> for [$t] {
            type Solution = Vec<$t>;

            fn validate_len(&self, n: usize) -> Result<(), LuCoreError> {
                ensure_len(self, n, "Right-hand side")
            }

            fn solve_with(&self, lu: &LuFactorization<$t>) -> Result<Vec<$t>, LuCoreError> {
                lu.solve_vector(self)
            }
        }

        impl RightHandSide<$t> for Vec<$t> {
            type Solution = Vec<$t>;

            fn validate_len(&self, n: usize) -> Result<(), LuCoreError> {
                self.as_slice().validate_len(n)
            }

            fn solve_with(&self, lu: &LuFactorization<$t>) -> Result<Vec<$t>, LuCoreError> {
                lu.solve_vector(self)
            }
        }

        impl<const N: usize> RightHandSide<$t> for [$t; N] {
            type Solution = Vec<$t>;

            fn validate_len(&self, n: usize) -> Result<(), LuCoreError> {
                self.as_slice().validate_len(n)
            }

            fn solve_with(&self, lu: &LuFactorization<$t>) -> Result<Vec<$t>, LuCoreError> {
                lu.solve_vector(self)
            }
        }

        impl RightHandSide<$t> for [Vec<$t>] {
            type Solution = Vec<Vec<$t>>;

            fn validate_len(&self, n: usize) -> Result<(), LuCoreError> {
                self.iter().try_for_each(|b| b.validate_len(n))
            }

            fn solve_with(&self, lu: &LuFactorization<$t>) -> Result<Vec<Vec<$t>>, LuCoreError> {
                lu.solve_batch(self)
            }
        }

        impl RightHandSide<$t> for Vec<Vec<$t>> {
            type Solution = Vec<Vec<$t>>;

            fn validate_len(&self, n: usize) -> Result<(), LuCoreError> {
                self.as_slice().validate_len(n)
            }

            fn solve_with(&self, lu: &LuFactorization<$t>) -> Result<Vec<Vec<$t>>, LuCoreError> {
                lu.solve_batch(self.as_slice())
            }
        }
    )*};
}

impl_right_hand_side!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{LuDecomposition, SingularityPolicy};
    use approx::assert_relative_eq;
    use lu_core::DenseMatrix;

    fn factor(rows: &[[f64; 3]]) -> LuFactorization<f64> {
        LuDecomposition::new()
            .factor(DenseMatrix::from_rows(rows).unwrap())
            .unwrap()
    }

    #[test]
    fn solves_single_vector_forms() {
        let lu = factor(&[[10.0, -7.0, 1.0], [-3.0, 2.0, 6.0], [5.0, -1.0, 5.0]]);
        let from_array = lu.solve(&[8.0, 4.0, 6.0]).unwrap();
        let from_vec = lu.solve(&vec![8.0, 4.0, 6.0]).unwrap();
        let from_slice = lu.solve([8.0, 4.0, 6.0].as_slice()).unwrap();
        for x in [from_array, from_vec, from_slice] {
            assert_relative_eq!(x[0], 0.0, epsilon = 1e-12);
            assert_relative_eq!(x[1], -1.0, epsilon = 1e-12);
            assert_relative_eq!(x[2], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn input_is_left_untouched() {
        let lu = factor(&[[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 2.0]]);
        let b = vec![1.0, 2.0, 4.0];
        let x = lu.solve(&b).unwrap();
        assert_eq!(b, vec![1.0, 2.0, 4.0]);
        assert_eq!(x, vec![2.0, 1.0, 2.0]);
    }

    #[test]
    fn batch_with_one_bad_vector_fails_whole_call() {
        let lu = factor(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        let batch = vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0]];
        assert!(matches!(
            lu.solve(&batch),
            Err(LuCoreError::DimensionMismatch(_))
        ));
        assert!(batch.validate_len(3).is_err());
        assert!(batch[..1].validate_len(3).is_ok());
    }

    #[test]
    fn zero_diagonal_is_reported_at_its_index() {
        let lu = factor(&[[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]);
        assert!(lu.is_singular());
        assert_eq!(
            lu.solve(&[1.0, 2.0, 3.0]),
            Err(LuCoreError::SingularMatrix { index: 1 })
        );
        assert!(lu.inverse().is_err());
    }

    #[test]
    fn f32_systems_solve_too() {
        let a = DenseMatrix::from_rows(&[[4.0_f32, 1.0], [1.0, 3.0]]).unwrap();
        let lu = LuDecomposition::new().factor(a).unwrap();
        let x = lu.solve(&[1.0_f32, 2.0]).unwrap();
        assert_relative_eq!(4.0 * x[0] + x[1], 1.0, epsilon = 1e-5);
        assert_relative_eq!(x[0] + 3.0 * x[1], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn non_finite_rhs_is_rejected_when_checking() {
        let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let lu = factor(&identity);
        assert!(matches!(
            lu.solve(&[f64::NAN, 1.0, 1.0]),
            Err(LuCoreError::InvalidInput(_))
        ));
        let batch = vec![vec![1.0, 2.0, 3.0], vec![1.0, f64::INFINITY, 3.0]];
        assert!(matches!(lu.solve(&batch), Err(LuCoreError::InvalidInput(_))));

        let unchecked = LuDecomposition::with_params(0.0, false, SingularityPolicy::Deferred)
            .factor(DenseMatrix::from_rows(&identity).unwrap())
            .unwrap();
        let x = unchecked.solve(&[f64::NAN, 1.0, 1.0]).unwrap();
        assert!(x[0].is_nan());
    }
}
