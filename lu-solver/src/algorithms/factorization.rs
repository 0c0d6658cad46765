//! LU factorization with partial pivoting.
//!
//! The factored form packs both triangles into one n x n buffer: the strict
//! lower triangle holds the multipliers of L (whose unit diagonal is not
//! stored) and the upper triangle, diagonal included, holds U. Together with
//! the pivot record it satisfies `P * A = L * U`.

use lu_core::{DenseMatrix, LuCoreError, Matrix, Scalar};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use super::{LuDecomposition, SingularityPolicy};

/// The result of an LU factorization: merged L/U factors and pivot record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LuFactorizationParts<T>")]
pub struct LuFactorization<T: Scalar> {
    /// Combined L and U matrices (L is unit lower triangular, stored below diagonal)
    pub(crate) lu: DenseMatrix<T>,
    /// `pivots[k]` is the row swapped into position `k` at step `k`.
    pub(crate) pivots: Vec<usize>,
    /// Diagonal entries of U at or below this magnitude count as zero.
    pub(crate) pivot_tolerance: T,
    /// Reject right-hand sides holding NaN or infinite entries.
    pub(crate) check_finite: bool,
}

/// The pieces of an [`LuFactorization`], as returned by
/// [`LuFactorization::into_parts`]. Converting back with `try_from`
/// re-validates the pivot record and tolerance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LuFactorizationParts<T: Scalar> {
    pub lu: DenseMatrix<T>,
    pub pivots: Vec<usize>,
    pub pivot_tolerance: T,
    #[serde(default = "default_check_finite")]
    pub check_finite: bool,
}

fn default_check_finite() -> bool {
    true
}

impl<T: Scalar> TryFrom<LuFactorizationParts<T>> for LuFactorization<T> {
    type Error = LuCoreError;

    fn try_from(parts: LuFactorizationParts<T>) -> Result<Self, Self::Error> {
        let mut factorization = Self::from_parts(parts.lu, parts.pivots)?;
        if !parts.pivot_tolerance.is_finite() || parts.pivot_tolerance < T::zero() {
            return Err(LuCoreError::InvalidInput(format!(
                "Pivot tolerance must be finite and non-negative, got {:?}",
                parts.pivot_tolerance
            )));
        }
        factorization.pivot_tolerance = parts.pivot_tolerance;
        factorization.check_finite = parts.check_finite;
        Ok(factorization)
    }
}

impl LuDecomposition {
    /// Factors `matrix` in place, consuming it; its buffer becomes the
    /// merged L/U factors. Clone the matrix first to keep the original.
    ///
    /// # Errors
    ///
    /// * `DimensionMismatch` if the matrix is empty or not square.
    /// * `InvalidInput` if `check_finite` is set and an entry is NaN or infinite,
    ///   or if the pivot tolerance is negative.
    /// * `SingularMatrix` only under [`SingularityPolicy::Eager`].
    pub fn factor<T: Scalar>(
        &self,
        mut matrix: DenseMatrix<T>,
    ) -> Result<LuFactorization<T>, LuCoreError> {
        let (rows, cols) = matrix.dims();
        if rows != cols {
            return Err(LuCoreError::DimensionMismatch(format!(
                "Matrix must be square (dims: {}x{})",
                rows, cols
            )));
        }
        if rows == 0 {
            return Err(LuCoreError::DimensionMismatch(
                "Cannot factor an empty matrix".to_string(),
            ));
        }
        if self.check_finite && !matrix.is_finite() {
            return Err(LuCoreError::InvalidInput(
                "Matrix contains NaN or infinite entries".to_string(),
            ));
        }
        let tolerance = self.tolerance::<T>()?;

        let n = rows;
        let mut pivots = Vec::with_capacity(n);
        let mut singular_pivots = 0usize;

        for k in 0..n {
            // Largest magnitude in column k at or below the diagonal, lowest row wins ties.
            let mut pivot_row = k;
            let mut pivot_abs = matrix[(k, k)].abs();
            for i in (k + 1)..n {
                let candidate = matrix[(i, k)].abs();
                if candidate > pivot_abs {
                    pivot_abs = candidate;
                    pivot_row = i;
                }
            }
            trace!("LU step {}: pivot row {} (|pivot| = {:?})", k, pivot_row, pivot_abs);

            matrix.swap_rows(k, pivot_row);
            pivots.push(pivot_row);

            if pivot_abs <= tolerance {
                if self.singularity == SingularityPolicy::Eager {
                    return Err(LuCoreError::SingularMatrix { index: k });
                }
                warn!(
                    "LU step {}: pivot {:?} is at or below tolerance {:?}, matrix is singular to working precision",
                    k, pivot_abs, tolerance
                );
                singular_pivots += 1;
                if pivot_abs == T::zero() {
                    // Column is already zero below the diagonal.
                    continue;
                }
            }

            let pivot = matrix[(k, k)];
            for i in (k + 1)..n {
                let mult = matrix[(i, k)] / pivot;
                matrix[(i, k)] = mult; // Store multiplier in L part
                if mult == T::zero() {
                    continue;
                }
                for j in (k + 1)..n {
                    let update = mult * matrix[(k, j)];
                    matrix[(i, j)] = matrix[(i, j)] - update;
                }
            }
        }

        let factorization = LuFactorization {
            lu: matrix,
            pivots,
            pivot_tolerance: tolerance,
            check_finite: self.check_finite,
        };
        debug!(
            "LU factorization of {}x{} matrix done: {} row swaps, {} singular pivots",
            n,
            n,
            factorization.row_swaps(),
            singular_pivots
        );
        Ok(factorization)
    }
}

impl<T: Scalar> LuFactorization<T> {
    /// Rebuilds a factorization from a merged L/U buffer and its pivot record,
    /// e.g. ones stored separately. Uses an exact-zero pivot tolerance and
    /// rejects non-finite right-hand sides; go through
    /// [`LuFactorizationParts`] to restore other settings.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `lu` is empty or not square, if `pivots` does not
    /// have one entry per row, or if some `pivots[k]` lies outside `k..n`.
    pub fn from_parts(lu: DenseMatrix<T>, pivots: Vec<usize>) -> Result<Self, LuCoreError> {
        let (rows, cols) = lu.dims();
        if rows != cols || rows == 0 {
            return Err(LuCoreError::DimensionMismatch(format!(
                "Factored matrix must be square and non-empty (dims: {}x{})",
                rows, cols
            )));
        }
        if pivots.len() != rows {
            return Err(LuCoreError::DimensionMismatch(format!(
                "Pivot record length ({}) must match matrix dimension ({})",
                pivots.len(),
                rows
            )));
        }
        if let Some((k, &p)) = pivots
            .iter()
            .enumerate()
            .find(|&(k, &p)| p < k || p >= rows)
        {
            return Err(LuCoreError::DimensionMismatch(format!(
                "Pivot record entry {} is {}, expected a row in {}..{}",
                k, p, k, rows
            )));
        }
        Ok(Self {
            lu,
            pivots,
            pivot_tolerance: T::zero(),
            check_finite: true,
        })
    }

    /// Matrix dimension n.
    pub fn dim(&self) -> usize {
        self.lu.rows()
    }

    /// The merged L/U buffer.
    pub fn factors(&self) -> &DenseMatrix<T> {
        &self.lu
    }

    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    pub fn pivot_tolerance(&self) -> T {
        self.pivot_tolerance
    }

    pub fn check_finite(&self) -> bool {
        self.check_finite
    }

    pub fn into_parts(self) -> LuFactorizationParts<T> {
        LuFactorizationParts {
            lu: self.lu,
            pivots: self.pivots,
            pivot_tolerance: self.pivot_tolerance,
            check_finite: self.check_finite,
        }
    }

    /// Replays the recorded swaps on the identity ordering.
    ///
    /// Entry `i` is the row of the original matrix that ends up at row `i`,
    /// so `(P * A)[i] = A[perm[i]]`.
    pub fn permutation(&self) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..self.dim()).collect();
        for (k, &p) in self.pivots.iter().enumerate() {
            perm.swap(k, p);
        }
        perm
    }

    /// The permutation as a 0/1 matrix P with `P * A = L * U`.
    pub fn permutation_matrix(&self) -> DenseMatrix<T> {
        let n = self.dim();
        let mut p = DenseMatrix::zeros(n, n);
        for (i, &src) in self.permutation().iter().enumerate() {
            p[(i, src)] = T::one();
        }
        p
    }

    /// Unit lower triangular factor L.
    pub fn lower(&self) -> DenseMatrix<T> {
        let n = self.dim();
        let mut l = DenseMatrix::identity(n);
        for i in 1..n {
            for j in 0..i {
                l[(i, j)] = self.lu[(i, j)];
            }
        }
        l
    }

    /// Upper triangular factor U.
    pub fn upper(&self) -> DenseMatrix<T> {
        let n = self.dim();
        let mut u = DenseMatrix::zeros(n, n);
        for i in 0..n {
            for j in i..n {
                u[(i, j)] = self.lu[(i, j)];
            }
        }
        u
    }

    /// Recovers the original matrix as `P^T * L * U`.
    pub fn reconstruct(&self) -> DenseMatrix<T> {
        let n = self.dim();
        let perm = self.permutation();
        let mut a = DenseMatrix::zeros(n, n);
        for (i, &dst) in perm.iter().enumerate() {
            for j in 0..n {
                // (L * U)[i][j] with L[i][i] = 1
                let mut sum = if j >= i { self.lu[(i, j)] } else { T::zero() };
                for k in 0..i.min(j + 1) {
                    sum = sum + self.lu[(i, k)] * self.lu[(k, j)];
                }
                a[(dst, j)] = sum;
            }
        }
        a
    }

    /// Number of steps that actually exchanged two rows.
    pub fn row_swaps(&self) -> usize {
        self.pivots
            .iter()
            .enumerate()
            .filter(|&(k, &p)| k != p)
            .count()
    }

    /// Determinant of the original matrix. Zero for singular factorizations.
    pub fn determinant(&self) -> T {
        let product = (0..self.dim()).fold(T::one(), |acc, i| acc * self.lu[(i, i)]);
        if self.row_swaps() % 2 == 1 {
            -product
        } else {
            product
        }
    }

    /// Smallest diagonal magnitude of U.
    pub fn smallest_pivot(&self) -> T {
        (0..self.dim())
            .map(|i| self.lu[(i, i)].abs())
            .fold(T::infinity(), T::min)
    }

    /// True when some diagonal entry of U is at or below the pivot tolerance.
    pub fn is_singular(&self) -> bool {
        (0..self.dim()).any(|i| self.lu[(i, i)].abs() <= self.pivot_tolerance)
    }

    /// Inverse of the original matrix, solved one identity column at a time.
    pub fn inverse(&self) -> Result<DenseMatrix<T>, LuCoreError> {
        let n = self.dim();
        let mut inv = DenseMatrix::zeros(n, n);
        let mut column = vec![T::zero(); n];
        for j in 0..n {
            column.iter_mut().for_each(|v| *v = T::zero());
            column[j] = T::one();
            self.solve_in_place(&mut column)?;
            for (i, &v) in column.iter().enumerate() {
                inv[(i, j)] = v;
            }
        }
        Ok(inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn notebook_3x3() -> DenseMatrix<f64> {
        DenseMatrix::from_rows(&[[10.0, -7.0, 1.0], [-3.0, 2.0, 6.0], [5.0, -1.0, 5.0]]).unwrap()
    }

    #[test]
    fn factors_match_hand_elimination() {
        let lu = LuDecomposition::new().factor(notebook_3x3()).unwrap();
        assert_eq!(lu.pivots(), &[0, 2, 2]);
        let expected = [10.0, -7.0, 1.0, 0.5, 2.5, 4.5, -0.3, -0.04, 6.48];
        for (got, want) in lu.factors().data().iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn permutation_forms_agree() {
        let lu = LuDecomposition::new().factor(notebook_3x3()).unwrap();
        assert_eq!(lu.permutation(), vec![0, 2, 1]);
        let p = lu.permutation_matrix();
        assert_eq!(p.data(), &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0]);

        let pa = p.matmul(&notebook_3x3()).unwrap();
        let l_u = lu.lower().matmul(&lu.upper()).unwrap();
        for (x, y) in pa.data().iter().zip(l_u.data()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn reconstruct_returns_original() {
        let a = notebook_3x3();
        let lu = LuDecomposition::new().factor(a.clone()).unwrap();
        for (x, y) in lu.reconstruct().data().iter().zip(a.data()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn determinant_accounts_for_swaps() {
        let lu = LuDecomposition::new().factor(notebook_3x3()).unwrap();
        assert_eq!(lu.row_swaps(), 1);
        assert_relative_eq!(lu.determinant(), -162.0, epsilon = 1e-10);
        assert_relative_eq!(lu.smallest_pivot(), 2.5, epsilon = 1e-12);
        assert!(!lu.is_singular());
    }

    #[test]
    fn rejects_non_square_and_empty() {
        let rect = DenseMatrix::<f64>::zeros(2, 3);
        assert!(matches!(
            LuDecomposition::new().factor(rect),
            Err(LuCoreError::DimensionMismatch(_))
        ));
        let empty = DenseMatrix::<f64>::zeros(0, 0);
        assert!(matches!(
            LuDecomposition::new().factor(empty),
            Err(LuCoreError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn non_finite_entries_are_checked_on_request() {
        let a = DenseMatrix::from_rows(&[[1.0_f64, f64::INFINITY], [0.0, 1.0]]).unwrap();
        assert!(matches!(
            LuDecomposition::new().factor(a.clone()),
            Err(LuCoreError::InvalidInput(_))
        ));
        let unchecked = LuDecomposition::with_params(0.0, false, SingularityPolicy::Deferred);
        assert!(unchecked.factor(a).is_ok());
    }

    #[test]
    fn zero_column_keeps_factoring_under_deferred_policy() {
        let a = DenseMatrix::from_rows(&[[0.0_f64, 1.0], [0.0, 2.0]]).unwrap();
        let lu = LuDecomposition::new().factor(a).unwrap();
        assert_eq!(lu.pivots(), &[0, 1]);
        assert!(lu.is_singular());
        assert_eq!(lu.determinant(), 0.0);
        assert!(lu.factors().is_finite());
    }

    #[test]
    fn eager_policy_fails_at_first_zero_pivot() {
        let a = DenseMatrix::from_rows(&[[1.0_f64, 2.0], [2.0, 4.0]]).unwrap();
        let eager = LuDecomposition::with_params(0.0, true, SingularityPolicy::Eager);
        assert_eq!(
            eager.factor(a),
            Err(LuCoreError::SingularMatrix { index: 1 })
        );
    }

    #[test]
    fn tolerance_flags_tiny_pivots() {
        let a = DenseMatrix::from_rows(&[[1.0_f64, 0.0], [0.0, 1e-14]]).unwrap();
        assert!(!LuDecomposition::new().factor(a.clone()).unwrap().is_singular());

        let loose = LuDecomposition::with_params(1e-12, true, SingularityPolicy::Deferred);
        assert!(loose.factor(a.clone()).unwrap().is_singular());

        let eager = LuDecomposition::with_params(1e-12, true, SingularityPolicy::Eager);
        assert_eq!(
            eager.factor(a),
            Err(LuCoreError::SingularMatrix { index: 1 })
        );
    }

    #[test]
    fn from_parts_checks_pivot_record() {
        let lu = LuDecomposition::new().factor(notebook_3x3()).unwrap();
        let LuFactorizationParts { lu: factors, pivots, .. } = lu.clone().into_parts();

        let rebuilt = LuFactorization::from_parts(factors.clone(), pivots).unwrap();
        assert_eq!(rebuilt, lu);

        // A pivot may not pull a row from above the current step.
        assert!(LuFactorization::from_parts(factors.clone(), vec![0, 0, 2]).is_err());
        assert!(LuFactorization::from_parts(factors.clone(), vec![0, 3, 2]).is_err());
        assert!(LuFactorization::from_parts(factors, vec![0, 2]).is_err());
        assert!(LuFactorization::from_parts(DenseMatrix::<f64>::zeros(2, 3), vec![0, 1]).is_err());
    }

    #[test]
    fn serde_round_trip_validates_pivots() {
        let lu = LuDecomposition::new().factor(notebook_3x3()).unwrap();
        let json = serde_json::to_string(&lu).unwrap();
        let back: LuFactorization<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pivots(), lu.pivots());
        for (x, y) in back.factors().data().iter().zip(lu.factors().data()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12);
        }

        let tampered = json.replace("\"pivots\":[0,2,2]", "\"pivots\":[0,0,2]");
        assert_ne!(tampered, json);
        assert!(serde_json::from_str::<LuFactorization<f64>>(&tampered).is_err());
    }

    #[test]
    fn parts_round_trip_keeps_tolerance() {
        let a = DenseMatrix::from_rows(&[[1.0_f64, 0.0], [0.0, 1e-14]]).unwrap();
        let loose = LuDecomposition::with_params(1e-12, false, SingularityPolicy::Deferred);
        let lu = loose.factor(a).unwrap();
        assert_eq!(lu.solve(&[1.0, 1.0]), Err(LuCoreError::SingularMatrix { index: 1 }));

        let parts = lu.clone().into_parts();
        assert_eq!(parts.pivot_tolerance, 1e-12);
        let rebuilt = LuFactorization::try_from(parts.clone()).unwrap();
        assert_eq!(rebuilt, lu);
        assert_eq!(rebuilt.pivot_tolerance(), 1e-12);
        assert!(!rebuilt.check_finite());
        assert_eq!(
            rebuilt.solve(&[1.0, 1.0]),
            Err(LuCoreError::SingularMatrix { index: 1 })
        );

        // The two-argument form falls back to exact-zero detection.
        let plain = LuFactorization::from_parts(parts.lu, parts.pivots).unwrap();
        assert_eq!(plain.pivot_tolerance(), 0.0);
        assert!(plain.check_finite());
    }

    #[test]
    fn deserialization_rejects_unusable_tolerance() {
        let lu = LuDecomposition::new().factor(notebook_3x3()).unwrap();
        let mut value = serde_json::to_value(&lu).unwrap();
        assert_eq!(value["check_finite"], serde_json::json!(true));

        value["pivot_tolerance"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<LuFactorization<f64>>(value.clone()).is_err());

        let parts = LuFactorizationParts {
            pivot_tolerance: f64::INFINITY,
            ..lu.clone().into_parts()
        };
        assert!(matches!(
            LuFactorization::try_from(parts),
            Err(LuCoreError::InvalidInput(_))
        ));

        // Older records without the flag still load.
        value["pivot_tolerance"] = serde_json::json!(0.0);
        value.as_object_mut().unwrap().remove("check_finite");
        let back: LuFactorization<f64> = serde_json::from_value(value).unwrap();
        assert!(back.check_finite());
    }
}
