use crate::error::LuCoreError;
use crate::traits::{Scalar, Vector};

impl<T: Scalar> Vector for [T] {
    type Value = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }
}

impl<T: Scalar> Vector for Vec<T> {
    type Value = T;

    fn len(&self) -> usize {
        self.as_slice().len()
    }
}

/// Checks that `vector` holds exactly `expected` elements.
///
/// `what` names the vector in the error message (e.g. "right-hand side").
pub fn ensure_len<V: Vector + ?Sized>(
    vector: &V,
    expected: usize,
    what: &str,
) -> Result<(), LuCoreError> {
    if vector.len() != expected {
        return Err(LuCoreError::DimensionMismatch(format!(
            "{} length ({}) must match matrix dimension ({})",
            what,
            vector.len(),
            expected
        )));
    }
    Ok(())
}

/// Euclidean norm of a vector.
pub fn norm2<T: Scalar>(v: &[T]) -> T {
    v.iter().fold(T::zero(), |acc, &x| acc + x * x).sqrt()
}
