use bytemuck::{Pod, Zeroable};
use num_traits::Float;
use std::fmt::Debug;

/// Element type accepted by the dense matrix and the LU routines.
///
/// Blanket-implemented for every floating point type that is also plain old
/// data, which in practice means `f32` and `f64`.
pub trait Scalar: Float + Pod + Zeroable + Debug + Default + Send + Sync + 'static {}

impl<T> Scalar for T where T: Float + Pod + Zeroable + Debug + Default + Send + Sync + 'static {}

/// Generic trait representing a matrix.
pub trait Matrix: Debug {
    /// The underlying numeric type of the matrix elements (e.g., f32, f64).
    type Value: Copy + Debug + Default + Pod + Zeroable;

    /// Returns the dimensions of the matrix as (rows, columns).
    fn dims(&self) -> (usize, usize);

    /// Returns the number of rows.
    fn rows(&self) -> usize {
        self.dims().0
    }

    /// Returns the number of columns.
    fn cols(&self) -> usize {
        self.dims().1
    }

    /// Checks if the matrix is square.
    fn is_square(&self) -> bool {
        let (rows, cols) = self.dims();
        rows == cols
    }
}

/// Generic trait representing a vector.
pub trait Vector: Debug {
    /// The underlying numeric type of the vector elements (e.g., f32, f64).
    type Value: Copy + Debug + Default + Pod + Zeroable;

    /// Returns the number of elements in the vector.
    fn len(&self) -> usize;

    /// Checks if the vector is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
