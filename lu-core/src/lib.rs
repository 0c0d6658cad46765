//! # LU Core Library
//!
//! Provides the dense matrix storage, element and shape traits, execution
//! device markers and the shared error type used by the LU solver.

pub mod dense_matrix;
pub mod device;
pub mod error;
pub mod traits;
pub mod vector;

// Re-export public types
pub use dense_matrix::DenseMatrix;
pub use device::{CpuDevice, Device};
pub use error::LuCoreError;
pub use traits::{Matrix, Scalar, Vector};
pub use vector::{ensure_len, norm2};
