use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LuCoreError {
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Matrix is singular: zero pivot at index {index}")]
    SingularMatrix { index: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(feature = "wasm")]
impl From<LuCoreError> for wasm_bindgen::JsValue {
    fn from(err: LuCoreError) -> Self {
        Self::from_str(&err.to_string())
    }
}
