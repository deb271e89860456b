//! Error types for model construction.

use hf_core::HfError;
use thiserror::Error;

/// Errors raised while deriving the modal basis, initial condition or time grid.
///
/// All of these are fatal: nothing can be distributed without a valid basis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModalError {
    #[error("Invalid model parameter: {what}")]
    InvalidParameter { what: String },

    #[error("Wave-speed quadratic has negative discriminant {discriminant:e}")]
    NegativeDiscriminant { discriminant: f64 },

    #[error("Inconsistent wave speeds: {what}")]
    InconsistentWaveSpeeds { what: String },

    #[error("Modal transform is singular (scaled determinant {scaled_det:e})")]
    SingularTransform { scaled_det: f64 },

    #[error("Invalid time grid: {what}")]
    InvalidGrid { what: String },

    #[error("Numeric error: {0}")]
    Numeric(#[from] HfError),
}

pub type ModalResult<T> = Result<T, ModalError>;

impl ModalError {
    pub(crate) fn parameter(what: impl Into<String>) -> Self {
        ModalError::InvalidParameter { what: what.into() }
    }

    pub(crate) fn grid(what: impl Into<String>) -> Self {
        ModalError::InvalidGrid { what: what.into() }
    }
}
