//! Error types for the hf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read case file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write case file: {path}")]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Case file error: {0}")]
    Config(String),

    #[error("Case validation failed: {0}")]
    Validation(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Task farm error: {0}")]
    Farm(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<hf_modal::ModalError> for AppError {
    fn from(err: hf_modal::ModalError) -> Self {
        AppError::Model(err.to_string())
    }
}

impl From<hf_farm::FarmError> for AppError {
    fn from(err: hf_farm::FarmError) -> Self {
        AppError::Farm(err.to_string())
    }
}

impl From<hf_results::ResultsError> for AppError {
    fn from(err: hf_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
