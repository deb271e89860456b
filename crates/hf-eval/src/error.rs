//! Error types for point evaluation.

use hf_core::HfError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Invalid evaluation time: {t}")]
    InvalidTime { t: f64 },

    #[error("Probe position {x} outside pipe [0, {length}]")]
    ProbeOutsidePipe { x: f64, length: f64 },

    #[error("Singular {boundary} boundary system")]
    SingularBoundary { boundary: &'static str },

    #[error("Boundary history has no sample at t = {time}")]
    HistoryGap { time: f64 },

    #[error("Numeric error: {0}")]
    Numeric(#[from] HfError),
}

pub type EvalResult<T> = Result<T, EvalError>;
