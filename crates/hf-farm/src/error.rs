//! Error types for the coordinator/worker farm.

use hf_core::WorkerId;
use hf_eval::EvalError;
use thiserror::Error;

/// A peer broke the message protocol. Always fatal, never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolViolation {
    #[error("Expected {expected} message, got {got}")]
    UnexpectedMessage {
        expected: &'static str,
        got: &'static str,
    },

    #[error("Malformed setup payload: {what}")]
    MalformedSetup { what: String },

    #[error("Malformed task index {value} in result packet")]
    MalformedIndex { value: f64 },

    #[error("Task {index} out of range (task count {count})")]
    TaskOutOfRange { index: usize, count: usize },

    #[error("Message from unknown {worker}")]
    UnknownWorker { worker: WorkerId },

    #[error("Result from {worker}, which has no task in flight")]
    NotInFlight { worker: WorkerId },

    #[error("{worker} returned task {got}, but task {expected} is in flight")]
    TaskMismatch {
        worker: WorkerId,
        expected: usize,
        got: usize,
    },

    #[error("Duplicate result for task {index}")]
    DuplicateResult { index: usize },

    #[error("{missing} result columns never arrived")]
    IncompleteResults { missing: usize },

    #[error("Lost connection to {peer}")]
    Disconnected { peer: String },
}

#[derive(Error, Debug)]
pub enum FarmError {
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error("{worker} failed: {message}")]
    WorkerFailed { worker: WorkerId, message: String },

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Task farm needs at least one worker")]
    NoWorkers,

    #[error("{worker} panicked")]
    WorkerPanicked { worker: WorkerId },
}

pub type FarmResult<T> = Result<T, FarmError>;
