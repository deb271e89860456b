//! Messages exchanged between the coordinator and its workers.

use crate::wire::RESULT_LEN;
use hf_core::WorkerId;

/// Coordinator to worker.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    /// Packed [`hf_modal::ModelSetup`], sent once before any work.
    Setup(Vec<f64>),
    /// Index into the time grid.
    Work(usize),
    Terminate,
}

impl WorkerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerMessage::Setup(_) => "setup",
            WorkerMessage::Work(_) => "work",
            WorkerMessage::Terminate => "terminate",
        }
    }
}

/// Worker to coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorMessage {
    Result {
        worker: WorkerId,
        payload: [f64; RESULT_LEN],
    },
    /// The worker hit an error and is exiting.
    Failed { worker: WorkerId, message: String },
}

impl CoordinatorMessage {
    pub fn worker(&self) -> WorkerId {
        match self {
            CoordinatorMessage::Result { worker, .. }
            | CoordinatorMessage::Failed { worker, .. } => *worker,
        }
    }
}
