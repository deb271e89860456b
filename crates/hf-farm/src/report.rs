//! Bookkeeping of what the coordinator sent to whom.

use hf_core::WorkerId;

/// Why a task was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchTrigger {
    /// Part of the first batch, one per worker in rank order.
    Initial,
    /// Sent to a worker right after it returned a result.
    AfterReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub worker: WorkerId,
    pub task: usize,
    pub trigger: DispatchTrigger,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FarmReport {
    /// Every task dispatch, in send order.
    pub dispatches: Vec<Dispatch>,
    /// Results accepted per worker, indexed by worker slot.
    pub completed_per_worker: Vec<usize>,
    pub terminations_sent: usize,
}

impl FarmReport {
    pub(crate) fn new(workers: usize) -> Self {
        Self {
            dispatches: Vec::new(),
            completed_per_worker: vec![0; workers],
            terminations_sent: 0,
        }
    }

    pub fn initial_dispatches(&self) -> usize {
        self.dispatches
            .iter()
            .filter(|d| d.trigger == DispatchTrigger::Initial)
            .count()
    }

    pub fn tasks_for(&self, worker: WorkerId) -> Vec<usize> {
        self.dispatches
            .iter()
            .filter(|d| d.worker == worker)
            .map(|d| d.task)
            .collect()
    }

    pub fn total_completed(&self) -> usize {
        self.completed_per_worker.iter().sum()
    }

    /// Workers that never received a task.
    pub fn idle_workers(&self) -> usize {
        self.completed_per_worker.iter().filter(|&&n| n == 0).count()
    }
}
