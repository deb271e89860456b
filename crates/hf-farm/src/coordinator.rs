//! Task scheduling on the coordinator.
//!
//! The coordinator broadcasts the setup, hands out one time index per worker,
//! then refills each worker as soon as its result comes back. Every index is
//! issued exactly once and no worker ever holds more than one task.

use crate::assembler::{ResultAssembler, TimeSeries};
use crate::error::{FarmError, FarmResult, ProtocolViolation};
use crate::link::CoordinatorLink;
use crate::message::{CoordinatorMessage, WorkerMessage};
use crate::report::{Dispatch, DispatchTrigger, FarmReport};
use crate::wire::{ResultPacket, encode_setup};
use hf_core::{WorkerId, worker_ids};
use hf_modal::ModelSetup;
use tracing::{debug, error, info};

pub struct Coordinator<'a> {
    setup: &'a ModelSetup,
    task_count: usize,
    next_task: usize,
    in_flight: Vec<Option<usize>>,
    assembler: ResultAssembler,
    report: FarmReport,
}

impl<'a> Coordinator<'a> {
    pub fn new(setup: &'a ModelSetup) -> Self {
        Self {
            setup,
            task_count: setup.task_count(),
            next_task: 0,
            in_flight: Vec::new(),
            assembler: ResultAssembler::new(setup),
            report: FarmReport::default(),
        }
    }

    /// Drive the whole run. The link is consumed so that workers are
    /// disconnected however the run ends.
    pub fn run<L: CoordinatorLink>(mut self, mut link: L) -> FarmResult<(TimeSeries, FarmReport)> {
        let workers = link.worker_count();
        if workers == 0 {
            return Err(FarmError::NoWorkers);
        }
        self.in_flight = vec![None; workers];
        self.report = FarmReport::new(workers);
        info!(workers, tasks = self.task_count, "starting task farm");

        let payload = encode_setup(self.setup);
        for worker in worker_ids(workers) {
            link.send(worker, WorkerMessage::Setup(payload.clone()))?;
        }

        for worker in worker_ids(workers.min(self.task_count)) {
            self.dispatch(&mut link, worker, DispatchTrigger::Initial)?;
        }

        while !self.assembler.is_complete() {
            match link.recv_any()? {
                CoordinatorMessage::Failed { worker, message } => {
                    error!(%worker, %message, "worker reported failure");
                    return Err(FarmError::WorkerFailed { worker, message });
                }
                CoordinatorMessage::Result { worker, payload } => {
                    let packet = ResultPacket::from_payload(&payload)?;
                    self.accept(worker, &packet)?;
                    if self.next_task < self.task_count {
                        self.dispatch(&mut link, worker, DispatchTrigger::AfterReply)?;
                    }
                }
            }
        }

        for worker in worker_ids(workers) {
            link.send(worker, WorkerMessage::Terminate)?;
            self.report.terminations_sent += 1;
        }

        let series = self.assembler.finish()?;
        info!(
            tasks = self.task_count,
            dispatches = self.report.dispatches.len(),
            "task farm finished"
        );
        Ok((series, self.report))
    }

    fn dispatch<L: CoordinatorLink>(
        &mut self,
        link: &mut L,
        worker: WorkerId,
        trigger: DispatchTrigger,
    ) -> FarmResult<()> {
        let task = self.next_task;
        link.send(worker, WorkerMessage::Work(task))?;
        self.next_task += 1;
        self.in_flight[worker.index()] = Some(task);
        self.report.dispatches.push(Dispatch {
            worker,
            task,
            trigger,
        });
        debug!(%worker, task, ?trigger, "dispatched task");
        Ok(())
    }

    fn accept(&mut self, worker: WorkerId, packet: &ResultPacket) -> Result<(), ProtocolViolation> {
        let slot = worker.index();
        let index = packet.index;
        if slot >= self.in_flight.len() {
            return Err(ProtocolViolation::UnknownWorker { worker });
        }
        if index >= self.task_count {
            return Err(ProtocolViolation::TaskOutOfRange {
                index,
                count: self.task_count,
            });
        }
        if self.assembler.is_filled(index) {
            return Err(ProtocolViolation::DuplicateResult { index });
        }
        match self.in_flight[slot] {
            None => return Err(ProtocolViolation::NotInFlight { worker }),
            Some(expected) if expected != index => {
                return Err(ProtocolViolation::TaskMismatch {
                    worker,
                    expected,
                    got: index,
                });
            }
            Some(_) => {}
        }
        self.assembler.insert(packet)?;
        self.in_flight[slot] = None;
        self.report.completed_per_worker[slot] += 1;
        debug!(%worker, task = index, remaining = self.assembler.remaining(), "result received");
        Ok(())
    }
}
