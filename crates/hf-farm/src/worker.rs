//! Worker loop: decode the setup once, then evaluate tasks until told to stop.

use crate::error::{FarmResult, ProtocolViolation};
use crate::link::WorkerLink;
use crate::message::{CoordinatorMessage, WorkerMessage};
use crate::wire::{ResultPacket, decode_setup};
use hf_core::WorkerId;
use hf_eval::{PointEvaluator, Probe};
use hf_modal::ModelSetup;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSummary {
    pub worker: WorkerId,
    pub tasks_completed: usize,
}

/// Serve one worker link to completion. Any error is reported to the
/// coordinator as `Failed` before it is returned.
pub fn run_worker<L, E>(mut link: L, evaluator: &E) -> FarmResult<WorkerSummary>
where
    L: WorkerLink,
    E: PointEvaluator + ?Sized,
{
    let worker = link.id();
    match serve(&mut link, evaluator) {
        Ok(summary) => {
            debug!(%worker, tasks = summary.tasks_completed, "worker terminated");
            Ok(summary)
        }
        Err(err) => {
            error!(%worker, %err, "worker aborting");
            // Best effort: the coordinator may already be gone.
            let _ = link.send(CoordinatorMessage::Failed {
                worker,
                message: err.to_string(),
            });
            Err(err)
        }
    }
}

fn serve<L, E>(link: &mut L, evaluator: &E) -> FarmResult<WorkerSummary>
where
    L: WorkerLink,
    E: PointEvaluator + ?Sized,
{
    let worker = link.id();
    let setup = match link.recv()? {
        WorkerMessage::Setup(payload) => decode_setup(&payload)?,
        other => {
            return Err(ProtocolViolation::UnexpectedMessage {
                expected: "setup",
                got: other.kind(),
            }
            .into());
        }
    };

    let mut tasks_completed = 0;
    loop {
        match link.recv()? {
            WorkerMessage::Work(index) => {
                let packet = evaluate_task(&setup, evaluator, index)?;
                link.send(CoordinatorMessage::Result {
                    worker,
                    payload: packet.to_payload(),
                })?;
                tasks_completed += 1;
            }
            WorkerMessage::Terminate => {
                return Ok(WorkerSummary {
                    worker,
                    tasks_completed,
                });
            }
            other @ WorkerMessage::Setup(_) => {
                return Err(ProtocolViolation::UnexpectedMessage {
                    expected: "work or terminate",
                    got: other.kind(),
                }
                .into());
            }
        }
    }
}

/// States at the reservoir, the valve and the probe for time index `index`.
pub fn evaluate_task<E>(setup: &ModelSetup, evaluator: &E, index: usize) -> FarmResult<ResultPacket>
where
    E: PointEvaluator + ?Sized,
{
    let t = setup
        .grid
        .instant(index)
        .ok_or(ProtocolViolation::TaskOutOfRange {
            index,
            count: setup.task_count(),
        })?;
    Ok(ResultPacket {
        index,
        upstream: evaluator.evaluate(setup, Probe::Upstream, t)?,
        downstream: evaluator.evaluate(setup, Probe::Downstream, t)?,
        probe: evaluator.evaluate(setup, Probe::Interior(setup.probe_x), t)?,
    })
}
