//! In-process farm: coordinator on the calling thread, workers on scoped threads.

use crate::assembler::TimeSeries;
use crate::coordinator::Coordinator;
use crate::error::{FarmError, FarmResult};
use crate::link::channel_links;
use crate::report::FarmReport;
use crate::worker::{WorkerSummary, run_worker};
use hf_core::{Timer, WorkerId};
use hf_eval::PointEvaluator;
use hf_modal::ModelSetup;
use std::thread;

#[derive(Debug, Clone)]
pub struct FarmRun {
    pub series: TimeSeries,
    pub report: FarmReport,
    pub workers: Vec<WorkerSummary>,
    pub wall_time_s: f64,
}

/// Evaluate every time sample of `setup` on `workers` threads.
pub fn run_threaded<E>(setup: &ModelSetup, evaluator: &E, workers: usize) -> FarmResult<FarmRun>
where
    E: PointEvaluator + Sync,
{
    if workers == 0 {
        return Err(FarmError::NoWorkers);
    }
    let timer = Timer::start("task farm");
    let (coordinator_link, worker_links) = channel_links(workers);

    let (outcome, joined) = thread::scope(|scope| {
        let handles: Vec<_> = worker_links
            .into_iter()
            .map(|link| scope.spawn(move || run_worker(link, evaluator)))
            .collect();

        let outcome = Coordinator::new(setup).run(coordinator_link);

        let joined: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();
        (outcome, joined)
    });

    // A coordinator error is the root cause; worker errors after it are
    // disconnect fallout.
    let (series, report) = outcome?;
    let mut summaries = Vec::with_capacity(workers);
    for (slot, joined) in joined.into_iter().enumerate() {
        let worker = WorkerId::from_index(slot as u32);
        match joined {
            Ok(summary) => summaries.push(summary?),
            Err(_) => return Err(FarmError::WorkerPanicked { worker }),
        }
    }

    Ok(FarmRun {
        series,
        report,
        workers: summaries,
        wall_time_s: timer.stop(),
    })
}
