//! End-to-end scheduling over real threads.

use hf_core::WorkerId;
use hf_eval::{CharacteristicEvaluator, EvalResult, PointEvaluator, Probe};
use hf_farm::{DispatchTrigger, FarmRun, run_threaded};
use hf_modal::{ModalModel, ModelParameters, ModelSetup, TimeGrid};
use nalgebra::Vector4;
use proptest::prelude::*;
use std::collections::HashSet;

/// Cheap evaluator whose output identifies the sample it came from.
struct Stamp;

impl PointEvaluator for Stamp {
    fn evaluate(&self, setup: &ModelSetup, probe: Probe, t: f64) -> EvalResult<Vector4<f64>> {
        Ok(Vector4::new(t, probe.position(setup.length), -t, 1.0))
    }
}

fn unit_step_setup(n_steps: usize) -> ModelSetup {
    let model = ModalModel::derive(&ModelParameters::delft()).unwrap();
    let grid = TimeGrid::new(n_steps as f64, 1.0).unwrap();
    ModelSetup::new(&model, grid, 11.15).unwrap()
}

fn check_run(run: &FarmRun, n_steps: usize, workers: usize) {
    let tasks = n_steps + 1;
    let report = &run.report;

    assert_eq!(report.dispatches.len(), tasks);
    assert_eq!(report.initial_dispatches(), workers.min(tasks));
    assert_eq!(report.terminations_sent, workers);
    assert_eq!(report.total_completed(), tasks);

    let issued: HashSet<usize> = report.dispatches.iter().map(|d| d.task).collect();
    assert_eq!(issued.len(), tasks);

    for (i, dispatch) in report.dispatches.iter().enumerate() {
        assert_eq!(dispatch.task, i, "tasks are issued in index order");
        if i < workers.min(tasks) {
            assert_eq!(dispatch.trigger, DispatchTrigger::Initial);
            assert_eq!(dispatch.worker, WorkerId::from_index(i as u32));
        } else {
            assert_eq!(dispatch.trigger, DispatchTrigger::AfterReply);
        }
    }

    assert_eq!(run.workers.len(), workers);
    for summary in &run.workers {
        assert_eq!(
            summary.tasks_completed,
            report.completed_per_worker[summary.worker.index()]
        );
    }

    let modal = &run.series.modal;
    for i in 0..tasks {
        assert_eq!(modal.upstream[(0, i)], i as f64);
        assert_eq!(modal.downstream[(1, i)], 20.0);
        assert_eq!(modal.probe[(1, i)], 11.15);
        assert_eq!(modal.probe[(2, i)], -(i as f64));
    }
}

#[test]
fn one_step_one_worker() {
    let setup = unit_step_setup(1);
    let run = run_threaded(&setup, &Stamp, 1).unwrap();
    check_run(&run, 1, 1);
    assert_eq!(run.report.tasks_for(WorkerId::from_index(0)), vec![0, 1]);
}

#[test]
fn five_steps_three_workers() {
    let setup = unit_step_setup(5);
    let run = run_threaded(&setup, &Stamp, 3).unwrap();
    check_run(&run, 5, 3);
    assert_eq!(run.report.initial_dispatches(), 3);
    assert_eq!(
        run.report
            .dispatches
            .iter()
            .filter(|d| d.trigger == DispatchTrigger::AfterReply)
            .count(),
        3
    );
}

#[test]
fn more_workers_than_tasks() {
    let setup = unit_step_setup(2);
    let run = run_threaded(&setup, &Stamp, 5).unwrap();
    check_run(&run, 2, 5);
    assert_eq!(run.report.idle_workers(), 2);
    assert_eq!(run.report.terminations_sent, 5);
    for idle in [3, 4] {
        assert!(run.report.tasks_for(WorkerId::from_index(idle)).is_empty());
    }
}

#[test]
fn zero_workers_is_rejected() {
    let setup = unit_step_setup(2);
    assert!(run_threaded(&setup, &Stamp, 0).is_err());
}

#[test]
fn tables_do_not_depend_on_worker_count() {
    let model = ModalModel::derive(&ModelParameters::delft()).unwrap();
    let setup = ModelSetup::new(&model, TimeGrid::new(0.06, 0.002).unwrap(), 11.15).unwrap();
    let evaluator = CharacteristicEvaluator::new(8);

    let reference = run_threaded(&setup, &evaluator, 1).unwrap().series;
    for workers in [2, 3, 7] {
        let series = run_threaded(&setup, &evaluator, workers).unwrap().series;
        assert_eq!(series, reference, "{workers} workers");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_sample_is_computed_once(n_steps in 0_usize..40, workers in 1_usize..9) {
        let setup = unit_step_setup(n_steps);
        let run = run_threaded(&setup, &Stamp, workers).unwrap();
        check_run(&run, n_steps, workers);
    }
}
