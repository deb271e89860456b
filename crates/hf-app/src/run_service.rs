//! Run execution: case file in, tables and manifest out.

use crate::config::CaseConfig;
use crate::error::AppResult;
use hf_eval::CharacteristicEvaluator;
use hf_farm::run_threaded;
use hf_modal::{ModalModel, ModelSetup, TimeGrid};
use hf_results::{
    DOWNSTREAM_FILE, PROBE_FILE, RunManifest, RunStore, TIME_FILE, TableOutcome, UPSTREAM_FILE,
    compute_run_id,
};
use nalgebra::{Matrix4, Vector4};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub output_dir: PathBuf,
    pub tasks: usize,
    pub workers: usize,
    pub wall_time_s: f64,
    pub tables: Vec<TableOutcome>,
}

impl RunSummary {
    pub fn failed_tables(&self) -> impl Iterator<Item = &TableOutcome> {
        self.tables.iter().filter(|t| !t.is_written())
    }
}

/// Wave speeds and transforms of a case, without running it.
#[derive(Debug, Clone)]
pub struct BasisSummary {
    pub speeds: [f64; 4],
    pub s: Matrix4<f64>,
    pub s_inv: Matrix4<f64>,
    pub q_initial: Vector4<f64>,
    pub w_initial: Vector4<f64>,
    pub identity_residual: f64,
}

/// Validate the case and derive the broadcast setup.
pub fn build_setup(config: &CaseConfig) -> AppResult<(ModalModel, ModelSetup)> {
    config.validate()?;
    let model = ModalModel::derive(&config.to_parameters())?;
    let grid = TimeGrid::new(config.run.t_end_s, config.run.dt_s)?;
    let setup = ModelSetup::new(&model, grid, config.run.probe_x_m)?;
    Ok((model, setup))
}

pub fn describe_basis(config: &CaseConfig) -> AppResult<BasisSummary> {
    config.validate()?;
    let model = ModalModel::derive(&config.to_parameters())?;
    Ok(BasisSummary {
        speeds: model.speeds.signed(),
        s: *model.basis.s(),
        s_inv: *model.basis.s_inv(),
        q_initial: model.initial.q,
        w_initial: model.initial.w,
        identity_residual: model.basis.identity_residual(),
    })
}

/// Run the case on `config.run.workers` threads and write the results to `output_dir`.
pub fn run_case(config: &CaseConfig, output_dir: &Path) -> AppResult<RunSummary> {
    let (_model, setup) = build_setup(config)?;
    let run_id = compute_run_id(config, SOLVER_VERSION);
    let workers = config.run.workers;
    info!(%run_id, workers, tasks = setup.task_count(), "running case");

    let evaluator = CharacteristicEvaluator::new(config.run.samples_per_transit);
    let run = run_threaded(&setup, &evaluator, workers)?;

    let store = match RunStore::new(output_dir.to_path_buf()) {
        Ok(store) => store,
        Err(err) => {
            warn!(dir = %output_dir.display(), %err, "cannot create output directory");
            let tables = [TIME_FILE, UPSTREAM_FILE, DOWNSTREAM_FILE, PROBE_FILE]
                .into_iter()
                .map(|file| TableOutcome::Failed {
                    file: file.to_string(),
                    reason: err.to_string(),
                })
                .collect();
            return Ok(RunSummary {
                run_id,
                output_dir: output_dir.to_path_buf(),
                tasks: setup.task_count(),
                workers,
                wall_time_s: run.wall_time_s,
                tables,
            });
        }
    };
    let physical = &run.series.physical;
    let tables = vec![
        store.write_time(&run.series.instants),
        store.write_station(UPSTREAM_FILE, &physical.upstream),
        store.write_station(DOWNSTREAM_FILE, &physical.downstream),
        store.write_station(PROBE_FILE, &physical.probe),
    ];

    let manifest = RunManifest {
        run_id: run_id.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        solver_version: SOLVER_VERSION.to_string(),
        workers,
        tasks: setup.task_count(),
        dt_s: config.run.dt_s,
        t_end_s: config.run.t_end_s,
        probe_x_m: config.run.probe_x_m,
        wall_time_s: run.wall_time_s,
        tables: tables.clone(),
    };
    if let Err(err) = store.save_manifest(&manifest) {
        warn!(%err, "failed to write run manifest");
    }

    info!(%run_id, wall_time_s = run.wall_time_s, "case finished");
    Ok(RunSummary {
        run_id,
        output_dir: output_dir.to_path_buf(),
        tasks: setup.task_count(),
        workers,
        wall_time_s: run.wall_time_s,
        tables,
    })
}
