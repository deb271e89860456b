use hf_app::*;
use hf_results::{
    DOWNSTREAM_FILE, MANIFEST_FILE, PROBE_FILE, RunStore, TIME_FILE, UPSTREAM_FILE, compute_run_id,
};

fn short_case(workers: usize) -> CaseConfig {
    let mut config = CaseConfig::default();
    config.run.t_end_s = 0.04;
    config.run.dt_s = 0.002;
    config.run.workers = workers;
    config
}

#[test]
fn run_writes_tables_and_manifest() {
    let temp_dir = std::env::temp_dir().join("hf_app_run_case");
    let _ = std::fs::remove_dir_all(&temp_dir);

    let config = short_case(3);
    let summary = run_case(&config, &temp_dir).unwrap();
    assert_eq!(summary.tasks, 21);
    assert_eq!(summary.workers, 3);
    assert_eq!(summary.failed_tables().count(), 0);
    assert_eq!(summary.run_id, compute_run_id(&config, SOLVER_VERSION));

    for file in [TIME_FILE, UPSTREAM_FILE, DOWNSTREAM_FILE, PROBE_FILE, MANIFEST_FILE] {
        assert!(temp_dir.join(file).exists(), "{file} missing");
    }

    let store = RunStore::new(temp_dir).unwrap();
    let manifest = store.load_manifest().unwrap();
    assert_eq!(manifest.run_id, summary.run_id);
    assert_eq!(manifest.tasks, 21);
    assert_eq!(manifest.tables.len(), 4);

    assert_eq!(store.load_time().unwrap().len(), 21);

    // Reservoir pressure is held; valve pressure rises during closure.
    let upstream = store.load_station(UPSTREAM_FILE).unwrap();
    let downstream = store.load_station(DOWNSTREAM_FILE).unwrap();
    let p0 = upstream[(1, 0)];
    assert!(p0 > 0.0);
    for col in 0..upstream.ncols() {
        assert!((upstream[(1, col)] - p0).abs() <= 1e-6 * p0);
    }
    let peak = downstream.row(1).max();
    assert!(peak > p0 + 1e5);
}

#[test]
fn results_do_not_depend_on_worker_count() {
    let dir_a = std::env::temp_dir().join("hf_app_workers_1");
    let dir_b = std::env::temp_dir().join("hf_app_workers_4");
    let _ = std::fs::remove_dir_all(&dir_a);
    let _ = std::fs::remove_dir_all(&dir_b);

    run_case(&short_case(1), &dir_a).unwrap();
    run_case(&short_case(4), &dir_b).unwrap();

    for file in [TIME_FILE, UPSTREAM_FILE, DOWNSTREAM_FILE, PROBE_FILE] {
        let a = std::fs::read_to_string(dir_a.join(file)).unwrap();
        let b = std::fs::read_to_string(dir_b.join(file)).unwrap();
        assert_eq!(a, b, "{file} differs");
    }
}

#[test]
fn config_file_round_trip() {
    let temp_dir = std::env::temp_dir().join("hf_app_config");
    let _ = std::fs::remove_dir_all(&temp_dir);
    std::fs::create_dir_all(&temp_dir).unwrap();

    let path = temp_dir.join("case.yaml");
    let config = short_case(2);
    save_config(&path, &config).unwrap();
    assert_eq!(load_config(&path).unwrap(), config);

    assert!(matches!(
        load_config(&temp_dir.join("missing.yaml")),
        Err(AppError::ConfigRead { .. })
    ));
}

#[test]
fn degenerate_wall_is_reported_before_running() {
    let mut config = short_case(2);
    config.wall.poisson_ratio = 0.0;
    let temp_dir = std::env::temp_dir().join("hf_app_degenerate");
    let _ = std::fs::remove_dir_all(&temp_dir);
    assert!(matches!(run_case(&config, &temp_dir), Err(AppError::Model(_))));
    assert!(!temp_dir.join(TIME_FILE).exists());
}

#[test]
fn basis_summary_is_consistent() {
    let summary = describe_basis(&CaseConfig::default()).unwrap();
    assert!(summary.identity_residual < 1e-9);
    assert_eq!(summary.speeds[1], -summary.speeds[0]);
    let back = summary.s * summary.w_initial;
    for k in 0..4 {
        let tol = 1e-6 * summary.q_initial[k].abs().max(1.0);
        assert!((back[k] - summary.q_initial[k]).abs() <= tol);
    }
}

#[test]
fn unwritable_output_dir_keeps_the_run() {
    let temp_dir = std::env::temp_dir().join("hf_app_blocked_output");
    let _ = std::fs::remove_dir_all(&temp_dir);
    std::fs::create_dir_all(&temp_dir).unwrap();
    let blocker = temp_dir.join("not_a_dir");
    std::fs::write(&blocker, "occupied").unwrap();

    let summary = run_case(&short_case(2), &blocker.join("out")).unwrap();
    assert_eq!(summary.tasks, 21);
    let failed: Vec<&str> = summary.failed_tables().map(|t| t.file()).collect();
    assert_eq!(failed, vec![TIME_FILE, UPSTREAM_FILE, DOWNSTREAM_FILE, PROBE_FILE]);
}
