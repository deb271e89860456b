//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

pub const TIME_FILE: &str = "time.dat";
pub const UPSTREAM_FILE: &str = "x0.dat";
pub const DOWNSTREAM_FILE: &str = "xL.dat";
pub const PROBE_FILE: &str = "xtest.dat";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub timestamp: String,
    pub solver_version: String,
    pub workers: usize,
    pub tasks: usize,
    pub dt_s: f64,
    pub t_end_s: f64,
    pub probe_x_m: f64,
    pub wall_time_s: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<TableOutcome>,
}

/// What happened to one output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    Written { file: String, rows: usize },
    Failed { file: String, reason: String },
}

impl TableOutcome {
    pub fn file(&self) -> &str {
        match self {
            TableOutcome::Written { file, .. } | TableOutcome::Failed { file, .. } => file,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, TableOutcome::Written { .. })
    }
}
