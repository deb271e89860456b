//! Output directory API.
//!
//! Station tables are plain text: one header line with the physical variable
//! names, then one tab-delimited row of four values per time sample.

use crate::types::{MANIFEST_FILE, RunManifest, TIME_FILE, TableOutcome};
use crate::{ResultsError, ResultsResult};
use hf_modal::PHYSICAL_LABELS;
use nalgebra::{Matrix4xX, Vector4};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// `time.dat`: one instant per line.
    pub fn write_time(&self, instants: &[f64]) -> TableOutcome {
        let mut content = String::new();
        for t in instants {
            let _ = writeln!(content, "{t}");
        }
        self.write_table(TIME_FILE, &content, instants.len())
    }

    /// A station table with one row per column of `states`.
    pub fn write_station(&self, file: &str, states: &Matrix4xX<f64>) -> TableOutcome {
        let mut content = PHYSICAL_LABELS.join("\t");
        content.push('\n');
        for column in states.column_iter() {
            let _ = writeln!(
                content,
                "{}\t{}\t{}\t{}",
                column[0], column[1], column[2], column[3]
            );
        }
        self.write_table(file, &content, states.ncols())
    }

    fn write_table(&self, file: &str, content: &str, rows: usize) -> TableOutcome {
        let path = self.root_dir.join(file);
        match fs::write(&path, content) {
            Ok(()) => {
                debug!(file, rows, "table written");
                TableOutcome::Written {
                    file: file.to_string(),
                    rows,
                }
            }
            Err(err) => {
                warn!(file, %err, "failed to write table");
                TableOutcome::Failed {
                    file: file.to_string(),
                    reason: err.to_string(),
                }
            }
        }
    }

    pub fn save_manifest(&self, manifest: &RunManifest) -> ResultsResult<()> {
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.root_dir.join(MANIFEST_FILE), json)?;
        Ok(())
    }

    pub fn load_manifest(&self) -> ResultsResult<RunManifest> {
        let content = fs::read_to_string(self.root_dir.join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_time(&self) -> ResultsResult<Vec<f64>> {
        let content = fs::read_to_string(self.root_dir.join(TIME_FILE))?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| parse_value(TIME_FILE, line))
            .collect()
    }

    pub fn load_station(&self, file: &str) -> ResultsResult<Matrix4xX<f64>> {
        let content = fs::read_to_string(self.root_dir.join(file))?;
        let mut lines = content.lines();
        let header = lines.next().unwrap_or_default();
        if header.split('\t').ne(PHYSICAL_LABELS) {
            return Err(ResultsError::MalformedTable {
                file: file.to_string(),
                message: format!("unexpected header {header:?}"),
            });
        }

        let mut columns = Vec::new();
        for line in lines.filter(|line| !line.trim().is_empty()) {
            let values = line
                .split('\t')
                .map(|v| parse_value(file, v))
                .collect::<ResultsResult<Vec<f64>>>()?;
            if values.len() != 4 {
                return Err(ResultsError::MalformedTable {
                    file: file.to_string(),
                    message: format!("row has {} values", values.len()),
                });
            }
            columns.push(Vector4::from_column_slice(&values));
        }
        Ok(Matrix4xX::from_columns(&columns))
    }
}

fn parse_value(file: &str, raw: &str) -> ResultsResult<f64> {
    raw.trim()
        .parse()
        .map_err(|_| ResultsError::MalformedTable {
            file: file.to_string(),
            message: format!("cannot parse {raw:?} as a number"),
        })
}
