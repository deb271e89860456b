//! Application service layer for hammerflow.
//!
//! Loads case files, derives the modal model, runs the task farm and persists
//! the output tables. The CLI is a thin shell over these functions.

pub mod config;
pub mod error;
pub mod run_service;

pub use config::{
    CaseConfig, FluidConfig, PipeConfig, RunConfig, ValveConfig, WallConfig, load_config,
    save_config,
};
pub use error::{AppError, AppResult};
pub use run_service::{
    BasisSummary, RunSummary, SOLVER_VERSION, build_setup, describe_basis, run_case,
};
