//! Coordinator/worker task farm over the evaluation time grid.
//!
//! One coordinator owns the schedule and the output tables; each worker holds
//! its own decoded copy of the [`hf_modal::ModelSetup`] and answers one time
//! index at a time. Transport is abstracted behind [`CoordinatorLink`] and
//! [`WorkerLink`]; [`run_threaded`] runs the farm on scoped threads.

pub mod assembler;
pub mod coordinator;
pub mod error;
pub mod link;
pub mod message;
pub mod report;
pub mod runner;
pub mod wire;
pub mod worker;

pub use assembler::{ResultAssembler, StationSeries, TimeSeries};
pub use coordinator::Coordinator;
pub use error::{FarmError, FarmResult, ProtocolViolation};
pub use link::{ChannelCoordinator, ChannelWorker, CoordinatorLink, WorkerLink, channel_links};
pub use message::{CoordinatorMessage, WorkerMessage};
pub use report::{Dispatch, DispatchTrigger, FarmReport};
pub use runner::{FarmRun, run_threaded};
pub use wire::{RESULT_LEN, ResultPacket, decode_setup, encode_setup, setup_len};
pub use worker::{WorkerSummary, evaluate_task, run_worker};
