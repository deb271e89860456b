//! hf-core: shared foundation for hammerflow.
//!
//! Contains:
//! - units (uom SI types + constructors for pipe/fluid inputs)
//! - numeric (Real + tolerances + float helpers)
//! - ids (worker ranks)
//! - error (shared error types)
//! - timing (wall-clock timer for run summaries)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::{HfError, HfResult};
pub use ids::*;
pub use numeric::*;
pub use timing::Timer;
pub use units::*;
