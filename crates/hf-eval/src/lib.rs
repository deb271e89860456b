//! Point evaluation of the characteristic solution.
//!
//! A [`PointEvaluator`] turns `(setup, probe, t)` into the four modal variables at
//! that space-time point. Evaluators must be pure: workers call them in any
//! order and on any thread.

pub mod boundary;
pub mod delay_line;
pub mod error;

pub use delay_line::CharacteristicEvaluator;
pub use error::{EvalError, EvalResult};

use hf_modal::ModelSetup;
use nalgebra::Vector4;

/// Where along the pipe a characteristic state is requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe {
    /// Reservoir end, `x = 0`
    Upstream,
    /// Valve end, `x = L`
    Downstream,
    /// Interior point `0 < x < L`
    Interior(f64),
}

impl Probe {
    pub fn position(&self, length: f64) -> f64 {
        match *self {
            Probe::Upstream => 0.0,
            Probe::Downstream => length,
            Probe::Interior(x) => x,
        }
    }
}

/// Characteristic-variable state at a fixed point and time.
pub trait PointEvaluator {
    fn evaluate(&self, setup: &ModelSetup, probe: Probe, t: f64) -> EvalResult<Vector4<f64>>;
}
