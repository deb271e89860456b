//! Delay-line solution of the linear four-equation system.
//!
//! In modal variables the system decouples into four advection equations
//! `w_k,t + l_k w_k,x = 0`, so every characteristic keeps its value along
//! `x - l_k t = const`. The state at a point is assembled by tracing each
//! characteristic back to the initial state or to the boundary it left.
//! Boundary values are themselves built up by marching both pipe ends forward
//! on a fixed step and reading arriving waves at their retarded times.

use crate::boundary::{BoundarySystem, downstream_target, upstream_target};
use crate::error::{EvalError, EvalResult};
use crate::{PointEvaluator, Probe};
use hf_core::ensure_all_finite;
use hf_modal::ModelSetup;
use nalgebra::{Vector2, Vector4};
use tracing::trace;

pub const DEFAULT_SAMPLES_PER_TRANSIT: usize = 16;

/// Upper bound on boundary samples per evaluation.
const MAX_HISTORY_SAMPLES: usize = 20_000_000;

/// Evaluator that reconstructs boundary histories on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicEvaluator {
    samples_per_transit: usize,
}

impl Default for CharacteristicEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLES_PER_TRANSIT)
    }
}

impl CharacteristicEvaluator {
    /// `samples_per_transit` boundary samples per fastest-wave transit `L/l3`.
    pub fn new(samples_per_transit: usize) -> Self {
        Self {
            samples_per_transit: samples_per_transit.max(1),
        }
    }

    pub fn samples_per_transit(&self) -> usize {
        self.samples_per_transit
    }

    fn step(&self, setup: &ModelSetup) -> f64 {
        setup.speeds.min_transit_time(setup.length) / self.samples_per_transit as f64
    }

    /// March both pipe ends from `0` up to (at least) `t`.
    fn march(&self, setup: &ModelSetup, t: f64) -> EvalResult<Histories> {
        let step = self.step(setup);
        let steps = (t / step).ceil();
        if !steps.is_finite() || steps >= MAX_HISTORY_SAMPLES as f64 {
            return Err(EvalError::InvalidTime { t });
        }
        let steps = steps as usize;

        let upstream = BoundarySystem::upstream(setup)?;
        let downstream = BoundarySystem::downstream(setup)?;
        let up_target = upstream_target(setup);
        let speeds = setup.speeds.signed();
        let delays = speeds.map(|l| setup.length / l.abs());

        let mut histories = Histories {
            step,
            initial: setup.initial.w,
            upstream: Vec::with_capacity(steps + 1),
            downstream: Vec::with_capacity(steps + 1),
        };

        for i in 0..=steps {
            let s = i as f64 * step;

            let [a, b] = upstream.arriving();
            let arriving = Vector2::new(
                histories.downstream_mode(a, s - delays[a])?,
                histories.downstream_mode(b, s - delays[b])?,
            );
            let w_up = upstream.solve(arriving, up_target);

            let [a, b] = downstream.arriving();
            let arriving = Vector2::new(
                histories.upstream_mode(a, s - delays[a])?,
                histories.upstream_mode(b, s - delays[b])?,
            );
            let w_down = downstream.solve(arriving, downstream_target(setup, s));

            histories.upstream.push(w_up);
            histories.downstream.push(w_down);
        }

        trace!(samples = steps + 1, step, "boundary histories marched");
        Ok(histories)
    }
}

impl PointEvaluator for CharacteristicEvaluator {
    fn evaluate(&self, setup: &ModelSetup, probe: Probe, t: f64) -> EvalResult<Vector4<f64>> {
        if !t.is_finite() || t < 0.0 {
            return Err(EvalError::InvalidTime { t });
        }
        let x = probe.position(setup.length);
        if !x.is_finite() || !(0.0..=setup.length).contains(&x) {
            return Err(EvalError::ProbeOutsidePipe {
                x,
                length: setup.length,
            });
        }

        let histories = self.march(setup, t)?;
        let speeds = setup.speeds.signed();

        let w = match probe {
            Probe::Upstream => {
                let system = BoundarySystem::upstream(setup)?;
                let [a, b] = system.arriving();
                let arriving = Vector2::new(
                    histories.downstream_mode(a, t - setup.length / speeds[a].abs())?,
                    histories.downstream_mode(b, t - setup.length / speeds[b].abs())?,
                );
                system.solve(arriving, upstream_target(setup))
            }
            Probe::Downstream => {
                let system = BoundarySystem::downstream(setup)?;
                let [a, b] = system.arriving();
                let arriving = Vector2::new(
                    histories.upstream_mode(a, t - setup.length / speeds[a])?,
                    histories.upstream_mode(b, t - setup.length / speeds[b])?,
                );
                system.solve(arriving, downstream_target(setup, t))
            }
            Probe::Interior(x) => {
                let mut w = Vector4::zeros();
                for (k, &l) in speeds.iter().enumerate() {
                    w[k] = if l > 0.0 {
                        histories.upstream_mode(k, t - x / l)?
                    } else {
                        histories.downstream_mode(k, t - (setup.length - x) / l.abs())?
                    };
                }
                w
            }
        };

        ensure_all_finite(w.as_slice(), "modal state")?;
        Ok(w)
    }
}

/// Sampled modal states at both pipe ends on a uniform step.
struct Histories {
    step: f64,
    initial: Vector4<f64>,
    upstream: Vec<Vector4<f64>>,
    downstream: Vec<Vector4<f64>>,
}

impl Histories {
    fn upstream_mode(&self, k: usize, time: f64) -> EvalResult<f64> {
        sample(&self.upstream, self.step, &self.initial, k, time)
    }

    fn downstream_mode(&self, k: usize, time: f64) -> EvalResult<f64> {
        sample(&self.downstream, self.step, &self.initial, k, time)
    }
}

/// Mode `k` of a boundary history at `time`; the initial state before any wave left.
fn sample(
    history: &[Vector4<f64>],
    step: f64,
    initial: &Vector4<f64>,
    k: usize,
    time: f64,
) -> EvalResult<f64> {
    if time <= 0.0 {
        return Ok(initial[k]);
    }
    let position = time / step;
    let lower = position.floor() as usize;
    let frac = position - position.floor();
    match (history.get(lower), history.get(lower + 1)) {
        (Some(a), Some(b)) => Ok(a[k] + frac * (b[k] - a[k])),
        (Some(a), None) => Ok(a[k]),
        _ => Err(EvalError::HistoryGap { time }),
    }
}
