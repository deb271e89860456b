//! Steady-flow initial state in physical and modal form.

use crate::basis::ModalBasis;
use crate::error::ModalResult;
use crate::params::PhysicalConstants;
use hf_core::ensure_all_finite;
use nalgebra::Vector4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialCondition {
    /// Physical state `(V0, P0, 0, Af*P0/At)`
    pub q: Vector4<f64>,
    /// Modal state `S^-1 q`
    pub w: Vector4<f64>,
}

impl InitialCondition {
    /// Uniform state before closure: velocity from the initial flow, pressure
    /// from the loss coefficient, wall at rest and carrying the end-cap load.
    pub fn from_constants(c: &PhysicalConstants, basis: &ModalBasis) -> ModalResult<Self> {
        let v0 = c.initial_flow / c.area_fluid;
        let p0 = c.loss_coefficient * 0.5 * c.fluid_density * v0 * v0.abs();
        let q = Vector4::new(v0, p0, 0.0, c.area_fluid * p0 / c.area_wall);
        let w = basis.to_modal(&q);
        ensure_all_finite(q.as_slice(), "initial physical state")?;
        ensure_all_finite(w.as_slice(), "initial modal state")?;
        Ok(Self { q, w })
    }

    /// Pair an already-projected state, e.g. one received in a broadcast.
    pub fn from_parts(q: Vector4<f64>, w: Vector4<f64>) -> Self {
        Self { q, w }
    }

    pub fn velocity(&self) -> f64 {
        self.q[0]
    }

    pub fn pressure(&self) -> f64 {
        self.q[1]
    }
}
