//! Pipe, wall, fluid and valve parameters.

use crate::error::{ModalError, ModalResult};
use hf_core::units::{
    Density, Length, Pressure, Ratio, Time, VolumeRate, kg_per_m3, m, m3ps, pa, s, unitless,
};
use hf_core::{ensure_finite, ensure_positive};
use std::f64::consts::PI;

/// Physical description of a single straight, liquid-filled pipe with a valve
/// at its downstream end.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    /// Pipe length `L`
    pub length: Length,
    /// Inner radius `R`
    pub radius: Length,
    /// Wall thickness `e`
    pub wall_thickness: Length,
    /// Young's modulus of the wall material `E`
    pub youngs_modulus: Pressure,
    /// Wall density `rho_t`
    pub wall_density: Density,
    /// Poisson ratio `nu`
    pub poisson_ratio: Ratio,
    /// Fluid bulk modulus `K`
    pub bulk_modulus: Pressure,
    /// Fluid density `rho_f`
    pub fluid_density: Density,
    /// Valve closure duration `Tc` (0 = instantaneous)
    pub closure_time: Time,
    /// Steady flow before closure `Q0`
    pub initial_flow: VolumeRate,
    /// Loss coefficient setting the initial pressure `zeta0`
    pub loss_coefficient: Ratio,
    /// Residual discharge through the closed valve, as a fraction of `Q0`
    pub discharge_coefficient: Ratio,
}

impl ModelParameters {
    /// Delft Hydraulics water-hammer benchmark: 20 m steel pipe, water, 30 ms closure.
    pub fn delft() -> Self {
        Self {
            length: m(20.0),
            radius: m(398.5e-3),
            wall_thickness: m(8e-3),
            youngs_modulus: pa(210e9),
            wall_density: kg_per_m3(7985.0),
            poisson_ratio: unitless(0.29),
            bulk_modulus: pa(2.14e9),
            fluid_density: kg_per_m3(998.0),
            closure_time: s(0.03),
            initial_flow: m3ps(0.5),
            loss_coefficient: unitless(0.2),
            discharge_coefficient: unitless(0.0),
        }
    }

    /// Check ranges; every derivation starts here.
    pub fn validate(&self) -> ModalResult<()> {
        ensure_positive(self.length.value, "pipe length")?;
        ensure_positive(self.radius.value, "pipe radius")?;
        ensure_positive(self.wall_thickness.value, "wall thickness")?;
        ensure_positive(self.youngs_modulus.value, "Young's modulus")?;
        ensure_positive(self.wall_density.value, "wall density")?;
        ensure_positive(self.bulk_modulus.value, "bulk modulus")?;
        ensure_positive(self.fluid_density.value, "fluid density")?;
        ensure_finite(self.initial_flow.value, "initial flow")?;
        ensure_finite(self.loss_coefficient.value, "loss coefficient")?;

        let nu = ensure_finite(self.poisson_ratio.value, "Poisson ratio")?;
        if !(0.0..0.5).contains(&nu) {
            return Err(ModalError::parameter(format!(
                "Poisson ratio must lie in [0, 0.5), got {nu}"
            )));
        }
        let tc = ensure_finite(self.closure_time.value, "closure time")?;
        if tc < 0.0 {
            return Err(ModalError::parameter(format!(
                "closure time must be non-negative, got {tc}"
            )));
        }
        let cd = ensure_finite(self.discharge_coefficient.value, "discharge coefficient")?;
        if !(0.0..=1.0).contains(&cd) {
            return Err(ModalError::parameter(format!(
                "discharge coefficient must lie in [0, 1], got {cd}"
            )));
        }
        Ok(())
    }
}

/// SI scalars derived from [`ModelParameters`], shared by the basis builder
/// and the initial condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    pub length: f64,
    pub radius: f64,
    pub wall_thickness: f64,
    pub youngs_modulus: f64,
    pub wall_density: f64,
    pub poisson_ratio: f64,
    pub bulk_modulus: f64,
    pub fluid_density: f64,
    pub closure_time: f64,
    pub initial_flow: f64,
    pub loss_coefficient: f64,
    pub discharge_coefficient: f64,
    /// Fluid cross-section `Af`
    pub area_fluid: f64,
    /// Wall cross-section `At`
    pub area_wall: f64,
    /// Squared fluid wave speed including wall compliance
    pub c2_f: f64,
    /// Squared axial wave speed in the wall
    pub c2_t: f64,
    /// Linear coefficient of the wave-speed quadratic
    pub g2: f64,
}

impl PhysicalConstants {
    pub fn from_parameters(params: &ModelParameters) -> ModalResult<Self> {
        params.validate()?;

        let r = params.radius.value;
        let e = params.wall_thickness.value;
        let young = params.youngs_modulus.value;
        let rho_t = params.wall_density.value;
        let nu = params.poisson_ratio.value;
        let k = params.bulk_modulus.value;
        let rho_f = params.fluid_density.value;

        let area_fluid = PI * r * r;
        let area_wall = PI * ((r + e).powi(2) - r * r);

        let c2_f = 1.0 / (rho_f * (1.0 / k + 2.0 * r * (1.0 - nu * nu) / (young * e)));
        let c2_t = young / rho_t;
        let g2 = c2_f + c2_t + 2.0 * nu * nu * (rho_f / rho_t) * r * c2_f / e;

        Ok(Self {
            length: params.length.value,
            radius: r,
            wall_thickness: e,
            youngs_modulus: young,
            wall_density: rho_t,
            poisson_ratio: nu,
            bulk_modulus: k,
            fluid_density: rho_f,
            closure_time: params.closure_time.value,
            initial_flow: params.initial_flow.value,
            loss_coefficient: params.loss_coefficient.value,
            discharge_coefficient: params.discharge_coefficient.value,
            area_fluid: ensure_positive(area_fluid, "fluid area")?,
            area_wall: ensure_positive(area_wall, "wall area")?,
            c2_f: ensure_positive(c2_f, "fluid wave speed squared")?,
            c2_t: ensure_positive(c2_t, "wall wave speed squared")?,
            g2: ensure_finite(g2, "quadratic coefficient g2")?,
        })
    }

    /// Product `c2_f * c2_t`, the constant term of the wave-speed quadratic.
    pub fn speed_product(&self) -> f64 {
        self.c2_f * self.c2_t
    }
}
