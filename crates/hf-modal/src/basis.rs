//! Closed-form modal basis of the coupled fluid/pipe-wall system.

use crate::error::{ModalError, ModalResult};
use crate::initial::InitialCondition;
use crate::params::{ModelParameters, PhysicalConstants};
use crate::speeds::WaveSpeeds;
use nalgebra::{Matrix4, RowVector4, Vector4};

/// Scaled determinant below which `T*A` is treated as singular.
const SINGULAR_TOL: f64 = 1e-10;

/// System operators `(A, B)` of `A q_t + B q_x = 0` for `q = (V, P, u_dot, sigma)`.
///
/// Rows: fluid momentum, fluid continuity (with Poisson coupling to the axial
/// stress), wall momentum, wall constitutive law (with Poisson coupling to the
/// pressure).
pub fn system_operators(c: &PhysicalConstants) -> (Matrix4<f64>, Matrix4<f64>) {
    let rho_f = c.fluid_density;
    let rho_t = c.wall_density;
    let nu = c.poisson_ratio;
    let young = c.youngs_modulus;
    let hoop = c.radius / (young * c.wall_thickness);

    #[rustfmt::skip]
    let a = Matrix4::new(
        1.0, 0.0,                                          0.0, 0.0,
        0.0, 1.0 / (rho_f * c.c2_f) + 2.0 * nu * nu * hoop, 0.0, -2.0 * nu / young,
        0.0, 0.0,                                          1.0, 0.0,
        0.0, nu * hoop,                                    0.0, -1.0 / (rho_t * c.c2_t),
    );
    #[rustfmt::skip]
    let b = Matrix4::new(
        0.0, 1.0 / rho_f, 0.0, 0.0,
        1.0, 0.0,         0.0, 0.0,
        0.0, 0.0,         0.0, -1.0 / rho_t,
        0.0, 0.0,         1.0, 0.0,
    );
    (a, b)
}

/// Left eigenvectors `T` with `T_k B = l_k T_k A`, one row per signed speed.
///
/// Fluid-dominated rows are normalized on the velocity entry, wall-dominated
/// rows on the wall-velocity entry. Both normalizations divide by a quantity
/// that vanishes when the waves decouple (`nu = 0`), which surfaces as a
/// singular transform.
pub fn left_eigenvectors(c: &PhysicalConstants, speeds: &WaveSpeeds) -> ModalResult<Matrix4<f64>> {
    let nu = c.poisson_ratio;
    let mut t = Matrix4::zeros();

    for (row, l) in [(0, speeds.l1()), (1, speeds.l2())] {
        let ck = 2.0 * nu / (c.c2_t / (l * l) - 1.0);
        t.set_row(row, &RowVector4::new(1.0, l, ck, l * ck));
    }
    for (row, l) in [(2, speeds.l3()), (3, speeds.l4())] {
        let ak = (c.c2_t - l * l) / (2.0 * nu * l * l);
        t.set_row(row, &RowVector4::new(ak, l * ak, 1.0, l));
    }

    if t.iter().any(|v| !v.is_finite()) {
        return Err(ModalError::SingularTransform {
            scaled_det: f64::NAN,
        });
    }
    Ok(t)
}

/// Determinant after column equilibration, relative to the Hadamard bound.
///
/// The physical variables differ by many orders of magnitude, so the raw
/// determinant says nothing about conditioning; this ratio lies in `[-1, 1]`.
fn scaled_determinant(m: &Matrix4<f64>) -> f64 {
    let mut scaled = *m;
    for mut col in scaled.column_iter_mut() {
        let max = col.amax();
        if max > 0.0 {
            col /= max;
        }
    }
    let hadamard: f64 = scaled.row_iter().map(|r| r.norm()).product();
    if hadamard == 0.0 || !hadamard.is_finite() {
        return 0.0;
    }
    scaled.determinant() / hadamard
}

/// Modal basis: `S` maps modal to physical variables, `S^-1 = T*A` maps back.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalBasis {
    s: Matrix4<f64>,
    s_inv: Matrix4<f64>,
}

impl ModalBasis {
    /// Invert the characteristic transform `T*A`.
    pub fn from_transform(transform: Matrix4<f64>) -> ModalResult<Self> {
        let scaled_det = scaled_determinant(&transform);
        if !scaled_det.is_finite() || scaled_det.abs() < SINGULAR_TOL {
            return Err(ModalError::SingularTransform { scaled_det });
        }
        let s = transform
            .try_inverse()
            .ok_or(ModalError::SingularTransform { scaled_det })?;
        if s.iter().any(|v| !v.is_finite()) {
            return Err(ModalError::SingularTransform { scaled_det });
        }
        Ok(Self {
            s,
            s_inv: transform,
        })
    }

    pub fn s(&self) -> &Matrix4<f64> {
        &self.s
    }

    pub fn s_inv(&self) -> &Matrix4<f64> {
        &self.s_inv
    }

    pub fn to_physical(&self, w: &Vector4<f64>) -> Vector4<f64> {
        self.s * w
    }

    pub fn to_modal(&self, q: &Vector4<f64>) -> Vector4<f64> {
        self.s_inv * q
    }

    /// Largest entry of `|S S^-1 - I|`, each relative to `sum_k |S_ik| |S^-1_kj|`.
    pub fn identity_residual(&self) -> f64 {
        let product = self.s * self.s_inv;
        let magnitude = self.s.abs() * self.s_inv.abs();
        let mut worst: f64 = 0.0;
        for i in 0..4 {
            for j in 0..4 {
                let target = if i == j { 1.0 } else { 0.0 };
                let scale = magnitude[(i, j)].max(f64::MIN_POSITIVE);
                worst = worst.max((product[(i, j)] - target).abs() / scale);
            }
        }
        worst
    }
}

/// Everything the coordinator derives once from [`ModelParameters`].
#[derive(Debug, Clone)]
pub struct ModalModel {
    pub constants: PhysicalConstants,
    pub speeds: WaveSpeeds,
    pub basis: ModalBasis,
    pub initial: InitialCondition,
}

impl ModalModel {
    pub fn derive(params: &ModelParameters) -> ModalResult<Self> {
        let constants = PhysicalConstants::from_parameters(params)?;
        let speeds = WaveSpeeds::from_constants(&constants)?;
        let (a, _b) = system_operators(&constants);
        let t = left_eigenvectors(&constants, &speeds)?;
        let basis = ModalBasis::from_transform(t * a)?;
        let initial = InitialCondition::from_constants(&constants, &basis)?;

        tracing::info!(
            l1 = speeds.l1(),
            l3 = speeds.l3(),
            area_fluid = constants.area_fluid,
            area_wall = constants.area_wall,
            "derived modal basis"
        );

        Ok(Self {
            constants,
            speeds,
            basis,
            initial,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_core::unitless;

    fn delft() -> ModalModel {
        ModalModel::derive(&ModelParameters::delft()).unwrap()
    }

    #[test]
    fn rows_are_left_eigenvectors() {
        let model = delft();
        let (a, b) = system_operators(&model.constants);
        let t = left_eigenvectors(&model.constants, &model.speeds).unwrap();
        for (k, l) in model.speeds.signed().into_iter().enumerate() {
            let row = t.row(k);
            let lhs = row * b;
            let rhs = row * a * l;
            for j in 0..4 {
                let scale = lhs[j].abs() + rhs[j].abs() + 1e-300;
                assert!(
                    (lhs[j] - rhs[j]).abs() / scale < 1e-10,
                    "row {k} col {j}: {} vs {}",
                    lhs[j],
                    rhs[j]
                );
            }
        }
    }

    #[test]
    fn wall_rows_have_unit_wall_velocity_entry() {
        let model = delft();
        let t = left_eigenvectors(&model.constants, &model.speeds).unwrap();
        for (row, l) in [(2, model.speeds.l3()), (3, model.speeds.l4())] {
            assert_eq!(t[(row, 2)], 1.0);
            assert_eq!(t[(row, 3)], l);
        }
        for (row, l) in [(0, model.speeds.l1()), (1, model.speeds.l2())] {
            assert_eq!(t[(row, 0)], 1.0);
            assert_eq!(t[(row, 1)], l);
        }
    }

    #[test]
    fn basis_is_well_conditioned_for_delft() {
        let model = delft();
        let (a, _) = system_operators(&model.constants);
        let t = left_eigenvectors(&model.constants, &model.speeds).unwrap();
        assert!(scaled_determinant(&(t * a)).abs() > 0.5);
    }

    #[test]
    fn s_times_inverse_is_identity() {
        let model = delft();
        assert!(model.basis.identity_residual() < 1e-9);
    }

    #[test]
    fn modal_round_trip() {
        let model = delft();
        let q = Vector4::new(1.6, 2.5e4, -0.03, 7.1e5);
        let back = model.basis.to_physical(&model.basis.to_modal(&q));
        for i in 0..4 {
            assert!((back[i] - q[i]).abs() <= 1e-9 * q[i].abs().max(1.0));
        }
    }

    #[test]
    fn decoupled_model_is_degenerate() {
        let mut p = ModelParameters::delft();
        p.poisson_ratio = unitless(0.0);
        let err = ModalModel::derive(&p).unwrap_err();
        assert!(matches!(err, ModalError::SingularTransform { .. }));
    }

    #[test]
    fn zero_transform_is_singular() {
        let err = ModalBasis::from_transform(Matrix4::zeros()).unwrap_err();
        assert!(matches!(err, ModalError::SingularTransform { .. }));
    }

    #[test]
    fn rank_deficient_transform_is_singular() {
        #[rustfmt::skip]
        let m = Matrix4::new(
            1.0, 2.0, 3.0, 4.0,
            2.0, 4.0, 6.0, 8.0,
            0.0, 1.0, 0.0, 1.0,
            1.0, 0.0, 1.0, 0.0,
        );
        assert!(ModalBasis::from_transform(m).is_err());
    }
}
