//! Boundary conditions at the reservoir and the valve.
//!
//! At each pipe end two characteristics arrive from the interior and two depart
//! into it. The departing pair follows from two linear constraints on the
//! physical state `q = S w`, written as `C q = b`.

use crate::error::{EvalError, EvalResult};
use hf_modal::ModelSetup;
use nalgebra::{Matrix2, Matrix2x4, Matrix4, Vector2, Vector4};

/// Modal indices travelling towards `x = L` (`l1`, `l3`).
pub const RIGHT_GOING: [usize; 2] = [0, 2];
/// Modal indices travelling towards `x = 0` (`l2`, `l4`).
pub const LEFT_GOING: [usize; 2] = [1, 3];

/// Relative valve opening `tau(t)`: linear closure over `closure_time`.
pub fn valve_opening(closure_time: f64, t: f64) -> f64 {
    if t <= 0.0 {
        1.0
    } else if closure_time <= 0.0 {
        0.0
    } else {
        (1.0 - t / closure_time).clamp(0.0, 1.0)
    }
}

/// Reservoir end: constant pressure `P0`, anchored wall (`u_dot = 0`).
pub fn upstream_target(setup: &ModelSetup) -> Vector2<f64> {
    Vector2::new(setup.initial.pressure(), 0.0)
}

/// Valve end: relative flow `V - u_dot` follows the opening, massless valve
/// balances `At sigma = Af P`.
pub fn downstream_target(setup: &ModelSetup, t: f64) -> Vector2<f64> {
    let cd = setup.discharge_coefficient;
    let opening = cd + (1.0 - cd) * valve_opening(setup.closure_time, t);
    Vector2::new(setup.initial.velocity() * opening, 0.0)
}

/// Linear boundary system solved for the departing characteristics.
#[derive(Debug, Clone)]
pub struct BoundarySystem {
    name: &'static str,
    departing: [usize; 2],
    arriving: [usize; 2],
    departing_inv: Matrix2<f64>,
    arriving_block: Matrix2<f64>,
}

impl BoundarySystem {
    pub fn upstream(setup: &ModelSetup) -> EvalResult<Self> {
        #[rustfmt::skip]
        let constraints = Matrix2x4::new(
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
        );
        Self::new("upstream", constraints, &setup.s, RIGHT_GOING, LEFT_GOING)
    }

    pub fn downstream(setup: &ModelSetup) -> EvalResult<Self> {
        #[rustfmt::skip]
        let constraints = Matrix2x4::new(
            1.0,  0.0,               -1.0, 0.0,
            0.0, -setup.area_fluid,   0.0, setup.area_wall,
        );
        Self::new("downstream", constraints, &setup.s, LEFT_GOING, RIGHT_GOING)
    }

    fn new(
        name: &'static str,
        constraints: Matrix2x4<f64>,
        s: &Matrix4<f64>,
        departing: [usize; 2],
        arriving: [usize; 2],
    ) -> EvalResult<Self> {
        let m = constraints * s;
        let pick =
            |cols: [usize; 2]| Matrix2::from_columns(&[m.column(cols[0]), m.column(cols[1])]);
        let departing_block = pick(departing);
        let arriving_block = pick(arriving);

        let det = departing_block.determinant();
        let bound = (departing_block[(0, 0)] * departing_block[(1, 1)]).abs()
            + (departing_block[(0, 1)] * departing_block[(1, 0)]).abs();
        if !(det.is_finite() && det.abs() > 1e-12 * bound) {
            return Err(EvalError::SingularBoundary { boundary: name });
        }
        let departing_inv = departing_block
            .try_inverse()
            .ok_or(EvalError::SingularBoundary { boundary: name })?;

        Ok(Self {
            name,
            departing,
            arriving,
            departing_inv,
            arriving_block,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Modal indices whose values come from the interior.
    pub fn arriving(&self) -> [usize; 2] {
        self.arriving
    }

    /// Complete the modal state from the arriving pair and the constraint target.
    pub fn solve(&self, arriving: Vector2<f64>, target: Vector2<f64>) -> Vector4<f64> {
        let departing = self.departing_inv * (target - self.arriving_block * arriving);
        let mut w = Vector4::zeros();
        for (slot, &k) in self.arriving.iter().enumerate() {
            w[k] = arriving[slot];
        }
        for (slot, &k) in self.departing.iter().enumerate() {
            w[k] = departing[slot];
        }
        w
    }
}
