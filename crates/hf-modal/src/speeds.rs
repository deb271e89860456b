//! Characteristic wave speeds.

use crate::error::{ModalError, ModalResult};
use crate::params::PhysicalConstants;
use hf_core::{Tolerances, ensure_positive, nearly_equal};

/// Four signed characteristic speeds `l1..l4` with `l2 = -l1`, `l4 = -l3`
/// and `0 < l1 <= l3`.
///
/// `l1` is the fluid-dominated speed, `l3` the faster wall-dominated (precursor) speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSpeeds {
    l1: f64,
    l3: f64,
}

impl WaveSpeeds {
    /// Solve `lambda^2 - g2*lambda + c2_f*c2_t = 0` for the two squared speeds.
    pub fn from_constants(c: &PhysicalConstants) -> ModalResult<Self> {
        Self::from_quadratic(c.g2, c.speed_product())
    }

    pub fn from_quadratic(g2: f64, product: f64) -> ModalResult<Self> {
        let discriminant = g2 * g2 - 4.0 * product;
        if !discriminant.is_finite() || discriminant < 0.0 {
            return Err(ModalError::NegativeDiscriminant { discriminant });
        }
        let l2_3 = 0.5 * (g2 + discriminant.sqrt());
        // Vieta's product avoids cancellation in the smaller root.
        let l2_1 = product / l2_3;

        let l1 = ensure_positive(l2_1, "squared wave speed l2_1")?.sqrt();
        let l3 = ensure_positive(l2_3, "squared wave speed l2_3")?.sqrt();
        Ok(Self { l1, l3 })
    }

    /// Rebuild from four signed speeds (e.g. a broadcast payload), checking the pairing.
    pub fn from_signed(values: [f64; 4]) -> ModalResult<Self> {
        let [l1, l2, l3, l4] = values;
        let tol = Tolerances::default();
        if !(l1 > 0.0 && l3 > 0.0 && l1.is_finite() && l3.is_finite()) {
            return Err(ModalError::InconsistentWaveSpeeds {
                what: format!("l1 and l3 must be positive and finite, got {l1}, {l3}"),
            });
        }
        if !nearly_equal(l2, -l1, tol) || !nearly_equal(l4, -l3, tol) {
            return Err(ModalError::InconsistentWaveSpeeds {
                what: format!("speeds are not +/- pairs: [{l1}, {l2}, {l3}, {l4}]"),
            });
        }
        if l1 > l3 {
            return Err(ModalError::InconsistentWaveSpeeds {
                what: format!("l1 = {l1} exceeds l3 = {l3}"),
            });
        }
        Ok(Self { l1, l3 })
    }

    pub fn l1(&self) -> f64 {
        self.l1
    }

    pub fn l2(&self) -> f64 {
        -self.l1
    }

    pub fn l3(&self) -> f64 {
        self.l3
    }

    pub fn l4(&self) -> f64 {
        -self.l3
    }

    /// Signed speeds in modal order.
    pub fn signed(&self) -> [f64; 4] {
        [self.l1, -self.l1, self.l3, -self.l3]
    }

    /// Fastest transit time over a pipe of the given length.
    pub fn min_transit_time(&self, length: f64) -> f64 {
        length / self.l3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ModelParameters;

    fn delft_speeds() -> (PhysicalConstants, WaveSpeeds) {
        let c = PhysicalConstants::from_parameters(&ModelParameters::delft()).unwrap();
        let speeds = WaveSpeeds::from_constants(&c).unwrap();
        (c, speeds)
    }

    #[test]
    fn speeds_are_signed_pairs() {
        let (_, w) = delft_speeds();
        assert_eq!(w.l2(), -w.l1());
        assert_eq!(w.l4(), -w.l3());
        assert!(w.l1() <= w.l3());
    }

    #[test]
    fn squared_speeds_are_quadratic_roots() {
        let (c, w) = delft_speeds();
        for l in [w.l1(), w.l3()] {
            let lam = l * l;
            let residual = lam * lam - c.g2 * lam + c.speed_product();
            let scale = lam * lam + c.g2 * lam + c.speed_product();
            assert!(residual.abs() / scale < 1e-12, "residual {residual}");
        }
    }

    #[test]
    fn delft_speeds_bracket_uncoupled_speeds() {
        let (c, w) = delft_speeds();
        assert!(w.l1() < c.c2_f.sqrt());
        assert!(w.l3() > c.c2_t.sqrt());
        assert!((w.l1() - 1030.6).abs() < 0.5);
        assert!((w.l3() - 5245.2).abs() < 0.5);
    }

    #[test]
    fn negative_discriminant_is_an_error() {
        let err = WaveSpeeds::from_quadratic(1.0, 1.0).unwrap_err();
        assert!(matches!(err, ModalError::NegativeDiscriminant { .. }));
    }

    #[test]
    fn from_signed_checks_pairing() {
        let (_, w) = delft_speeds();
        assert_eq!(WaveSpeeds::from_signed(w.signed()).unwrap(), w);

        let mut broken = w.signed();
        broken[1] = w.l1();
        assert!(WaveSpeeds::from_signed(broken).is_err());

        assert!(WaveSpeeds::from_signed([5.0, -5.0, 1.0, -1.0]).is_err());
    }
}
