//! Uniform evaluation instants.

use crate::error::{ModalError, ModalResult};
use hf_core::{ensure_finite, ensure_positive};

/// Upper bound on the number of samples a single run may request.
const MAX_SAMPLES: f64 = 1e8;

/// Instants `t_i = i*dt` for `i` in `[0, N]`, `N = ceil(t_end/dt)`.
///
/// The index of an instant is the task id handed to workers.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    dt: f64,
    instants: Vec<f64>,
}

impl TimeGrid {
    pub fn new(t_end: f64, dt: f64) -> ModalResult<Self> {
        let dt = ensure_positive(dt, "time step")?;
        let t_end = ensure_finite(t_end, "end time")?;
        if t_end < 0.0 {
            return Err(ModalError::grid(format!(
                "end time must be non-negative, got {t_end}"
            )));
        }
        let steps = (t_end / dt).ceil();
        if steps > MAX_SAMPLES {
            return Err(ModalError::grid(format!(
                "{steps} steps requested (t_end={t_end}, dt={dt})"
            )));
        }
        let n = steps as usize;
        let instants = (0..=n).map(|i| i as f64 * dt).collect();
        Ok(Self { dt, instants })
    }

    /// Rebuild a grid from its instants (first must be 0, strictly increasing).
    pub fn from_instants(instants: Vec<f64>) -> ModalResult<Self> {
        match instants.first() {
            None => return Err(ModalError::grid("no instants")),
            Some(&t0) if t0 != 0.0 => {
                return Err(ModalError::grid(format!("first instant is {t0}, not 0")));
            }
            Some(_) => {}
        }
        for pair in instants.windows(2) {
            if pair[1] <= pair[0] || !pair[1].is_finite() {
                return Err(ModalError::grid(format!(
                    "instants not strictly increasing at {} -> {}",
                    pair[0], pair[1]
                )));
            }
        }
        let dt = if instants.len() > 1 { instants[1] } else { 0.0 };
        Ok(Self { dt, instants })
    }

    /// `N`, the index of the last instant.
    pub fn n_steps(&self) -> usize {
        self.instants.len() - 1
    }

    /// `N + 1`, the number of tasks.
    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn t_end(&self) -> f64 {
        self.instants[self.instants.len() - 1]
    }

    pub fn instant(&self, index: usize) -> Option<f64> {
        self.instants.get(index).copied()
    }

    pub fn instants(&self) -> &[f64] {
        &self.instants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delft_grid_has_201_samples() {
        let grid = TimeGrid::new(0.2, 0.001).unwrap();
        assert_eq!(grid.n_steps(), 200);
        assert_eq!(grid.len(), 201);
        assert_eq!(grid.instant(0), Some(0.0));
        assert!((grid.t_end() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn partial_last_step_rounds_up() {
        let grid = TimeGrid::new(0.25, 0.1).unwrap();
        assert_eq!(grid.n_steps(), 3);
        assert!((grid.t_end() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn zero_horizon_is_a_single_sample() {
        let grid = TimeGrid::new(0.0, 0.1).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.instants(), &[0.0]);
    }

    #[test]
    fn regeneration_is_deterministic() {
        let a = TimeGrid::new(0.2, 0.001).unwrap();
        let b = TimeGrid::new(0.2, 0.001).unwrap();
        assert_eq!(a, b);
        let rebuilt = TimeGrid::from_instants(a.instants().to_vec()).unwrap();
        assert_eq!(rebuilt.instants(), a.instants());
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(TimeGrid::new(1.0, 0.0).is_err());
        assert!(TimeGrid::new(-1.0, 0.1).is_err());
        assert!(TimeGrid::new(1.0, f64::NAN).is_err());
        assert!(TimeGrid::new(1e3, 1e-9).is_err());
        assert!(TimeGrid::from_instants(vec![]).is_err());
        assert!(TimeGrid::from_instants(vec![0.0, 0.2, 0.1]).is_err());
        assert!(TimeGrid::from_instants(vec![0.5, 1.0]).is_err());
    }
}
