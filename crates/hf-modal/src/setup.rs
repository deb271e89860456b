//! Immutable model value shared by the coordinator and every worker.

use crate::basis::ModalModel;
use crate::error::{ModalError, ModalResult};
use crate::grid::TimeGrid;
use crate::initial::InitialCondition;
use crate::speeds::WaveSpeeds;
use hf_core::ensure_finite;
use nalgebra::{Matrix4, Vector4};

/// Everything a point evaluation needs: built once on the coordinator,
/// broadcast to workers, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSetup {
    pub initial: InitialCondition,
    pub grid: TimeGrid,
    /// Modal-to-physical matrix `S`
    pub s: Matrix4<f64>,
    pub length: f64,
    pub speeds: WaveSpeeds,
    pub area_fluid: f64,
    pub area_wall: f64,
    pub discharge_coefficient: f64,
    pub closure_time: f64,
    /// Interior probe position `xtest`
    pub probe_x: f64,
}

impl ModelSetup {
    pub fn new(model: &ModalModel, grid: TimeGrid, probe_x: f64) -> ModalResult<Self> {
        let c = &model.constants;
        let setup = Self {
            initial: model.initial,
            grid,
            s: *model.basis.s(),
            length: c.length,
            speeds: model.speeds,
            area_fluid: c.area_fluid,
            area_wall: c.area_wall,
            discharge_coefficient: c.discharge_coefficient,
            closure_time: c.closure_time,
            probe_x,
        };
        setup.validate()?;
        Ok(setup)
    }

    /// Checks shared by local construction and broadcast decoding.
    pub fn validate(&self) -> ModalResult<()> {
        let x = ensure_finite(self.probe_x, "probe position")?;
        if !(0.0..=self.length).contains(&x) {
            return Err(ModalError::InvalidParameter {
                what: format!("probe position {x} outside pipe [0, {}]", self.length),
            });
        }
        if !(self.length > 0.0 && self.area_fluid > 0.0 && self.area_wall > 0.0) {
            return Err(ModalError::InvalidParameter {
                what: "length and areas must be positive".to_string(),
            });
        }
        if self.s.iter().any(|v| !v.is_finite()) {
            return Err(ModalError::SingularTransform {
                scaled_det: f64::NAN,
            });
        }
        Ok(())
    }

    /// Number of tasks, `N + 1`.
    pub fn task_count(&self) -> usize {
        self.grid.len()
    }

    pub fn to_physical(&self, w: &Vector4<f64>) -> Vector4<f64> {
        self.s * w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelParameters;

    #[test]
    fn probe_must_lie_in_pipe() {
        let model = ModalModel::derive(&ModelParameters::delft()).unwrap();
        let grid = TimeGrid::new(0.01, 0.001).unwrap();
        assert!(ModelSetup::new(&model, grid.clone(), 11.15).is_ok());
        assert!(ModelSetup::new(&model, grid.clone(), 0.0).is_ok());
        assert!(ModelSetup::new(&model, grid.clone(), 20.0).is_ok());
        assert!(ModelSetup::new(&model, grid.clone(), 20.5).is_err());
        assert!(ModelSetup::new(&model, grid, -0.1).is_err());
    }

    #[test]
    fn task_count_is_grid_length() {
        let model = ModalModel::derive(&ModelParameters::delft()).unwrap();
        let setup = ModelSetup::new(&model, TimeGrid::new(0.005, 0.001).unwrap(), 5.0).unwrap();
        assert_eq!(setup.task_count(), 6);
    }
}
