//! Case files: pipe, wall, fluid, valve and run settings in SI units.

use crate::error::{AppError, AppResult};
use hf_core::{kg_per_m3, m, m3ps, pa, s, unitless};
use hf_eval::delay_line::DEFAULT_SAMPLES_PER_TRANSIT;
use hf_modal::ModelParameters;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeConfig {
    pub length_m: f64,
    pub radius_m: f64,
    pub wall_thickness_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallConfig {
    pub youngs_modulus_pa: f64,
    pub density_kg_m3: f64,
    pub poisson_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidConfig {
    pub bulk_modulus_pa: f64,
    pub density_kg_m3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValveConfig {
    pub closure_time_s: f64,
    pub initial_flow_m3_s: f64,
    pub loss_coefficient: f64,
    pub discharge_coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub t_end_s: f64,
    pub dt_s: f64,
    pub probe_x_m: f64,
    pub workers: usize,
    /// Boundary history resolution of the characteristic evaluator.
    #[serde(default = "default_samples_per_transit")]
    pub samples_per_transit: usize,
}

fn default_samples_per_transit() -> usize {
    DEFAULT_SAMPLES_PER_TRANSIT
}

/// Reservoir-pipe-valve case. The default is the Delft FSI rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseConfig {
    pub pipe: PipeConfig,
    pub wall: WallConfig,
    pub fluid: FluidConfig,
    pub valve: ValveConfig,
    pub run: RunConfig,
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            pipe: PipeConfig {
                length_m: 20.0,
                radius_m: 0.3985,
                wall_thickness_m: 0.008,
            },
            wall: WallConfig {
                youngs_modulus_pa: 210e9,
                density_kg_m3: 7985.0,
                poisson_ratio: 0.29,
            },
            fluid: FluidConfig {
                bulk_modulus_pa: 2.14e9,
                density_kg_m3: 998.0,
            },
            valve: ValveConfig {
                closure_time_s: 0.03,
                initial_flow_m3_s: 0.5,
                loss_coefficient: 0.2,
                discharge_coefficient: 0.0,
            },
            run: RunConfig {
                t_end_s: 0.2,
                dt_s: 0.001,
                probe_x_m: 11.15,
                workers: 4,
                samples_per_transit: DEFAULT_SAMPLES_PER_TRANSIT,
            },
        }
    }
}

impl CaseConfig {
    pub fn to_parameters(&self) -> ModelParameters {
        ModelParameters {
            length: m(self.pipe.length_m),
            radius: m(self.pipe.radius_m),
            wall_thickness: m(self.pipe.wall_thickness_m),
            youngs_modulus: pa(self.wall.youngs_modulus_pa),
            wall_density: kg_per_m3(self.wall.density_kg_m3),
            poisson_ratio: unitless(self.wall.poisson_ratio),
            bulk_modulus: pa(self.fluid.bulk_modulus_pa),
            fluid_density: kg_per_m3(self.fluid.density_kg_m3),
            closure_time: s(self.valve.closure_time_s),
            initial_flow: m3ps(self.valve.initial_flow_m3_s),
            loss_coefficient: unitless(self.valve.loss_coefficient),
            discharge_coefficient: unitless(self.valve.discharge_coefficient),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        self.to_parameters()
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let x = self.run.probe_x_m;
        if !(x.is_finite() && (0.0..=self.pipe.length_m).contains(&x)) {
            return Err(AppError::Validation(format!(
                "probe position {x} m is outside the pipe [0, {}] m",
                self.pipe.length_m
            )));
        }
        if self.run.workers == 0 {
            return Err(AppError::Validation(
                "run.workers must be at least 1".to_string(),
            ));
        }
        if self.run.samples_per_transit == 0 {
            return Err(AppError::Validation(
                "run.samples_per_transit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load a case from a YAML file.
pub fn load_config(path: &Path) -> AppResult<CaseConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse case YAML: {}", e)))
}

/// Save a case to a YAML file.
pub fn save_config(path: &Path, config: &CaseConfig) -> AppResult<()> {
    let content = serde_yaml::to_string(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize case: {}", e)))?;

    std::fs::write(path, content).map_err(|e| AppError::ConfigWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_delft_rig() {
        let config = CaseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.to_parameters(), ModelParameters::delft());
    }

    #[test]
    fn yaml_round_trip() {
        let config = CaseConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("t_end_s"));
        let back: CaseConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn samples_per_transit_is_optional() {
        let mut yaml = serde_yaml::to_string(&CaseConfig::default()).unwrap();
        yaml = yaml
            .lines()
            .filter(|line| !line.contains("samples_per_transit"))
            .collect::<Vec<_>>()
            .join("\n");
        let config: CaseConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.run.samples_per_transit, DEFAULT_SAMPLES_PER_TRANSIT);
    }

    #[test]
    fn rejects_probe_outside_pipe_and_empty_pool() {
        let mut config = CaseConfig::default();
        config.run.probe_x_m = 25.0;
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));

        let mut config = CaseConfig::default();
        config.run.workers = 0;
        assert!(config.validate().is_err());

        let mut config = CaseConfig::default();
        config.wall.poisson_ratio = 0.6;
        assert!(config.validate().is_err());
    }
}
