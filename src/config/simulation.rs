use super::traits::{ensure_positive, ensure_probability, ConfigSection};
use crate::error::PidTuneError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub max_timesteps: usize,
    /// Chance per timestep that the reference line moves; 0 is a flat line.
    pub line_smoothness: f64,
    /// Generate a fresh reference trajectory instead of loading the saved one.
    pub new_trajectory: bool,
    pub trajectory_step_scale: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_timesteps: 150,
            line_smoothness: 0.4,
            new_trajectory: true,
            trajectory_step_scale: 1.0 / 1000.0,
        }
    }
}

impl ConfigSection for SimulationConfig {
    fn section_name() -> &'static str {
        "simulation"
    }

    fn validate(&self) -> Result<(), PidTuneError> {
        ensure_positive("max_timesteps", self.max_timesteps)?;
        ensure_probability("line_smoothness", self.line_smoothness)?;
        if !(self.trajectory_step_scale.is_finite() && self.trajectory_step_scale >= 0.0) {
            return Err(PidTuneError::Configuration(format!(
                "trajectory_step_scale must be finite and non-negative, got {}",
                self.trajectory_step_scale
            )));
        }
        Ok(())
    }
}
