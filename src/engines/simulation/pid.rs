use crate::error::{PidTuneError, Result};
use crate::types::{Chromosome, ReplayStep};

/// Discrete-time (dt = 1) closed loop: a point whose velocity is the PID output.
#[derive(Debug, Clone, Copy)]
pub struct PidSimulator {
    max_timesteps: usize,
}

/// Controller and plant state carried between timesteps.
#[derive(Debug, Default)]
struct LoopState {
    position: f64,
    last_error: f64,
    integral: f64,
}

impl LoopState {
    /// Advance one timestep towards `reference`; returns the tracking error
    /// measured before the move.
    fn step(&mut self, gains: &Chromosome, reference: f64) -> f64 {
        let error = reference - self.position;
        self.integral += error;

        let velocity = gains.kp() * error
            + gains.kd() * (error - self.last_error)
            + gains.ki() * self.integral;
        self.position += velocity;

        self.last_error = error;
        error
    }
}

impl PidSimulator {
    pub fn new(max_timesteps: usize) -> Self {
        Self { max_timesteps }
    }

    pub fn max_timesteps(&self) -> usize {
        self.max_timesteps
    }

    /// Tracking error at every timestep. Identical inputs give identical output.
    pub fn simulate(&self, chromosome: &Chromosome, trajectory: &[f64]) -> Result<Vec<f64>> {
        let reference = self.reference(trajectory)?;
        let mut state = LoopState::default();

        Ok(reference
            .iter()
            .map(|&target| state.step(chromosome, target))
            .collect())
    }

    /// Same loop as [`simulate`](Self::simulate), also recording the position
    /// reached after each step.
    pub fn replay(&self, chromosome: &Chromosome, trajectory: &[f64]) -> Result<Vec<ReplayStep>> {
        let reference = self.reference(trajectory)?;
        let mut state = LoopState::default();

        Ok(reference
            .iter()
            .enumerate()
            .map(|(timestep, &target)| {
                let error = state.step(chromosome, target);
                ReplayStep {
                    timestep,
                    reference: target,
                    position: state.position,
                    error,
                }
            })
            .collect())
    }

    fn reference<'a>(&self, trajectory: &'a [f64]) -> Result<&'a [f64]> {
        trajectory
            .get(..self.max_timesteps)
            .ok_or(PidTuneError::TrajectoryTooShort {
                required: self.max_timesteps,
                available: trajectory.len(),
            })
    }
}
