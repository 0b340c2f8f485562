use super::{FitnessEvaluator, PidSimulator};
use crate::data::TrajectorySource;
use crate::error::{PidTuneError, Result};
use crate::types::{Chromosome, ReplayStep};

/// Simulation plus scoring against one fixed reference trajectory.
///
/// The reference is copied out of the [`TrajectorySource`] once, so every
/// evaluation in a run reads the same immutable slice.
#[derive(Debug, Clone)]
pub struct TrackingObjective {
    simulator: PidSimulator,
    evaluator: FitnessEvaluator,
    reference: Vec<f64>,
}

impl TrackingObjective {
    pub fn new<S: TrajectorySource + ?Sized>(source: &S, max_timesteps: usize) -> Result<Self> {
        if max_timesteps == 0 {
            return Err(PidTuneError::Configuration(
                "max_timesteps must be greater than 0".to_string(),
            ));
        }
        if source.len() < max_timesteps {
            return Err(PidTuneError::TrajectoryTooShort {
                required: max_timesteps,
                available: source.len(),
            });
        }

        let reference = (0..max_timesteps)
            .map(|t| {
                source.get(t).ok_or(PidTuneError::TrajectoryTooShort {
                    required: max_timesteps,
                    available: t,
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Self {
            simulator: PidSimulator::new(max_timesteps),
            evaluator: FitnessEvaluator::new(),
            reference,
        })
    }

    pub fn reference(&self) -> &[f64] {
        &self.reference
    }

    pub fn max_timesteps(&self) -> usize {
        self.simulator.max_timesteps()
    }

    pub fn score(&self, chromosome: &Chromosome) -> Result<f64> {
        let errors = self.simulator.simulate(chromosome, &self.reference)?;
        self.evaluator.fitness(&errors)
    }

    pub fn replay(&self, chromosome: &Chromosome) -> Result<Vec<ReplayStep>> {
        self.simulator.replay(chromosome, &self.reference)
    }
}
