use super::traits::{ensure_positive, ensure_probability, ConfigSection};
use crate::error::PidTuneError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest seed accepted. TOML integers and environment values are signed
/// 64-bit, so anything above this would not survive a save and reload.
pub const MAX_SEED: u64 = i64::MAX as u64;

/// A fresh seed in `0..=MAX_SEED`.
pub fn draw_seed() -> u64 {
    rand::thread_rng().gen_range(0..=MAX_SEED)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub mutation_probability: f64,
    pub crossover_rate: f64,
    pub max_gain_value: f64,
    pub max_runs: usize,
    pub fitness_threshold: Option<f64>,
    pub threshold_policy: ThresholdPolicy,
    pub elitism: bool,
    pub distinct_parents: bool,
    pub seed: Option<u64>,
    pub parallel_evaluation: bool,
}

/// What the engine does with `fitness_threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdPolicy {
    /// Stop as soon as a generation's best fitness reaches the threshold.
    Stop,
    /// Throw the population away and start from a fresh random one whenever
    /// the best fitness stays below the threshold.
    Reset,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            mutation_probability: 0.1,
            crossover_rate: 0.9,
            max_gain_value: 3.0,
            max_runs: 100,
            fitness_threshold: None,
            threshold_policy: ThresholdPolicy::Stop,
            elitism: true,
            distinct_parents: false,
            seed: None,
            parallel_evaluation: true,
        }
    }
}

impl EvolutionConfig {
    /// The configured seed, or a freshly drawn one that is written back so
    /// the saved configuration repeats the run.
    pub fn resolve_seed(&mut self) -> u64 {
        let seed = self.seed.unwrap_or_else(draw_seed);
        self.seed = Some(seed);
        seed
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), PidTuneError> {
        ensure_positive("population_size", self.population_size)?;
        ensure_positive("max_runs", self.max_runs)?;
        ensure_probability("mutation_probability", self.mutation_probability)?;
        ensure_probability("crossover_rate", self.crossover_rate)?;
        if !(self.max_gain_value.is_finite() && self.max_gain_value > 0.0) {
            return Err(PidTuneError::Configuration(format!(
                "max_gain_value must be a positive finite number, got {}",
                self.max_gain_value
            )));
        }
        if let Some(threshold) = self.fitness_threshold {
            if !threshold.is_finite() {
                return Err(PidTuneError::Configuration(
                    "fitness_threshold must be finite".to_string(),
                ));
            }
        }
        if self.distinct_parents && self.population_size < 2 {
            return Err(PidTuneError::Configuration(
                "distinct_parents requires a population of at least 2".to_string(),
            ));
        }
        if let Some(seed) = self.seed.filter(|s| *s > MAX_SEED) {
            return Err(PidTuneError::Configuration(format!(
                "seed must be at most {}, got {}",
                MAX_SEED, seed
            )));
        }
        Ok(())
    }
}
