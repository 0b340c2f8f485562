use crate::config::{draw_seed, AppConfig, ThresholdPolicy, MAX_SEED};
use crate::engines::generation::{
    operators::{crossover, mutate, random_chromosome, RouletteWheel},
    population::{Population, ScoredChromosome},
    progress::Reporter,
};
use crate::engines::simulation::TrackingObjective;
use crate::error::{PidTuneError, Result};
use crate::types::{ChampionReplay, Chromosome, GenerationSummary};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

/// Engine-level run parameters, validated once before any simulation runs.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub mutation_probability: f64,
    pub crossover_rate: f64,
    pub max_gain_value: f64,
    pub max_timesteps: usize,
    pub max_runs: usize,
    pub fitness_threshold: Option<f64>,
    pub threshold_policy: ThresholdPolicy,
    pub elitism: bool,
    pub distinct_parents: bool,
    pub seed: Option<u64>,
    pub parallel_evaluation: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl EvolutionConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        let evolution = &config.evolution;
        Self {
            population_size: evolution.population_size,
            mutation_probability: evolution.mutation_probability,
            crossover_rate: evolution.crossover_rate,
            max_gain_value: evolution.max_gain_value,
            max_timesteps: config.simulation.max_timesteps,
            max_runs: evolution.max_runs,
            fitness_threshold: evolution.fitness_threshold,
            threshold_policy: evolution.threshold_policy,
            elitism: evolution.elitism,
            distinct_parents: evolution.distinct_parents,
            seed: evolution.seed,
            parallel_evaluation: evolution.parallel_evaluation,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(PidTuneError::Configuration(msg)) };

        if self.population_size == 0 {
            return fail("population_size must be greater than 0".to_string());
        }
        if self.max_timesteps == 0 {
            return fail("max_timesteps must be greater than 0".to_string());
        }
        if self.max_runs == 0 {
            return fail("max_runs must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return fail(format!(
                "mutation_probability must be between 0 and 1, got {}",
                self.mutation_probability
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return fail(format!(
                "crossover_rate must be between 0 and 1, got {}",
                self.crossover_rate
            ));
        }
        if !(self.max_gain_value.is_finite() && self.max_gain_value > 0.0) {
            return fail(format!(
                "max_gain_value must be a positive finite number, got {}",
                self.max_gain_value
            ));
        }
        if matches!(self.fitness_threshold, Some(t) if !t.is_finite()) {
            return fail("fitness_threshold must be finite".to_string());
        }
        if self.distinct_parents && self.population_size < 2 {
            return fail("distinct_parents requires a population of at least 2".to_string());
        }
        if let Some(seed) = self.seed.filter(|s| *s > MAX_SEED) {
            return fail(format!("seed must be at most {}, got {}", MAX_SEED, seed));
        }
        Ok(())
    }
}

/// Where the engine is in its generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Init,
    Evaluate,
    Breed,
    Elitism,
    Replace,
    Terminated,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    MaxRuns,
    ThresholdReached { generation: usize, fitness: f64 },
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Seed actually used, so an unseeded run can be repeated.
    pub seed: u64,
    pub generations: usize,
    pub termination: Termination,
    /// Best chromosome seen in any generation.
    pub best: ScoredChromosome,
    pub final_population: Population,
    pub summaries: Vec<GenerationSummary>,
}

pub struct EvolutionEngine {
    config: EvolutionConfig,
    objective: TrackingObjective,
    rng: StdRng,
    seed: u64,
    state: EngineState,
}

impl EvolutionEngine {
    pub fn new(config: EvolutionConfig, objective: TrackingObjective) -> Result<Self> {
        config.validate()?;
        if objective.max_timesteps() != config.max_timesteps {
            return Err(PidTuneError::Configuration(format!(
                "objective simulates {} timesteps but max_timesteps is {}",
                objective.max_timesteps(),
                config.max_timesteps
            )));
        }

        let seed = config.seed.unwrap_or_else(draw_seed);
        Ok(Self {
            config,
            objective,
            rng: StdRng::seed_from_u64(seed),
            seed,
            state: EngineState::Init,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn objective(&self) -> &TrackingObjective {
        &self.objective
    }

    /// Run the evolution process.
    ///
    /// `on_generation` fires as soon as a generation is evaluated, before
    /// breeding, so the summary describes the population that was scored
    /// and the final generation is reported too.
    pub fn run<C: Reporter + ?Sized>(&mut self, reporter: &mut C) -> Result<RunOutcome> {
        log::info!(
            "Starting run: population {}, {} generations, {} timesteps, seed {}",
            self.config.population_size,
            self.config.max_runs,
            self.config.max_timesteps,
            self.seed
        );

        self.transition(EngineState::Init);
        let mut chromosomes = self.initialize_population();
        let mut summaries = Vec::with_capacity(self.config.max_runs);
        let mut best: Option<ScoredChromosome> = None;
        let mut termination = Termination::MaxRuns;
        let mut last_population = None;

        for generation in 0..self.config.max_runs {
            reporter.on_generation_start(generation);
            let started = Instant::now();

            self.transition(EngineState::Evaluate);
            let population = self.evaluate(chromosomes)?;
            let summary = population.summary(generation).ok_or_else(|| {
                PidTuneError::Configuration("population is empty".to_string())
            })?;
            let champion = ScoredChromosome {
                chromosome: summary.champion,
                fitness: summary.max_fitness,
            };
            log::debug!(
                "Generation {} evaluated in {:?}",
                generation,
                started.elapsed()
            );
            log::info!(
                "Generation {}: max fitness {:.6e}, avg fitness {:.6e}, champion {}",
                generation,
                summary.max_fitness,
                summary.avg_fitness,
                summary.champion
            );

            if best.map_or(true, |b| champion.fitness > b.fitness) {
                best = Some(champion);
            }

            reporter.on_population(generation, &population);
            reporter.on_generation(&summary);
            if reporter.wants_replay(generation) {
                let replay = ChampionReplay {
                    generation,
                    champion: champion.chromosome,
                    fitness: champion.fitness,
                    steps: self.objective.replay(&champion.chromosome)?,
                };
                reporter.on_champion_replay(&replay);
            }
            summaries.push(summary);

            let is_last = generation + 1 == self.config.max_runs;
            let below_threshold = match self.config.fitness_threshold {
                Some(threshold) => champion.fitness < threshold,
                None => false,
            };

            match (self.config.fitness_threshold, self.config.threshold_policy) {
                (Some(_), ThresholdPolicy::Stop) if !below_threshold => {
                    log::info!(
                        "Fitness threshold reached at generation {} ({:.6e})",
                        generation,
                        champion.fitness
                    );
                    termination = Termination::ThresholdReached {
                        generation,
                        fitness: champion.fitness,
                    };
                    last_population = Some(population);
                    break;
                }
                (Some(_), ThresholdPolicy::Reset) if below_threshold && !is_last => {
                    log::warn!(
                        "Best fitness {:.6e} below threshold at generation {}, resetting population",
                        champion.fitness,
                        generation
                    );
                    reporter.on_population_reset(generation);
                    self.transition(EngineState::Init);
                    chromosomes = self.initialize_population();
                    last_population = Some(population);
                    continue;
                }
                _ => {}
            }

            if is_last {
                last_population = Some(population);
                break;
            }

            chromosomes = self.breed(&population)?;
            self.transition(EngineState::Replace);
            last_population = Some(population);
        }

        self.transition(EngineState::Terminated);

        let final_population = last_population.ok_or_else(|| {
            PidTuneError::Configuration("run finished without evaluating a generation".to_string())
        })?;
        let best = best.ok_or_else(|| {
            PidTuneError::Configuration("run finished without a champion".to_string())
        })?;

        let outcome = RunOutcome {
            seed: self.seed,
            generations: summaries.len(),
            termination,
            best,
            final_population,
            summaries,
        };
        log::info!(
            "Run finished after {} generations: best fitness {:.6e} ({})",
            outcome.generations,
            outcome.best.fitness,
            outcome.best.chromosome
        );
        reporter.on_run_complete(&outcome);

        Ok(outcome)
    }

    /// Fresh population with every gain drawn from `[0, max_gain_value)`.
    pub fn initialize_population(&mut self) -> Vec<Chromosome> {
        (0..self.config.population_size)
            .map(|_| random_chromosome(self.config.max_gain_value, &mut self.rng))
            .collect()
    }

    pub fn evaluate(&self, chromosomes: Vec<Chromosome>) -> Result<Population> {
        Population::evaluate(chromosomes, &self.objective, self.config.parallel_evaluation)
    }

    /// Next generation's chromosomes: offspring from selection, crossover
    /// and mutation, with the untouched champion in the last slot when
    /// elitism is on.
    pub fn breed(&mut self, population: &Population) -> Result<Vec<Chromosome>> {
        self.transition(EngineState::Breed);

        let wheel = RouletteWheel::new(&population.fitness_vector())?;
        let members = population.members();
        let offspring_count = if self.config.elitism {
            self.config.population_size - 1
        } else {
            self.config.population_size
        };

        let mut next_generation = Vec::with_capacity(self.config.population_size);
        for _ in 0..offspring_count {
            let (first, second) = wheel.select_parents(&mut self.rng, self.config.distinct_parents)?;
            let child = crossover(
                &members[first].chromosome,
                &members[second].chromosome,
                self.config.crossover_rate,
                &mut self.rng,
            );
            let child = mutate(
                &child,
                self.config.mutation_probability,
                self.config.max_gain_value,
                &mut self.rng,
            );
            next_generation.push(child);
        }

        if self.config.elitism {
            self.transition(EngineState::Elitism);
            let champion = population.champion().ok_or_else(|| {
                PidTuneError::Configuration("population is empty".to_string())
            })?;
            next_generation.push(champion.chromosome);
        }

        Ok(next_generation)
    }

    fn transition(&mut self, next: EngineState) {
        log::debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
