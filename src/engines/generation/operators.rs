use crate::error::{PidTuneError, Result};
use crate::types::{Chromosome, Gene};
use rand::Rng;

/// Fitness-proportionate sampler built once per generation.
///
/// Index `i` owns the half-open interval `[cumulative[i-1], cumulative[i])`,
/// so zero-weight slots are never picked and the final positive slot always
/// ends at exactly 1.0.
#[derive(Debug, Clone)]
pub struct RouletteWheel {
    probabilities: Vec<f64>,
    cumulative: Vec<f64>,
}

impl RouletteWheel {
    pub fn new(fitness: &[f64]) -> Result<Self> {
        if fitness.is_empty() {
            return Err(PidTuneError::DegenerateSelection(
                "fitness vector is empty".to_string(),
            ));
        }
        if let Some(bad) = fitness.iter().find(|f| !f.is_finite() || **f < 0.0) {
            return Err(PidTuneError::DegenerateSelection(format!(
                "fitness values must be finite and non-negative, found {}",
                bad
            )));
        }

        // Scale by the maximum before summing so large scores cannot overflow.
        let max = fitness.iter().copied().fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return Err(PidTuneError::DegenerateSelection(
                "every fitness value is zero".to_string(),
            ));
        }
        let weights: Vec<f64> = fitness.iter().map(|f| f / max).collect();
        let total: f64 = weights.iter().sum();
        let probabilities: Vec<f64> = weights.iter().map(|w| w / total).collect();

        let mut cumulative = Vec::with_capacity(probabilities.len());
        let mut running = 0.0;
        for p in &probabilities {
            running += p;
            cumulative.push(running);
        }
        // Rounding can leave the sum a hair under 1.0; clamp the tail.
        if let Some(last_positive) = probabilities.iter().rposition(|p| *p > 0.0) {
            for c in &mut cumulative[last_positive..] {
                *c = 1.0;
            }
        }

        Ok(Self {
            probabilities,
            cumulative,
        })
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Selection probability of each index, in population order.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn spin<R: Rng>(&self, rng: &mut R) -> usize {
        let draw: f64 = rng.gen();
        let index = self.cumulative.partition_point(|&c| c <= draw);
        index.min(self.len() - 1)
    }

    /// Spin with `excluded` taken off the wheel.
    pub fn spin_excluding<R: Rng>(&self, rng: &mut R, excluded: usize) -> usize {
        let remaining: f64 = self
            .probabilities
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != excluded)
            .map(|(_, p)| p)
            .sum();

        if remaining <= 0.0 {
            // All other slots carry zero weight: fall back to a uniform pick.
            let pick = rng.gen_range(0..self.len() - 1);
            return if pick >= excluded { pick + 1 } else { pick };
        }

        let target = rng.gen::<f64>() * remaining;
        let mut running = 0.0;
        let mut last_candidate = if excluded == 0 { 1 } else { 0 };
        for (i, &p) in self.probabilities.iter().enumerate() {
            if i == excluded || p <= 0.0 {
                continue;
            }
            running += p;
            last_candidate = i;
            if target < running {
                return i;
            }
        }
        last_candidate
    }

    /// Two parent indices. They may coincide unless `distinct` is set.
    pub fn select_parents<R: Rng>(&self, rng: &mut R, distinct: bool) -> Result<(usize, usize)> {
        let first = self.spin(rng);
        if !distinct {
            return Ok((first, self.spin(rng)));
        }
        if self.len() < 2 {
            return Err(PidTuneError::DegenerateSelection(
                "distinct parents need a population of at least 2".to_string(),
            ));
        }
        Ok((first, self.spin_excluding(rng, first)))
    }
}

/// Roulette-wheel selection of two (possibly equal) parent indices.
pub fn roulette_selection<R: Rng>(fitness: &[f64], rng: &mut R) -> Result<(usize, usize)> {
    RouletteWheel::new(fitness)?.select_parents(rng, false)
}

/// Roulette-wheel selection of two different parent indices.
pub fn distinct_roulette_selection<R: Rng>(
    fitness: &[f64],
    rng: &mut R,
) -> Result<(usize, usize)> {
    RouletteWheel::new(fitness)?.select_parents(rng, true)
}

/// Gene-origin patterns for crossover: bit 0 = kp, bit 1 = ki, bit 2 = kd,
/// a set bit takes the gene from the second parent. Pattern 0 (everything
/// from the first parent) is the no-crossover case and is excluded.
pub const CROSSOVER_PATTERNS: std::ops::RangeInclusive<u8> = 1..=7;

/// Whole-gene crossover. With probability `1 - crossover_rate` the child is
/// an exact copy of `parent1`.
pub fn crossover<R: Rng>(
    parent1: &Chromosome,
    parent2: &Chromosome,
    crossover_rate: f64,
    rng: &mut R,
) -> Chromosome {
    if rng.gen::<f64>() >= crossover_rate {
        return *parent1;
    }

    let pattern = rng.gen_range(CROSSOVER_PATTERNS);
    splice(parent1, parent2, pattern)
}

fn splice(parent1: &Chromosome, parent2: &Chromosome, pattern: u8) -> Chromosome {
    let pick = |bit: u8, gene: Gene| {
        if pattern & (1 << bit) != 0 {
            parent2.gene(gene)
        } else {
            parent1.gene(gene)
        }
    };
    Chromosome::from_valid_gains(pick(0, Gene::Kp), pick(1, Gene::Ki), pick(2, Gene::Kd))
}

/// Per-gene mutation probabilities: `p/3` for kp, `2p/3` for ki, `p` for kd.
pub fn mutation_tiers(mutation_probability: f64) -> [(Gene, f64); 3] {
    [
        (Gene::Kp, mutation_probability / 3.0),
        (Gene::Ki, mutation_probability * 2.0 / 3.0),
        (Gene::Kd, mutation_probability),
    ]
}

/// Tiered mutation: each gene that fires moves by
/// `(u - 0.5) / max_gain_value`, reflected upwards if it would go negative.
pub fn mutate<R: Rng>(
    chromosome: &Chromosome,
    mutation_probability: f64,
    max_gain_value: f64,
    rng: &mut R,
) -> Chromosome {
    let mut mutated = *chromosome;

    for (gene, probability) in mutation_tiers(mutation_probability) {
        if rng.gen::<f64>() >= probability {
            continue;
        }
        let current = mutated.gene(gene);
        let delta = (rng.gen::<f64>() - 0.5) / max_gain_value;
        let value = if current + delta < 0.0 {
            current + delta.abs()
        } else {
            current + delta
        };
        // A non-finite step leaves the gene as it was.
        mutated = mutated.with_gene(gene, value).unwrap_or(mutated);
    }

    mutated
}

/// Random chromosome with every gain drawn uniformly from `[0, max_gain_value)`.
pub fn random_chromosome<R: Rng>(max_gain_value: f64, rng: &mut R) -> Chromosome {
    let mut draw = || rng.gen_range(0.0..max_gain_value);
    let (kp, ki, kd) = (draw(), draw(), draw());
    Chromosome::from_valid_gains(kp, ki, kd)
}
