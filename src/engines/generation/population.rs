use crate::engines::simulation::TrackingObjective;
use crate::error::Result;
use crate::types::{Chromosome, GenerationSummary};
use rayon::prelude::*;

/// A chromosome paired with the fitness it scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredChromosome {
    pub chromosome: Chromosome,
    pub fitness: f64,
}

/// An evaluated generation.
///
/// Chromosomes and their fitness live in the same record, so the fitness
/// vector can never drift out of alignment with the population, and a new
/// population can only be obtained by evaluating it again.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    members: Vec<ScoredChromosome>,
}

impl Population {
    /// Score every chromosome. Output order always matches input order,
    /// whether or not the work is spread over the rayon pool.
    pub fn evaluate(
        chromosomes: Vec<Chromosome>,
        objective: &TrackingObjective,
        parallel: bool,
    ) -> Result<Self> {
        let score = |chromosome: &Chromosome| -> Result<ScoredChromosome> {
            Ok(ScoredChromosome {
                chromosome: *chromosome,
                fitness: objective.score(chromosome)?,
            })
        };

        let members = if parallel {
            chromosomes.par_iter().map(score).collect::<Result<Vec<_>>>()?
        } else {
            chromosomes.iter().map(score).collect::<Result<Vec<_>>>()?
        };

        Ok(Self { members })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[ScoredChromosome] {
        &self.members
    }

    pub fn chromosomes(&self) -> Vec<Chromosome> {
        self.members.iter().map(|m| m.chromosome).collect()
    }

    pub fn fitness_vector(&self) -> Vec<f64> {
        self.members.iter().map(|m| m.fitness).collect()
    }

    /// Index of the best member; the first one wins a tie.
    pub fn champion_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, member) in self.members.iter().enumerate() {
            match best {
                Some((_, fitness)) if member.fitness <= fitness => {}
                _ => best = Some((i, member.fitness)),
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn champion(&self) -> Option<&ScoredChromosome> {
        self.champion_index().map(|i| &self.members[i])
    }

    pub fn max_fitness(&self) -> f64 {
        self.champion().map(|c| c.fitness).unwrap_or(0.0)
    }

    pub fn avg_fitness(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        // Mean of scaled values keeps sentinel-sized scores from overflowing.
        let max = self.max_fitness();
        if max <= 0.0 {
            return 0.0;
        }
        let scaled: f64 = self.members.iter().map(|m| m.fitness / max).sum();
        scaled / self.members.len() as f64 * max
    }

    pub fn summary(&self, generation: usize) -> Option<GenerationSummary> {
        self.champion().map(|champion| GenerationSummary {
            generation,
            max_fitness: champion.fitness,
            avg_fitness: self.avg_fitness(),
            champion: champion.chromosome,
        })
    }
}
