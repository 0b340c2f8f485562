use crate::error::{PidTuneError, Result};
use serde::{Deserialize, Serialize};

/// One of the three PID gains carried by a chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gene {
    Kp,
    Ki,
    Kd,
}

impl Gene {
    pub const ALL: [Gene; 3] = [Gene::Kp, Gene::Ki, Gene::Kd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gene::Kp => "kp",
            Gene::Ki => "ki",
            Gene::Kd => "kd",
        }
    }
}

/// Candidate solution: a triple of PID gains.
///
/// Chromosomes are small `Copy` values. Operators never edit a chromosome that
/// lives in a population; they build a new one with [`Chromosome::with_gene`],
/// so two population slots can never alias each other.
///
/// Every constructor keeps the gains finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawChromosome")]
pub struct Chromosome {
    kp: f64,
    ki: f64,
    kd: f64,
}

#[derive(Deserialize)]
struct RawChromosome {
    kp: f64,
    ki: f64,
    kd: f64,
}

impl TryFrom<RawChromosome> for Chromosome {
    type Error = PidTuneError;

    fn try_from(raw: RawChromosome) -> Result<Self> {
        Chromosome::new(raw.kp, raw.ki, raw.kd)
    }
}

impl Chromosome {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Result<Self> {
        Self::check(Gene::Kp, kp)?;
        Self::check(Gene::Ki, ki)?;
        Self::check(Gene::Kd, kd)?;
        Ok(Self { kp, ki, kd })
    }

    /// Caller guarantees every gain is finite and non-negative.
    pub(crate) fn from_valid_gains(kp: f64, ki: f64, kd: f64) -> Self {
        debug_assert!([kp, ki, kd].iter().all(|g| g.is_finite() && *g >= 0.0));
        Self { kp, ki, kd }
    }

    /// The all-zero controller (no actuation at all).
    pub fn zero() -> Self {
        Self { kp: 0.0, ki: 0.0, kd: 0.0 }
    }

    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn ki(&self) -> f64 {
        self.ki
    }

    pub fn kd(&self) -> f64 {
        self.kd
    }

    pub fn gene(&self, gene: Gene) -> f64 {
        match gene {
            Gene::Kp => self.kp,
            Gene::Ki => self.ki,
            Gene::Kd => self.kd,
        }
    }

    /// Copy of `self` with one gene replaced.
    pub fn with_gene(&self, gene: Gene, value: f64) -> Result<Self> {
        Self::check(gene, value)?;
        let mut next = *self;
        match gene {
            Gene::Kp => next.kp = value,
            Gene::Ki => next.ki = value,
            Gene::Kd => next.kd = value,
        }
        Ok(next)
    }

    pub fn gains(&self) -> [f64; 3] {
        [self.kp, self.ki, self.kd]
    }

    fn check(gene: Gene, value: f64) -> Result<()> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(PidTuneError::InvalidGene {
                gene: gene.as_str(),
                value,
            })
        }
    }
}

impl std::fmt::Display for Chromosome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "kp={:.6} ki={:.6} kd={:.6}", self.kp, self.ki, self.kd)
    }
}

/// Per-generation summary handed to reporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: usize,
    pub max_fitness: f64,
    pub avg_fitness: f64,
    pub champion: Chromosome,
}

/// One recorded step of a champion replay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    pub timestep: usize,
    pub reference: f64,
    pub position: f64,
    pub error: f64,
}

/// Detailed closed-loop run of a generation's champion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionReplay {
    pub generation: usize,
    pub champion: Chromosome,
    pub fitness: f64,
    pub steps: Vec<ReplayStep>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative_and_non_finite() {
        assert!(Chromosome::new(0.0, 1.0, 2.0).is_ok());
        assert!(matches!(
            Chromosome::new(-0.1, 0.0, 0.0),
            Err(PidTuneError::InvalidGene { gene: "kp", .. })
        ));
        assert!(Chromosome::new(0.0, f64::NAN, 0.0).is_err());
        assert!(Chromosome::new(0.0, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_with_gene_leaves_original_untouched() {
        let original = Chromosome::new(1.0, 2.0, 3.0).unwrap();
        let changed = original.with_gene(Gene::Ki, 5.0).unwrap();

        assert_eq!(original.ki(), 2.0);
        assert_eq!(changed.gains(), [1.0, 5.0, 3.0]);
        assert!(original.with_gene(Gene::Kd, -1.0).is_err());
    }

    #[test]
    fn test_deserialize_validates_gains() {
        let ok: Chromosome = serde_json::from_str(r#"{"kp":1.0,"ki":0.5,"kd":0.0}"#).unwrap();
        assert_eq!(ok.gains(), [1.0, 0.5, 0.0]);

        let bad = serde_json::from_str::<Chromosome>(r#"{"kp":-1.0,"ki":0.5,"kd":0.0}"#);
        assert!(bad.is_err());
    }
}
