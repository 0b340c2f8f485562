//! Genetic tuning of PID controller gains.
//!
//! A population of `(kp, ki, kd)` triples is scored by simulating each one
//! against a reference trajectory and evolved with roulette-wheel selection,
//! whole-gene crossover, tiered mutation and elitism.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod reporting;
pub mod types;

pub use error::{PidTuneError, Result};
pub use types::{ChampionReplay, Chromosome, Gene, GenerationSummary, ReplayStep};
