pub mod operators;
pub mod population;
pub mod evolution_engine;
pub mod progress;

pub use population::{Population, ScoredChromosome};
pub use evolution_engine::{
    EngineState, EvolutionConfig, EvolutionEngine, RunOutcome, Termination,
};
pub use operators::{
    crossover, distinct_roulette_selection, mutate, mutation_tiers, random_chromosome,
    roulette_selection, RouletteWheel,
};
pub use progress::{
    ChannelReporter, ConsoleReporter, ProgressMessage, Reporter,
};
