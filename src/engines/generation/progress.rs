use super::evolution_engine::RunOutcome;
use super::population::Population;
use crate::types::{ChampionReplay, GenerationSummary};
use std::sync::mpsc::Sender;

/// Receives progress from the engine at generation boundaries.
///
/// Calls are fire-and-forget: a reporter must not fail the run, and anything
/// slow (file I/O, plotting) belongs on another thread.
pub trait Reporter {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_population(&mut self, _generation: usize, _population: &Population) {}

    fn on_generation(&mut self, summary: &GenerationSummary);

    /// Ask the engine for a detailed champion replay of this generation.
    fn wants_replay(&self, _generation: usize) -> bool {
        false
    }

    fn on_champion_replay(&mut self, _replay: &ChampionReplay) {}

    fn on_population_reset(&mut self, _generation: usize) {}

    fn on_run_complete(&mut self, _outcome: &RunOutcome) {}
}

/// Discards everything.
impl Reporter for () {
    fn on_generation(&mut self, _summary: &GenerationSummary) {}
}

pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn on_generation(&mut self, summary: &GenerationSummary) {
        println!(
            "Run {}: max value {}, avg value {}",
            summary.generation, summary.max_fitness, summary.avg_fitness
        );
    }

    fn on_population_reset(&mut self, generation: usize) {
        println!("Run {}: population below threshold, starting over", generation);
    }

    fn on_run_complete(&mut self, outcome: &RunOutcome) {
        println!(
            "Best after {} runs: fitness {} ({})",
            outcome.generations, outcome.best.fitness, outcome.best.chromosome
        );
    }
}

// For handing progress to another thread
pub struct ChannelReporter {
    sender: Sender<ProgressMessage>,
    replay_every: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete(GenerationSummary),
    ChampionReplay(ChampionReplay),
    PopulationReset(usize),
    RunComplete { generations: usize, best_fitness: f64 },
}

impl ChannelReporter {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self {
            sender,
            replay_every: None,
        }
    }

    /// Also request a champion replay every `every` generations (0 disables).
    pub fn with_replays(mut self, every: usize) -> Self {
        self.replay_every = (every > 0).then_some(every);
        self
    }
}

impl Reporter for ChannelReporter {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation(&mut self, summary: &GenerationSummary) {
        let _ = self
            .sender
            .send(ProgressMessage::GenerationComplete(summary.clone()));
    }

    fn wants_replay(&self, generation: usize) -> bool {
        self.replay_every.is_some_and(|every| generation % every == 0)
    }

    fn on_champion_replay(&mut self, replay: &ChampionReplay) {
        let _ = self.sender.send(ProgressMessage::ChampionReplay(replay.clone()));
    }

    fn on_population_reset(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::PopulationReset(generation));
    }

    fn on_run_complete(&mut self, outcome: &RunOutcome) {
        let _ = self.sender.send(ProgressMessage::RunComplete {
            generations: outcome.generations,
            best_fitness: outcome.best.fitness,
        });
    }
}

/// Both halves see every event, first then second.
impl<A: Reporter, B: Reporter> Reporter for (A, B) {
    fn on_generation_start(&mut self, generation: usize) {
        self.0.on_generation_start(generation);
        self.1.on_generation_start(generation);
    }

    fn on_population(&mut self, generation: usize, population: &Population) {
        self.0.on_population(generation, population);
        self.1.on_population(generation, population);
    }

    fn on_generation(&mut self, summary: &GenerationSummary) {
        self.0.on_generation(summary);
        self.1.on_generation(summary);
    }

    fn wants_replay(&self, generation: usize) -> bool {
        self.0.wants_replay(generation) || self.1.wants_replay(generation)
    }

    fn on_champion_replay(&mut self, replay: &ChampionReplay) {
        if self.0.wants_replay(replay.generation) {
            self.0.on_champion_replay(replay);
        }
        if self.1.wants_replay(replay.generation) {
            self.1.on_champion_replay(replay);
        }
    }

    fn on_population_reset(&mut self, generation: usize) {
        self.0.on_population_reset(generation);
        self.1.on_population_reset(generation);
    }

    fn on_run_complete(&mut self, outcome: &RunOutcome) {
        self.0.on_run_complete(outcome);
        self.1.on_run_complete(outcome);
    }
}

/// An absent reporter ignores everything.
impl<R: Reporter> Reporter for Option<R> {
    fn on_generation_start(&mut self, generation: usize) {
        if let Some(inner) = self {
            inner.on_generation_start(generation);
        }
    }

    fn on_population(&mut self, generation: usize, population: &Population) {
        if let Some(inner) = self {
            inner.on_population(generation, population);
        }
    }

    fn on_generation(&mut self, summary: &GenerationSummary) {
        if let Some(inner) = self {
            inner.on_generation(summary);
        }
    }

    fn wants_replay(&self, generation: usize) -> bool {
        self.as_ref().is_some_and(|inner| inner.wants_replay(generation))
    }

    fn on_champion_replay(&mut self, replay: &ChampionReplay) {
        if let Some(inner) = self {
            inner.on_champion_replay(replay);
        }
    }

    fn on_population_reset(&mut self, generation: usize) {
        if let Some(inner) = self {
            inner.on_population_reset(generation);
        }
    }

    fn on_run_complete(&mut self, outcome: &RunOutcome) {
        if let Some(inner) = self {
            inner.on_run_complete(outcome);
        }
    }
}
