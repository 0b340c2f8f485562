use pidtune::data::Trajectory;
use pidtune::engines::generation::{
    EvolutionConfig, EvolutionEngine, Population, Reporter, RunOutcome, Termination,
};
use pidtune::engines::simulation::TrackingObjective;
use pidtune::GenerationSummary;

/// Records every population and summary the engine hands out.
#[derive(Default)]
struct TestCollector {
    fitness_by_generation: Vec<Vec<f64>>,
    genes_by_generation: Vec<Vec<[f64; 3]>>,
    summaries: Vec<GenerationSummary>,
}

impl Reporter for TestCollector {
    fn on_population(&mut self, _generation: usize, population: &Population) {
        self.fitness_by_generation.push(population.fitness_vector());
        self.genes_by_generation
            .push(population.chromosomes().iter().map(|c| c.gains()).collect());
    }

    fn on_generation(&mut self, summary: &GenerationSummary) {
        self.summaries.push(summary.clone());
    }
}

fn create_test_config(seed: u64) -> EvolutionConfig {
    EvolutionConfig {
        population_size: 30,
        max_timesteps: 60,
        max_runs: 12,
        mutation_probability: 0.2,
        seed: Some(seed),
        ..Default::default()
    }
}

fn create_test_objective(timesteps: usize) -> TrackingObjective {
    let values: Vec<f64> = (0..timesteps)
        .map(|t| 0.5 + (t as f64 * 0.1).sin() * 0.3)
        .collect();
    TrackingObjective::new(&Trajectory::new(values), timesteps).unwrap()
}

fn run_collected(config: EvolutionConfig) -> (TestCollector, RunOutcome) {
    let timesteps = config.max_timesteps;
    let mut engine = EvolutionEngine::new(config, create_test_objective(timesteps)).unwrap();
    let mut collector = TestCollector::default();
    let outcome = engine.run(&mut collector).unwrap();
    (collector, outcome)
}

#[test]
fn test_same_seed_reproduces_run() {
    let (first, first_outcome) = run_collected(create_test_config(2024));
    let (second, second_outcome) = run_collected(EvolutionConfig {
        parallel_evaluation: false,
        ..create_test_config(2024)
    });

    assert_eq!(first.genes_by_generation, second.genes_by_generation);
    assert_eq!(first.fitness_by_generation, second.fitness_by_generation);
    assert_eq!(first_outcome.best, second_outcome.best);
}

#[test]
fn test_different_seeds_diverge() {
    let (first, _) = run_collected(create_test_config(1));
    let (second, _) = run_collected(create_test_config(2));
    assert_ne!(first.genes_by_generation[0], second.genes_by_generation[0]);
}

#[test]
fn test_population_shape_and_gene_bounds() {
    let (collector, outcome) = run_collected(create_test_config(7));

    assert_eq!(collector.genes_by_generation.len(), 12);
    for (genes, fitness) in collector
        .genes_by_generation
        .iter()
        .zip(&collector.fitness_by_generation)
    {
        assert_eq!(genes.len(), 30);
        assert_eq!(fitness.len(), 30);
        assert!(genes.iter().flatten().all(|g| g.is_finite() && *g >= 0.0));
        assert!(fitness.iter().all(|f| f.is_finite() && *f > 0.0));
    }
    assert_eq!(outcome.final_population.len(), 30);
}

#[test]
fn test_elitism_never_loses_best_fitness() {
    let (collector, outcome) = run_collected(create_test_config(99));

    for pair in collector.summaries.windows(2) {
        assert!(
            pair[1].max_fitness >= pair[0].max_fitness,
            "max fitness dropped from {} to {} at generation {}",
            pair[0].max_fitness,
            pair[1].max_fitness,
            pair[1].generation
        );
    }
    let last = collector.summaries.last().unwrap();
    assert_eq!(outcome.best.fitness, last.max_fitness);
    assert_eq!(outcome.termination, Termination::MaxRuns);
}

#[test]
fn test_champion_is_carried_into_next_generation() {
    let (collector, _) = run_collected(create_test_config(5));

    for (generation, summary) in collector.summaries.iter().enumerate().take(11) {
        let next = &collector.genes_by_generation[generation + 1];
        assert_eq!(next.last(), Some(&summary.champion.gains()));
    }
}

#[test]
fn test_summary_matches_population() {
    let (collector, _) = run_collected(create_test_config(31));

    for (summary, fitness) in collector.summaries.iter().zip(&collector.fitness_by_generation) {
        let max = fitness.iter().cloned().fold(f64::MIN, f64::max);
        let avg = fitness.iter().sum::<f64>() / fitness.len() as f64;
        assert_eq!(summary.max_fitness, max);
        assert!((summary.avg_fitness - avg).abs() <= avg * 1e-12);
        assert!(summary.avg_fitness <= summary.max_fitness);
    }
}
