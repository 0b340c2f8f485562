use pidtune::config::{AppConfig, ConfigManager, MAX_SEED};
use pidtune::data::{trajectory_rng, RandomWalkGenerator, TrajectoryFile, TrajectorySource};
use pidtune::engines::generation::{EvolutionConfig, EvolutionEngine};
use pidtune::engines::simulation::TrackingObjective;
use pidtune::reporting::RunRecorder;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use tempfile::TempDir;

const TEST_CONFIG: &str = r#"
[evolution]
population_size = 8
max_runs = 4
seed = 5
parallel_evaluation = false

[simulation]
max_timesteps = 40
line_smoothness = 0.5

[output]
runs_per_screenshot = 2
"#;

fn load_test_config(dir: &TempDir) -> AppConfig {
    let path = dir.path().join("pidtune.toml");
    fs::write(&path, TEST_CONFIG).unwrap();

    let manager = ConfigManager::new();
    manager.load_from_file(&path).unwrap();
    manager
        .update(|config| config.output.data_directory = dir.path().join("run"))
        .unwrap();
    manager.get()
}

fn build_engine(config: &AppConfig) -> EvolutionEngine {
    let mut rng = trajectory_rng(config.evolution.seed.unwrap());
    let generator = RandomWalkGenerator::new(
        config.simulation.line_smoothness,
        config.simulation.trajectory_step_scale,
    );
    let trajectory = TrajectoryFile::load_or_generate(
        config.output.trajectory_path(),
        true,
        config.simulation.max_timesteps,
        &generator,
        &mut rng,
    )
    .unwrap();
    let objective = TrackingObjective::new(&trajectory, config.simulation.max_timesteps).unwrap();
    EvolutionEngine::new(EvolutionConfig::from_app_config(config), objective).unwrap()
}

#[test]
fn test_config_file_drives_engine() {
    let dir = TempDir::new().unwrap();
    let config = load_test_config(&dir);

    assert_eq!(config.evolution.population_size, 8);
    assert_eq!(config.simulation.max_timesteps, 40);
    // Untouched fields keep their defaults.
    assert_eq!(config.evolution.crossover_rate, 0.9);

    let mut engine = build_engine(&config);
    assert_eq!(engine.seed(), 5);
    let outcome = engine.run(&mut ()).unwrap();

    assert_eq!(outcome.generations, 4);
    assert_eq!(outcome.final_population.len(), 8);
    assert_eq!(outcome.seed, 5);
}

#[test]
fn test_saved_trajectory_is_reused() {
    let dir = TempDir::new().unwrap();
    let config = load_test_config(&dir);
    build_engine(&config);

    let saved = TrajectoryFile::load(config.output.trajectory_path()).unwrap();
    assert_eq!(saved.len(), 40);

    let mut rng = StdRng::seed_from_u64(0);
    let reloaded = TrajectoryFile::load_or_generate(
        config.output.trajectory_path(),
        false,
        40,
        &RandomWalkGenerator::new(1.0, 1.0),
        &mut rng,
    )
    .unwrap();
    assert_eq!(reloaded, saved);
}

#[test]
fn test_recorder_writes_run_artifacts() {
    let dir = TempDir::new().unwrap();
    let config = load_test_config(&dir);
    let data_dir = config.output.data_directory.clone();

    let mut engine = build_engine(&config);
    let mut recorder = RunRecorder::start(&data_dir, config.output.runs_per_screenshot)
        .unwrap()
        .with_config(config.clone());
    let outcome = engine.run(&mut recorder).unwrap();
    let report = recorder.finish().unwrap();

    assert_eq!(report.generations_written, 4);
    // Generations 0 and 2 get a champion replay.
    assert_eq!(report.replays_written, 2);

    let fitness = fs::read_to_string(data_dir.join("fitness_values.csv")).unwrap();
    assert_eq!(fitness.lines().count(), 5);
    assert_eq!(fitness.lines().next(), Some("generation,avg_fitness,max_fitness"));

    let champions = fs::read_to_string(data_dir.join("champion_gains.csv")).unwrap();
    assert_eq!(champions.lines().count(), 5);

    let replay = fs::read_to_string(data_dir.join("champion_run_2.csv")).unwrap();
    let rows = replay
        .lines()
        .skip_while(|line| line.starts_with('#'))
        .skip(1)
        .count();
    assert_eq!(rows, 40);
    assert!(!data_dir.join("champion_run_1.csv").exists());

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(data_dir.join("run_summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["seed"], 5);
    assert_eq!(summary["generations"], 4);
    assert_eq!(summary["termination"], "max_runs");
    assert_eq!(summary["best_fitness"].as_f64(), Some(outcome.best.fitness));
    assert_eq!(summary["config"]["evolution"]["population_size"], 8);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[evolution]\ncrossover_rate = 1.5\n").unwrap();

    let manager = ConfigManager::new();
    assert!(manager.load_from_file(&path).is_err());
    assert_eq!(manager.get().evolution.crossover_rate, 0.9);
}

#[test]
fn test_unseeded_run_is_repeatable_from_saved_config() {
    let dir = TempDir::new().unwrap();
    let mut config = load_test_config(&dir);
    config.evolution.seed = None;
    let seed = config.evolution.resolve_seed();
    assert!(seed <= MAX_SEED);

    let manager = ConfigManager::new();
    manager.update(|c| *c = config.clone()).unwrap();
    let saved = dir.path().join("repeat.toml");
    fs::write(&saved, manager.to_toml().unwrap()).unwrap();

    let reloaded = ConfigManager::new();
    reloaded.load_from_file(&saved).unwrap();
    let reloaded = reloaded.get();
    assert_eq!(reloaded.evolution.seed, Some(seed));

    let first = build_engine(&config).run(&mut ()).unwrap();
    let second = build_engine(&reloaded).run(&mut ()).unwrap();
    assert_eq!(first.seed, seed);
    assert_eq!(first.best, second.best);
    assert_eq!(first.final_population, second.final_population);
}
