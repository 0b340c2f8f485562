use anyhow::{Context, Result};
use clap::Parser;
use pidtune::config::ConfigManager;
use pidtune::data::{trajectory_rng, RandomWalkGenerator, TrajectoryFile};
use pidtune::engines::generation::{ConsoleReporter, EvolutionConfig, EvolutionEngine};
use pidtune::engines::simulation::TrackingObjective;
use pidtune::reporting::RunRecorder;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pidtune",
    about = "Evolve PID gains that track a synthetic reference trajectory"
)]
struct Cli {
    /// TOML or JSON configuration file (PIDTUNE_* environment variables override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for the trajectory and the evolution run
    #[arg(long)]
    seed: Option<u64>,

    /// Number of chromosomes per generation
    #[arg(long)]
    population_size: Option<usize>,

    /// Number of generations to run
    #[arg(long)]
    max_runs: Option<usize>,

    /// Directory for the trajectory file and run artifacts
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Generate a fresh trajectory even if the config says to load one
    #[arg(long, conflicts_with = "load_trajectory")]
    new_trajectory: bool,

    /// Reuse the trajectory saved in the data directory
    #[arg(long)]
    load_trajectory: bool,

    /// Evaluate the population on a single thread
    #[arg(long)]
    no_parallel: bool,

    /// Do not write CSV/JSON artifacts
    #[arg(long)]
    no_record: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let manager = ConfigManager::new();
    match &cli.config {
        Some(path) => manager
            .load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => manager
            .load_from_env()
            .context("loading config from environment")?,
    }

    manager
        .update(|config| {
            if let Some(seed) = cli.seed {
                config.evolution.seed = Some(seed);
            }
            if let Some(size) = cli.population_size {
                config.evolution.population_size = size;
            }
            if let Some(runs) = cli.max_runs {
                config.evolution.max_runs = runs;
            }
            if let Some(dir) = &cli.data_dir {
                config.output.data_directory = dir.clone();
            }
            if cli.new_trajectory {
                config.simulation.new_trajectory = true;
            }
            if cli.load_trajectory {
                config.simulation.new_trajectory = false;
            }
            if cli.no_parallel {
                config.evolution.parallel_evaluation = false;
            }
            if cli.no_record {
                config.output.record_artifacts = false;
            }
        })
        .context("applying command-line overrides")?;

    if cli.print_config {
        print!("{}", manager.to_toml()?);
        return Ok(());
    }

    let mut seed = 0;
    manager
        .update(|config| seed = config.evolution.resolve_seed())
        .context("resolving run seed")?;

    let config = manager.get();
    std::fs::create_dir_all(&config.output.data_directory).with_context(|| {
        format!(
            "creating data directory {}",
            config.output.data_directory.display()
        )
    })?;

    let mut walk_rng = trajectory_rng(seed);
    let generator = RandomWalkGenerator::new(
        config.simulation.line_smoothness,
        config.simulation.trajectory_step_scale,
    );
    let trajectory_path = config.output.trajectory_path();
    let trajectory = TrajectoryFile::load_or_generate(
        &trajectory_path,
        config.simulation.new_trajectory,
        config.simulation.max_timesteps,
        &generator,
        &mut walk_rng,
    )
    .with_context(|| format!("preparing trajectory {}", trajectory_path.display()))?;

    let objective = TrackingObjective::new(&trajectory, config.simulation.max_timesteps)?;
    let mut engine = EvolutionEngine::new(EvolutionConfig::from_app_config(&config), objective)?;

    let recorder = if config.output.record_artifacts {
        Some(
            RunRecorder::start(
                &config.output.data_directory,
                config.output.runs_per_screenshot,
            )?
            .with_config(config.clone()),
        )
    } else {
        None
    };

    let mut reporters = (ConsoleReporter, recorder);
    let outcome = engine.run(&mut reporters)?;

    if let (_, Some(recorder)) = reporters {
        let report = recorder.finish().context("writing run artifacts")?;
        log::info!(
            "Wrote {} files to {}",
            report.files.len(),
            config.output.data_directory.display()
        );
    }

    println!(
        "Champion: {} (fitness {}, seed {})",
        outcome.best.chromosome, outcome.best.fitness, outcome.seed
    );
    Ok(())
}
