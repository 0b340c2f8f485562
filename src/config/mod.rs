pub mod traits;
pub mod evolution;
pub mod simulation;
pub mod output;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::{draw_seed, EvolutionConfig, ThresholdPolicy, MAX_SEED};
pub use simulation::SimulationConfig;
pub use output::OutputConfig;
