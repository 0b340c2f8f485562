use super::{
    evolution::EvolutionConfig,
    output::OutputConfig,
    simulation::SimulationConfig,
    traits::ConfigSection,
};
use crate::error::PidTuneError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Environment variables override file values, e.g.
/// `PIDTUNE_EVOLUTION__POPULATION_SIZE=50`.
pub const ENV_PREFIX: &str = "PIDTUNE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub simulation: SimulationConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), PidTuneError> {
        validate_section(&self.evolution)?;
        validate_section(&self.simulation)?;
        validate_section(&self.output)?;
        Ok(())
    }
}

/// Prefix validation failures with the section they came from.
fn validate_section<S: ConfigSection>(section: &S) -> Result<(), PidTuneError> {
    section.validate().map_err(|e| match e {
        PidTuneError::Configuration(msg) => {
            PidTuneError::Configuration(format!("[{}] {}", S::section_name(), msg))
        }
        other => other,
    })
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a TOML or JSON file, layered under `PIDTUNE_*` environment variables.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PidTuneError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PidTuneError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;

        config.validate()?;
        self.replace(config);
        Ok(())
    }

    /// Defaults overridden by `PIDTUNE_*` environment variables only.
    pub fn load_from_env(&self) -> Result<(), PidTuneError> {
        let config: AppConfig = config::Config::builder()
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;

        config.validate()?;
        self.replace(config);
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PidTuneError> {
        let toml_str = self.to_toml()?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, PidTuneError> {
        Ok(toml::to_string_pretty(&self.get())?)
    }

    pub fn get(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Apply `f` and keep the result only if it still validates.
    pub fn update<F>(&self, f: F) -> Result<(), PidTuneError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);
        candidate.validate()?;
        self.replace(candidate);
        Ok(())
    }

    fn replace(&self, config: AppConfig) {
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }
}
