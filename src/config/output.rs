use super::traits::{ensure_positive, ConfigSection};
use crate::error::PidTuneError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_directory: PathBuf,
    pub trajectory_filename: String,
    /// Replay the champion every N generations.
    pub runs_per_screenshot: usize,
    pub record_artifacts: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("genetic_pid_data"),
            trajectory_filename: "map.csv".to_string(),
            runs_per_screenshot: 10,
            record_artifacts: true,
        }
    }
}

impl OutputConfig {
    pub fn trajectory_path(&self) -> PathBuf {
        self.data_directory.join(&self.trajectory_filename)
    }
}

impl ConfigSection for OutputConfig {
    fn section_name() -> &'static str {
        "output"
    }

    fn validate(&self) -> Result<(), PidTuneError> {
        ensure_positive("runs_per_screenshot", self.runs_per_screenshot)?;
        if self.trajectory_filename.trim().is_empty() {
            return Err(PidTuneError::Configuration(
                "trajectory_filename must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
