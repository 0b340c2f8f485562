use thiserror::Error;

#[derive(Error, Debug)]
pub enum PidTuneError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Degenerate selection: {0}")]
    DegenerateSelection(String),

    #[error("Cannot score an empty error sequence")]
    EmptyErrorSequence,

    #[error("Trajectory too short: need {required} values, got {available}")]
    TrajectoryTooShort { required: usize, available: usize },

    #[error("Invalid gene {gene}: {value} (gains must be finite and non-negative)")]
    InvalidGene { gene: &'static str, value: f64 },

    #[error("Trajectory parse error on line {line}: {content:?}")]
    TrajectoryParse { line: usize, content: String },

    #[error("Reporting error: {0}")]
    Reporting(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Config load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, PidTuneError>;
