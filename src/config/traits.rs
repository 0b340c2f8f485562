use crate::error::PidTuneError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), PidTuneError>;
}

/// Reject values outside `[0, 1]` (NaN included).
pub(crate) fn ensure_probability(name: &str, value: f64) -> Result<(), PidTuneError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PidTuneError::Configuration(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )))
    }
}

pub(crate) fn ensure_positive(name: &str, value: usize) -> Result<(), PidTuneError> {
    if value == 0 {
        return Err(PidTuneError::Configuration(format!(
            "{} must be greater than 0",
            name
        )));
    }
    Ok(())
}
