use crate::data::trajectory::{RandomWalkGenerator, Trajectory};
use crate::error::{PidTuneError, Result};
use rand::Rng;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Trajectory file: one reference value per line.
pub struct TrajectoryFile;

impl TrajectoryFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Trajectory> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut values = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            // Older files wrote a single-column CSV row; take the first field.
            let field = trimmed.split(',').next().unwrap_or(trimmed).trim();
            let value: f64 = field.parse().map_err(|_| PidTuneError::TrajectoryParse {
                line: index + 1,
                content: line.clone(),
            })?;
            if !value.is_finite() {
                return Err(PidTuneError::TrajectoryParse {
                    line: index + 1,
                    content: line,
                });
            }
            values.push(value);
        }

        log::debug!("Loaded {} trajectory points from {}", values.len(), path.as_ref().display());
        Ok(Trajectory::new(values))
    }

    pub fn save<P: AsRef<Path>>(path: P, trajectory: &Trajectory) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        for value in trajectory.values() {
            writeln!(writer, "{}", value)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Generate and persist a fresh trajectory, or load the saved one.
    pub fn load_or_generate<P: AsRef<Path>, R: Rng>(
        path: P,
        generate_new: bool,
        timesteps: usize,
        generator: &RandomWalkGenerator,
        rng: &mut R,
    ) -> Result<Trajectory> {
        if !generate_new {
            return Self::load(path);
        }

        let trajectory = generator.generate(timesteps, rng);
        Self::save(&path, &trajectory)?;
        log::info!(
            "Generated {}-step trajectory at {}",
            timesteps,
            path.as_ref().display()
        );
        Ok(trajectory)
    }
}
