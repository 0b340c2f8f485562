use crate::config::AppConfig;
use crate::engines::generation::{Reporter, RunOutcome, Termination};
use crate::error::{PidTuneError, Result};
use crate::types::{ChampionReplay, Chromosome, GenerationSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

pub const FITNESS_FILE: &str = "fitness_values.csv";
pub const CHAMPION_FILE: &str = "champion_gains.csv";
pub const SUMMARY_FILE: &str = "run_summary.json";

/// Final record written to `run_summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub seed: u64,
    pub generations: usize,
    pub termination: String,
    pub best_fitness: f64,
    pub best: Chromosome,
    pub last_generation: Option<GenerationSummary>,
    pub config: Option<AppConfig>,
}

/// What the writer thread produced.
#[derive(Debug, Clone, Default)]
pub struct RecorderReport {
    pub generations_written: usize,
    pub replays_written: usize,
    pub files: Vec<PathBuf>,
}

enum RecordEvent {
    Generation(GenerationSummary),
    Replay(ChampionReplay),
    Complete(Box<RunRecord>),
}

/// Persists run artifacts from a background thread.
///
/// The engine only pushes events onto an unbounded channel, so disk I/O never
/// holds up the next generation. Call [`finish`](Self::finish) to wait for
/// the writer and collect any I/O error it hit.
pub struct RunRecorder {
    sender: Option<Sender<RecordEvent>>,
    handle: Option<JoinHandle<Result<RecorderReport>>>,
    runs_per_screenshot: usize,
    started_at: DateTime<Utc>,
    config: Option<AppConfig>,
}

impl RunRecorder {
    pub fn start<P: AsRef<Path>>(output_dir: P, runs_per_screenshot: usize) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        create_dir_all(&output_dir)?;

        let (sender, receiver) = channel();
        let handle = thread::Builder::new()
            .name("pidtune-recorder".to_string())
            .spawn(move || write_events(&output_dir, receiver))?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            runs_per_screenshot,
            started_at: Utc::now(),
            config: None,
        })
    }

    /// Embed the configuration in the run summary.
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn finish(mut self) -> Result<RecorderReport> {
        self.sender.take();
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| PidTuneError::Reporting("recorder thread panicked".to_string()))?,
            None => Ok(RecorderReport::default()),
        }
    }

    fn send(&self, event: RecordEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                log::warn!("Recorder thread has stopped; dropping event");
            }
        }
    }
}

impl Drop for RunRecorder {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if let Ok(Err(e)) = handle.join() {
                log::warn!("Recorder failed: {}", e);
            }
        }
    }
}

impl Reporter for RunRecorder {
    fn on_generation(&mut self, summary: &GenerationSummary) {
        self.send(RecordEvent::Generation(summary.clone()));
    }

    fn wants_replay(&self, generation: usize) -> bool {
        self.runs_per_screenshot > 0 && generation % self.runs_per_screenshot == 0
    }

    fn on_champion_replay(&mut self, replay: &ChampionReplay) {
        self.send(RecordEvent::Replay(replay.clone()));
    }

    fn on_run_complete(&mut self, outcome: &RunOutcome) {
        let termination = match outcome.termination {
            Termination::MaxRuns => "max_runs".to_string(),
            Termination::ThresholdReached { generation, .. } => {
                format!("threshold_reached_at_generation_{}", generation)
            }
        };
        let record = RunRecord {
            started_at: self.started_at,
            finished_at: Utc::now(),
            seed: outcome.seed,
            generations: outcome.generations,
            termination,
            best_fitness: outcome.best.fitness,
            best: outcome.best.chromosome,
            last_generation: outcome.summaries.last().cloned(),
            config: self.config.clone(),
        };
        self.send(RecordEvent::Complete(Box::new(record)));
    }
}

pub fn replay_filename(generation: usize) -> String {
    format!("champion_run_{}.csv", generation)
}

fn write_events(output_dir: &Path, receiver: Receiver<RecordEvent>) -> Result<RecorderReport> {
    let mut report = RecorderReport::default();

    let fitness_path = output_dir.join(FITNESS_FILE);
    let champion_path = output_dir.join(CHAMPION_FILE);
    let mut fitness = BufWriter::new(File::create(&fitness_path)?);
    let mut champions = BufWriter::new(File::create(&champion_path)?);
    writeln!(fitness, "generation,avg_fitness,max_fitness")?;
    writeln!(champions, "generation,kp,ki,kd,fitness")?;
    report.files.push(fitness_path);
    report.files.push(champion_path);

    for event in receiver {
        match event {
            RecordEvent::Generation(summary) => {
                writeln!(
                    fitness,
                    "{},{},{}",
                    summary.generation, summary.avg_fitness, summary.max_fitness
                )?;
                writeln!(
                    champions,
                    "{},{},{},{},{}",
                    summary.generation,
                    summary.champion.kp(),
                    summary.champion.ki(),
                    summary.champion.kd(),
                    summary.max_fitness
                )?;
                report.generations_written += 1;
            }
            RecordEvent::Replay(replay) => {
                let path = output_dir.join(replay_filename(replay.generation));
                write_replay(&path, &replay)?;
                report.replays_written += 1;
                report.files.push(path);
            }
            RecordEvent::Complete(record) => {
                let path = output_dir.join(SUMMARY_FILE);
                let file = BufWriter::new(File::create(&path)?);
                serde_json::to_writer_pretty(file, &record)?;
                report.files.push(path);
            }
        }
    }

    fitness.flush()?;
    champions.flush()?;
    log::debug!(
        "Recorder wrote {} generations and {} replays to {}",
        report.generations_written,
        report.replays_written,
        output_dir.display()
    );
    Ok(report)
}

fn write_replay(path: &Path, replay: &ChampionReplay) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "# fitness,{}", replay.fitness)?;
    writeln!(
        file,
        "# kp,{},ki,{},kd,{}",
        replay.champion.kp(),
        replay.champion.ki(),
        replay.champion.kd()
    )?;
    writeln!(file, "timestep,reference,position,error")?;
    for step in &replay.steps {
        writeln!(
            file,
            "{},{},{},{}",
            step.timestep, step.reference, step.position, step.error
        )?;
    }
    file.flush()?;
    Ok(())
}
