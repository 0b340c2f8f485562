pub mod recorder;

pub use recorder::{RecorderReport, RunRecord, RunRecorder};
