pub mod pid;
pub mod fitness;
pub mod objective;

pub use pid::PidSimulator;
pub use fitness::{FitnessEvaluator, PERFECT_TRACKING_FITNESS, DIVERGED_FITNESS};
pub use objective::TrackingObjective;
