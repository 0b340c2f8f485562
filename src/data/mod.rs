pub mod connectors;
pub mod trajectory;

pub use connectors::TrajectoryFile;
pub use trajectory::{trajectory_rng, RandomWalkGenerator, Trajectory, TrajectorySource};
