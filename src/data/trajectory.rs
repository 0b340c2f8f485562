use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Mixed into the run seed so the trajectory draws from its own stream.
const TRAJECTORY_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Reference signal the simulated controller tries to follow.
pub trait TrajectorySource: Send + Sync {
    /// Reference value at timestep `t`, or `None` past the end.
    fn get(&self, t: usize) -> Option<f64>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory trajectory, fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    values: Vec<f64>,
}

impl Trajectory {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for Trajectory {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl TrajectorySource for Trajectory {
    fn get(&self, t: usize) -> Option<f64> {
        self.values.get(t).copied()
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

/// Random walk around zero.
///
/// At every timestep the line moves with probability `line_smoothness`
/// (so 0 gives a flat line) by `(u - 0.5) * step_scale`, otherwise it holds.
#[derive(Debug, Clone, Copy)]
pub struct RandomWalkGenerator {
    pub line_smoothness: f64,
    pub step_scale: f64,
}

impl RandomWalkGenerator {
    pub fn new(line_smoothness: f64, step_scale: f64) -> Self {
        Self {
            line_smoothness,
            step_scale,
        }
    }

    pub fn generate<R: Rng>(&self, timesteps: usize, rng: &mut R) -> Trajectory {
        let mut current = 0.0;
        let values = (0..timesteps)
            .map(|_| {
                if rng.gen::<f64>() < self.line_smoothness {
                    current += (rng.gen::<f64>() - 0.5) * self.step_scale;
                }
                current
            })
            .collect();
        Trajectory::new(values)
    }
}

/// Generator RNG for a run seed, independent of the engine's stream.
pub fn trajectory_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ TRAJECTORY_STREAM)
}
