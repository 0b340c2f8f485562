use crate::error::{PidTuneError, Result};

/// Score given to perfect tracking (zero squared error).
///
/// Finite so that population sums stay finite, and far above the largest
/// score a non-zero error can produce (`1 / sqrt(smallest subnormal)` is
/// roughly `4.5e161`).
pub const PERFECT_TRACKING_FITNESS: f64 = 1.0e300;

/// Score given when the loop diverged and the squared error overflowed or
/// became NaN. Below every score a finite error can produce.
pub const DIVERGED_FITNESS: f64 = f64::MIN_POSITIVE;

/// Reduces an error sequence to `1 / sqrt(sum(e^2))`; higher is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessEvaluator;

impl FitnessEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn fitness(&self, errors: &[f64]) -> Result<f64> {
        if errors.is_empty() {
            return Err(PidTuneError::EmptyErrorSequence);
        }

        let sum_squares: f64 = errors.iter().map(|e| e * e).sum();

        let fitness = if sum_squares == 0.0 {
            PERFECT_TRACKING_FITNESS
        } else if !sum_squares.is_finite() {
            DIVERGED_FITNESS
        } else {
            1.0 / sum_squares.sqrt()
        };

        Ok(fitness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_tracking_gets_sentinel() {
        let fitness = FitnessEvaluator::new().fitness(&[0.0; 10]).unwrap();
        assert_eq!(fitness, PERFECT_TRACKING_FITNESS);
    }

    #[test]
    fn test_single_unit_error() {
        let fitness = FitnessEvaluator::new().fitness(&[1.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(fitness, 1.0);
    }

    #[test]
    fn test_inverse_root_sum_of_squares() {
        let fitness = FitnessEvaluator::new().fitness(&[3.0, -4.0]).unwrap();
        assert!((fitness - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sequence_is_error() {
        assert!(matches!(
            FitnessEvaluator::new().fitness(&[]),
            Err(PidTuneError::EmptyErrorSequence)
        ));
    }

    #[test]
    fn test_strictly_decreasing_in_squared_error() {
        let evaluator = FitnessEvaluator::new();
        let mut previous = evaluator.fitness(&[0.0]).unwrap();
        for error in [1e-150, 1e-10, 0.5, 1.0, 2.0, 1e10, 1e150] {
            let current = evaluator.fitness(&[error]).unwrap();
            assert!(current < previous, "{} not below {}", current, previous);
            assert!(current > 0.0);
            previous = current;
        }
    }

    #[test]
    fn test_diverged_loop_ranks_last() {
        let evaluator = FitnessEvaluator::new();
        let diverged = evaluator.fitness(&[1e200, 1e200]).unwrap();
        let nan = evaluator.fitness(&[f64::NAN]).unwrap();
        let huge = evaluator.fitness(&[1e150]).unwrap();

        assert_eq!(diverged, DIVERGED_FITNESS);
        assert_eq!(nan, DIVERGED_FITNESS);
        assert!(diverged < huge);
    }

    #[test]
    fn test_pure() {
        let evaluator = FitnessEvaluator::new();
        let errors = [0.3, -0.1, 0.05];
        assert_eq!(evaluator.fitness(&errors).unwrap(), evaluator.fitness(&errors).unwrap());
    }
}
