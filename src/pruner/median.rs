use super::Pruner;
use crate::sampler::CompletedTrial;
use crate::types::{Direction, TrialState};

/// Prunes trials performing worse than the median of completed trials at
/// the same step.
///
/// The comparison is folded into minimization via the direction sign, so
/// minimize and maximize share one code path. Pruned trials are excluded
/// from the median so they cannot drag it toward easy targets.
///
/// # Examples
///
/// ```
/// use gridtune::Direction;
/// use gridtune::pruner::MedianPruner;
///
/// let pruner = MedianPruner::new(Direction::Maximize)
///     .warmup_steps(3)
///     .min_trials(5);
/// ```
pub struct MedianPruner {
    direction: Direction,
    /// Don't prune in the first N steps.
    warmup_steps: u64,
    /// Require at least N completed trials before pruning.
    min_trials: usize,
}

impl MedianPruner {
    /// Create a `MedianPruner` for the given optimization direction.
    ///
    /// Defaults: `warmup_steps = 0`, `min_trials = 1`.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            warmup_steps: 0,
            min_trials: 1,
        }
    }

    /// Set the number of warmup steps. No pruning occurs before this step.
    #[must_use]
    pub fn warmup_steps(mut self, n: u64) -> Self {
        self.warmup_steps = n;
        self
    }

    /// Set the minimum number of completed trials required before pruning.
    #[must_use]
    pub fn min_trials(mut self, n: usize) -> Self {
        self.min_trials = n;
        self
    }
}

impl Pruner for MedianPruner {
    fn should_prune(
        &self,
        _trial_id: u64,
        step: u64,
        intermediate_values: &[(u64, f64)],
        completed_trials: &[CompletedTrial],
    ) -> bool {
        if step < self.warmup_steps {
            return false;
        }

        let Some(&(_, current_value)) = intermediate_values.last() else {
            return false;
        };

        let mut values_at_step: Vec<f64> = completed_trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .filter_map(|t| {
                t.intermediate_values
                    .iter()
                    .find(|(s, _)| *s == step)
                    .map(|&(_, v)| v)
            })
            .collect();

        if values_at_step.len() < self.min_trials {
            return false;
        }

        let sign = self.direction.sign();
        let median = median_in_place(&mut values_at_step);
        sign * current_value > sign * median
    }
}

/// Median of a non-empty slice. Sorts the slice in place.
fn median_in_place(values: &mut [f64]) -> f64 {
    values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
    let len = values.len();
    if len % 2 == 1 {
        values[len / 2]
    } else {
        (values[len / 2 - 1] + values[len / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_count() {
        assert!((median_in_place(&mut [9.0, 1.0, 4.0]) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn median_even_count() {
        assert!((median_in_place(&mut [1.0, 2.0, 10.0, 4.0]) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn median_single_value() {
        assert!((median_in_place(&mut [2.5]) - 2.5).abs() < f64::EPSILON);
    }
}
