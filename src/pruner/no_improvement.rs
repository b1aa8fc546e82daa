use std::collections::HashMap;

use parking_lot::Mutex;

use super::Pruner;
use crate::sampler::CompletedTrial;
use crate::types::Direction;

/// Per-trial best score and the step it was recorded at.
#[derive(Clone, Copy, Debug)]
struct BestSoFar {
    value: f64,
    step: u64,
}

/// Prunes a trial once its score has stopped improving.
///
/// After a warmup period, each reported score is compared against the
/// trial's best score so far. A score only counts as an improvement when
/// it beats the best by strictly more than `min_improvement`; once more
/// than `patience` steps pass without such an improvement, the trial is
/// pruned. During warmup the running best is tracked but pruning is
/// disabled.
///
/// All comparisons are expressed as minimization through a ±1 direction
/// multiplier, so minimize and maximize share one code path.
///
/// Best scores are keyed per trial id, so one pruner instance can serve
/// interleaved or concurrent trials without their histories bleeding into
/// each other. A trial's entry is dropped as soon as it finishes, whether
/// pruned here or reported finished via
/// [`trial_finished`](Pruner::trial_finished), returning that id to the
/// initial sentinel state.
///
/// # Examples
///
/// ```
/// use gridtune::pruner::NoImprovementPruner;
///
/// // Direction can come from string config; unknown strings fail fast.
/// let direction = "maximize".parse().unwrap();
/// let pruner = NoImprovementPruner::new(direction)
///     .warmup_steps(0)
///     .patience(2)
///     .min_improvement(5.0);
/// ```
pub struct NoImprovementPruner {
    direction: Direction,
    /// Number of evaluations before pruning may trigger.
    warmup_steps: u64,
    /// Evaluations without sufficient improvement tolerated before pruning.
    patience: u64,
    /// Improvement (in the optimization direction) required to reset the stall counter.
    min_improvement: f64,
    /// Best score seen per trial id.
    bests: Mutex<HashMap<u64, BestSoFar>>,
}

impl NoImprovementPruner {
    /// Create a pruner for the given optimization direction.
    ///
    /// Defaults: `warmup_steps = 2`, `patience = 2`, `min_improvement = 1.0`.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            warmup_steps: 2,
            patience: 2,
            min_improvement: 1.0,
            bests: Mutex::new(HashMap::new()),
        }
    }

    /// Set the number of warmup evaluations. No pruning occurs before
    /// this step; the running best is still tracked.
    #[must_use]
    pub fn warmup_steps(mut self, n: u64) -> Self {
        self.warmup_steps = n;
        self
    }

    /// Set how many evaluations without improvement are tolerated.
    ///
    /// Pruning fires when `step - best_step` strictly exceeds the
    /// patience, never at equality.
    #[must_use]
    pub fn patience(mut self, n: u64) -> Self {
        self.patience = n;
        self
    }

    /// Set the minimum improvement over the best score required to reset
    /// the stall counter. An improvement of exactly this amount does not
    /// count.
    #[must_use]
    pub fn min_improvement(mut self, tol: f64) -> Self {
        self.min_improvement = tol;
        self
    }

    /// Sentinel best: infinity folded into the optimization direction, so
    /// any real score beats it.
    fn sentinel(&self) -> BestSoFar {
        BestSoFar {
            value: self.direction.sign() * f64::INFINITY,
            step: 0,
        }
    }

    #[cfg(test)]
    fn n_tracked(&self) -> usize {
        self.bests.lock().len()
    }

    #[cfg(test)]
    fn best_for(&self, trial_id: u64) -> (f64, u64) {
        let best = self
            .bests
            .lock()
            .get(&trial_id)
            .copied()
            .unwrap_or_else(|| self.sentinel());
        (best.value, best.step)
    }
}

impl Pruner for NoImprovementPruner {
    fn should_prune(
        &self,
        trial_id: u64,
        _step: u64,
        intermediate_values: &[(u64, f64)],
        _completed_trials: &[CompletedTrial],
    ) -> bool {
        // Nothing reported yet: tolerate being queried early.
        let Some(&(step, current_value)) = intermediate_values.last() else {
            return false;
        };

        let sign = self.direction.sign();
        let mut bests = self.bests.lock();
        let best = bests.entry(trial_id).or_insert_with(|| self.sentinel());

        // During warmup, track the baseline best but never prune.
        if step < self.warmup_steps {
            if sign * current_value < sign * best.value {
                best.value = current_value;
            }
            return false;
        }

        // A new best must beat the old one by strictly more than the tolerance.
        if sign * current_value < sign * best.value - self.min_improvement {
            best.value = current_value;
            best.step = step;
        }

        if step.saturating_sub(best.step) > self.patience {
            // Back to the sentinel so the id starts clean if ever reused.
            bests.remove(&trial_id);
            return true;
        }

        false
    }

    fn trial_finished(&self, trial_id: u64) {
        self.bests.lock().remove(&trial_id);
    }
}
