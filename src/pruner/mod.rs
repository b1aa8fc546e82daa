//! Pruner trait and implementations for early trial stopping.
//!
//! Pruners decide whether to stop (prune) an in-progress trial based on
//! the scores it has reported so far, optionally compared against other
//! trials. Killing unpromising PPO configurations after a few evaluation
//! windows instead of a full training run is where most of the compute
//! savings in a tuning study come from.

mod median;
mod no_improvement;
mod nop;

pub use median::MedianPruner;
pub use no_improvement::NoImprovementPruner;
pub use nop::NopPruner;

use crate::sampler::CompletedTrial;

/// Trait for pluggable trial pruning strategies.
///
/// Pruners are consulted after each intermediate value is reported to
/// decide whether the trial should be stopped early. The trait requires
/// `Send + Sync` so a study can be shared across worker threads.
///
/// # Implementing a custom pruner
///
/// ```
/// use gridtune::pruner::Pruner;
/// use gridtune::sampler::CompletedTrial;
///
/// struct CeilingPruner {
///     ceiling: f64,
/// }
///
/// impl Pruner for CeilingPruner {
///     fn should_prune(
///         &self,
///         _trial_id: u64,
///         _step: u64,
///         intermediate_values: &[(u64, f64)],
///         _completed_trials: &[CompletedTrial],
///     ) -> bool {
///         // Prune once the latest score exceeds the ceiling
///         intermediate_values
///             .last()
///             .is_some_and(|&(_, v)| v > self.ceiling)
///     }
/// }
/// ```
pub trait Pruner: Send + Sync {
    /// Decide whether to prune a trial at the given step.
    ///
    /// # Arguments
    ///
    /// * `trial_id` - The current trial's ID.
    /// * `step` - The step at which the latest value was reported.
    /// * `intermediate_values` - All `(step, value)` pairs reported so far for this trial.
    /// * `completed_trials` - History of finished trials, for comparison.
    fn should_prune(
        &self,
        trial_id: u64,
        step: u64,
        intermediate_values: &[(u64, f64)],
        completed_trials: &[CompletedTrial],
    ) -> bool;

    /// Notification that a trial has finished (completed, failed, or
    /// pruned) and will report no further values.
    ///
    /// Stateful pruners release any per-trial state here so a long study
    /// does not accumulate entries for finished trials. The default
    /// implementation does nothing.
    fn trial_finished(&self, _trial_id: u64) {}
}
