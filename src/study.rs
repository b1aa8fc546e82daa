//! Study implementation for managing optimization trials.

use core::any::Any;
use core::fmt::Write as _;
use core::ops::ControlFlow;
use std::sync::Arc;

use crate::objective::Objective;
use crate::pruner::{NopPruner, Pruner};
use crate::sampler::{CompletedTrial, RandomSampler, Sampler};
use crate::storage::{MemoryStorage, Storage};
use crate::trial::Trial;
use crate::types::{Direction, TrialState};

/// A study manages one optimization run: it creates trials, records their
/// results, and tracks the best configuration found so far.
///
/// # Examples
///
/// ```
/// use gridtune::{Direction, Study};
///
/// let study = Study::new(Direction::Maximize);
/// assert_eq!(study.direction(), Direction::Maximize);
/// ```
pub struct Study {
    /// The optimization direction.
    direction: Direction,
    /// The sampler used to generate parameter values.
    sampler: Arc<dyn Sampler>,
    /// The pruner consulted after each reported score.
    pruner: Arc<dyn Pruner>,
    /// Trial storage backend (default: [`MemoryStorage`]).
    storage: Arc<dyn Storage>,
}

impl Study {
    /// Create a new study with the given optimization direction.
    ///
    /// Uses the default [`RandomSampler`], [`NopPruner`], and
    /// [`MemoryStorage`].
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self::with_sampler(direction, RandomSampler::new())
    }

    /// Return a [`StudyBuilder`] for constructing a study with a fluent API.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridtune::prelude::*;
    ///
    /// let study = Study::builder()
    ///     .maximize()
    ///     .sampler(RandomSampler::with_seed(188))
    ///     .pruner(NoImprovementPruner::new(Direction::Maximize))
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder() -> StudyBuilder {
        StudyBuilder {
            direction: Direction::Minimize,
            sampler: None,
            pruner: None,
            storage: None,
        }
    }

    /// Create a new study with a custom sampler.
    pub fn with_sampler(direction: Direction, sampler: impl Sampler + 'static) -> Self {
        Self::assemble(
            direction,
            Arc::new(sampler),
            Arc::new(NopPruner),
            Arc::new(MemoryStorage::new()),
        )
    }

    /// Create a study with a custom sampler and pruner.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridtune::pruner::NoImprovementPruner;
    /// use gridtune::sampler::RandomSampler;
    /// use gridtune::{Direction, Study};
    ///
    /// let study = Study::with_sampler_and_pruner(
    ///     Direction::Maximize,
    ///     RandomSampler::with_seed(42),
    ///     NoImprovementPruner::new(Direction::Maximize),
    /// );
    /// ```
    pub fn with_sampler_and_pruner(
        direction: Direction,
        sampler: impl Sampler + 'static,
        pruner: impl Pruner + 'static,
    ) -> Self {
        Self::assemble(
            direction,
            Arc::new(sampler),
            Arc::new(pruner),
            Arc::new(MemoryStorage::new()),
        )
    }

    fn assemble(
        direction: Direction,
        sampler: Arc<dyn Sampler>,
        pruner: Arc<dyn Pruner>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            direction,
            sampler,
            pruner,
            storage,
        }
    }

    /// Return the optimization direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Return a reference to the study's pruner.
    #[must_use]
    pub fn pruner(&self) -> &dyn Pruner {
        &*self.pruner
    }

    /// Create a new trial with a unique ID.
    ///
    /// The trial starts in the `Running` state and carries the study's
    /// sampler, pruner, and shared trial history. After evaluating the
    /// objective, record the outcome with [`complete_trial`](Self::complete_trial),
    /// [`fail_trial`](Self::fail_trial), or [`prune_trial`](Self::prune_trial).
    #[must_use]
    pub fn create_trial(&self) -> Trial {
        self.storage.refresh();
        let id = self.storage.next_trial_id();
        Trial::attached(
            id,
            Arc::clone(&self.sampler),
            Arc::clone(&self.pruner),
            Arc::clone(self.storage.trials_arc()),
        )
    }

    /// Request a new trial with suggested parameters.
    ///
    /// First half of the ask-and-tell interface: suggest parameters on
    /// the returned trial, evaluate externally, then pass the trial back
    /// to [`tell`](Self::tell).
    ///
    /// # Examples
    ///
    /// ```
    /// use gridtune::parameter::{FloatParam, Parameter};
    /// use gridtune::{Direction, Study};
    ///
    /// let study = Study::new(Direction::Minimize);
    /// let x = FloatParam::new(0.0, 10.0);
    ///
    /// let mut trial = study.ask();
    /// let x_val = x.suggest(&mut trial).unwrap();
    /// study.tell(trial, Ok::<_, &str>(x_val * x_val));
    /// assert_eq!(study.n_trials(), 1);
    /// ```
    #[must_use]
    pub fn ask(&self) -> Trial {
        self.create_trial()
    }

    /// Report the result of a trial obtained from [`ask`](Self::ask).
    ///
    /// Pass `Ok(value)` for a successful evaluation or `Err(reason)` for
    /// a failure. Failed trials are not stored in the study's history.
    pub fn tell(&self, trial: Trial, value: core::result::Result<f64, impl ToString>) {
        match value {
            Ok(v) => self.complete_trial(trial, v),
            Err(e) => self.fail_trial(trial, e),
        }
    }

    /// Record a completed trial with its objective value.
    pub fn complete_trial(&self, trial: Trial, value: f64) {
        self.pruner.trial_finished(trial.id());
        let completed = trial.into_completed(value, TrialState::Complete);
        self.storage.push(completed);
    }

    /// Record a failed trial.
    ///
    /// Failed trials (e.g. a training run that diverged to NaN) are not
    /// stored in the history and do not inform future sampling.
    pub fn fail_trial(&self, mut trial: Trial, _error: impl ToString) {
        self.pruner.trial_finished(trial.id());
        trial.set_failed();
    }

    /// Record a pruned trial, preserving its intermediate values.
    ///
    /// In practice you rarely call this directly: returning
    /// `Err(TrialPruned)` from an objective function handles pruning
    /// automatically.
    pub fn prune_trial(&self, trial: Trial) {
        self.pruner.trial_finished(trial.id());
        let completed = trial.into_completed(f64::NAN, TrialState::Pruned);
        self.storage.push(completed);
    }

    /// Return all stored trials as a `Vec`.
    ///
    /// Clones the internal storage; suitable for analysis, not hot paths.
    #[must_use]
    pub fn trials(&self) -> Vec<CompletedTrial> {
        self.storage.trials_arc().read().clone()
    }

    /// Return the number of stored trials (completed and pruned).
    ///
    /// Failed trials are not counted.
    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.storage.trials_arc().read().len()
    }

    /// Return the number of pruned trials.
    #[must_use]
    pub fn n_pruned_trials(&self) -> usize {
        self.storage
            .trials_arc()
            .read()
            .iter()
            .filter(|t| t.state == TrialState::Pruned)
            .count()
    }

    /// Compare two completed trials by objective value, respecting the
    /// optimization direction. Designed for `max_by`.
    fn compare(a: &CompletedTrial, b: &CompletedTrial, direction: Direction) -> core::cmp::Ordering {
        let ordering = a.value.partial_cmp(&b.value);
        match direction {
            Direction::Minimize => {
                ordering.map_or(core::cmp::Ordering::Equal, core::cmp::Ordering::reverse)
            }
            Direction::Maximize => ordering.unwrap_or(core::cmp::Ordering::Equal),
        }
    }

    /// Return the trial with the best objective value.
    ///
    /// Only completed trials are considered; pruned and failed trials
    /// never win.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCompletedTrials`](crate::Error::NoCompletedTrials)
    /// if no trials have completed.
    pub fn best_trial(&self) -> crate::Result<CompletedTrial> {
        let trials = self.storage.trials_arc().read();
        let direction = self.direction;

        let best = trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .max_by(|a, b| Self::compare(a, b, direction))
            .ok_or(crate::Error::NoCompletedTrials)?;

        Ok(best.clone())
    }

    /// Return the best objective value found so far.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCompletedTrials`](crate::Error::NoCompletedTrials)
    /// if no trials have completed.
    pub fn best_value(&self) -> crate::Result<f64> {
        self.best_trial().map(|trial| trial.value)
    }

    /// Run optimization with an objective.
    ///
    /// Accepts any [`Objective`] implementation, including plain closures
    /// (`Fn(&mut Trial) -> Result<f64, E>`). Runs up to `n_trials`
    /// evaluations sequentially; an objective returning `TrialPruned`
    /// records the trial as pruned, any other error records it as failed,
    /// and the loop continues either way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCompletedTrials`](crate::Error::NoCompletedTrials)
    /// if no trials completed successfully.
    #[allow(clippy::needless_pass_by_value)]
    pub fn optimize(&self, n_trials: usize, objective: impl Objective) -> crate::Result<()> {
        #[cfg(feature = "tracing")]
        let _span =
            tracing::info_span!("optimize", n_trials, direction = ?self.direction).entered();

        for _ in 0..n_trials {
            let mut trial = self.create_trial();
            match objective.evaluate(&mut trial) {
                Ok(value) => {
                    let trial_id = trial.id();
                    self.pruner.trial_finished(trial_id);

                    let completed = trial.into_completed(value, TrialState::Complete);
                    self.storage.push(completed.clone());
                    trace_info!(trial_id, value, "trial completed");

                    if let ControlFlow::Break(()) = objective.after_trial(self, &completed) {
                        return Ok(());
                    }
                }
                Err(e) if is_trial_pruned(&e) => {
                    #[cfg(feature = "tracing")]
                    let trial_id = trial.id();
                    self.prune_trial(trial);
                    trace_info!(trial_id, "trial pruned");
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    let trial_id = trial.id();
                    self.fail_trial(trial, e.to_string());
                    trace_debug!(trial_id, "trial failed");
                }
            }
        }

        let has_complete = self
            .storage
            .trials_arc()
            .read()
            .iter()
            .any(|t| t.state == TrialState::Complete);
        if !has_complete {
            return Err(crate::Error::NoCompletedTrials);
        }

        Ok(())
    }

    /// Return a human-readable summary of the study.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridtune::{Direction, Study};
    ///
    /// let study = Study::new(Direction::Maximize);
    /// let trial = study.create_trial();
    /// study.complete_trial(trial, -812.4);
    ///
    /// let summary = study.summary();
    /// assert!(summary.contains("Maximize"));
    /// assert!(summary.contains("-812.4"));
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        let trials = self.storage.trials_arc().read();
        let n_complete = trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .count();
        let n_pruned = trials
            .iter()
            .filter(|t| t.state == TrialState::Pruned)
            .count();

        let direction_str = match self.direction {
            Direction::Minimize => "Minimize",
            Direction::Maximize => "Maximize",
        };

        let mut s = format!("Study: {direction_str} | {n} trials", n = trials.len());
        if n_pruned > 0 {
            let _ = write!(s, " ({n_complete} complete, {n_pruned} pruned)");
        }

        drop(trials);

        if let Ok(best) = self.best_trial() {
            let _ = write!(s, "\nBest value: {} (trial #{})", best.value, best.id);
            if !best.params.is_empty() {
                s.push_str("\nBest parameters:");
                let mut params: Vec<_> = best.params.iter().collect();
                params.sort_by_key(|(id, _)| *id);
                for (id, value) in params {
                    let label = best.param_labels.get(id).map_or("?", String::as_str);
                    let _ = write!(s, "\n  {label} = {value}");
                }
            }
        }

        s
    }
}

/// Detect pruning errors regardless of which of the two pruning types the
/// objective used.
fn is_trial_pruned<E: 'static>(e: &E) -> bool {
    let any: &dyn Any = e;
    if let Some(err) = any.downcast_ref::<crate::Error>() {
        matches!(err, crate::Error::TrialPruned)
    } else {
        any.downcast_ref::<crate::error::TrialPruned>().is_some()
    }
}

/// Fluent builder for [`Study`].
///
/// Defaults: minimize, [`RandomSampler`], [`NopPruner`], [`MemoryStorage`].
pub struct StudyBuilder {
    direction: Direction,
    sampler: Option<Arc<dyn Sampler>>,
    pruner: Option<Arc<dyn Pruner>>,
    storage: Option<Arc<dyn Storage>>,
}

impl StudyBuilder {
    /// Set the study to minimize the objective value.
    #[must_use]
    pub fn minimize(mut self) -> Self {
        self.direction = Direction::Minimize;
        self
    }

    /// Set the study to maximize the objective value.
    #[must_use]
    pub fn maximize(mut self) -> Self {
        self.direction = Direction::Maximize;
        self
    }

    /// Set the optimization direction explicitly.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the sampler.
    #[must_use]
    pub fn sampler(mut self, sampler: impl Sampler + 'static) -> Self {
        self.sampler = Some(Arc::new(sampler));
        self
    }

    /// Set the pruner.
    #[must_use]
    pub fn pruner(mut self, pruner: impl Pruner + 'static) -> Self {
        self.pruner = Some(Arc::new(pruner));
        self
    }

    /// Set the storage backend.
    #[must_use]
    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Build the study.
    #[must_use]
    pub fn build(self) -> Study {
        Study::assemble(
            self.direction,
            self.sampler
                .unwrap_or_else(|| Arc::new(RandomSampler::new())),
            self.pruner.unwrap_or_else(|| Arc::new(NopPruner)),
            self.storage
                .unwrap_or_else(|| Arc::new(MemoryStorage::new())),
        )
    }
}
