//! Trial implementation: sampled parameters, reported scores, prune checks.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::parameter::{ParamId, Parameter};
use crate::pruner::Pruner;
use crate::sampler::{CompletedTrial, Sampler};
use crate::types::TrialState;

/// A user-defined attribute value attached to a trial.
///
/// The harness uses these to record "true" hyperparameter values next to
/// their sampled encodings (e.g. the actual `gamma` next to the sampled
/// `1 - gamma` exponent).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrValue {
    /// A floating-point attribute.
    Float(f64),
    /// An integer attribute.
    Int(i64),
    /// A string attribute.
    Str(String),
    /// A boolean attribute.
    Bool(bool),
}

/// A single evaluation of the objective function.
///
/// Each trial has a unique ID and stores the sampled parameters along
/// with their distributions. During evaluation the objective reports
/// intermediate scores via [`report`](Trial::report) and asks
/// [`should_prune`](Trial::should_prune) whether to stop early.
///
/// Trials created through `Study::create_trial` carry the study's
/// sampler, pruner, and trial history; `Trial::new` builds a detached
/// trial that samples uniformly and never prunes, which is convenient in
/// tests.
#[derive(Clone)]
pub struct Trial {
    id: u64,
    state: TrialState,
    params: HashMap<ParamId, ParamValue>,
    distributions: HashMap<ParamId, Distribution>,
    param_labels: HashMap<ParamId, String>,
    intermediate_values: Vec<(u64, f64)>,
    user_attrs: HashMap<String, AttrValue>,
    sampler: Option<Arc<dyn Sampler>>,
    pruner: Option<Arc<dyn Pruner>>,
    history: Option<Arc<RwLock<Vec<CompletedTrial>>>>,
}

impl core::fmt::Debug for Trial {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Trial")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("params", &self.params)
            .field("intermediate_values", &self.intermediate_values)
            .field("has_sampler", &self.sampler.is_some())
            .field("has_pruner", &self.pruner.is_some())
            .finish()
    }
}

impl Trial {
    /// Creates a detached trial with the given ID.
    ///
    /// The trial starts in the `Running` state with no parameters
    /// sampled, uses uniform random sampling, and never recommends
    /// pruning.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: TrialState::Running,
            params: HashMap::new(),
            distributions: HashMap::new(),
            param_labels: HashMap::new(),
            intermediate_values: Vec::new(),
            user_attrs: HashMap::new(),
            sampler: None,
            pruner: None,
            history: None,
        }
    }

    /// Creates a trial wired to a study's sampler, pruner, and history.
    pub(crate) fn attached(
        id: u64,
        sampler: Arc<dyn Sampler>,
        pruner: Arc<dyn Pruner>,
        history: Arc<RwLock<Vec<CompletedTrial>>>,
    ) -> Self {
        Self {
            id,
            state: TrialState::Running,
            params: HashMap::new(),
            distributions: HashMap::new(),
            param_labels: HashMap::new(),
            intermediate_values: Vec::new(),
            user_attrs: HashMap::new(),
            sampler: Some(sampler),
            pruner: Some(pruner),
            history: Some(history),
        }
    }

    /// Returns the unique ID of this trial.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the current state of this trial.
    #[must_use]
    pub fn state(&self) -> TrialState {
        self.state
    }

    /// Returns a reference to the sampled parameters.
    #[must_use]
    pub fn params(&self) -> &HashMap<ParamId, ParamValue> {
        &self.params
    }

    /// Returns the intermediate scores reported so far.
    #[must_use]
    pub fn intermediate_values(&self) -> &[(u64, f64)] {
        &self.intermediate_values
    }

    /// Returns the step of the most recent report, or `None` if nothing
    /// has been reported yet.
    #[must_use]
    pub fn last_step(&self) -> Option<u64> {
        self.intermediate_values.last().map(|&(step, _)| step)
    }

    /// Report an intermediate score for this trial at the given step.
    ///
    /// Steps are expected to be reported in increasing order; the history
    /// is append-only.
    pub fn report(&mut self, step: u64, value: f64) {
        self.intermediate_values.push((step, value));
    }

    /// Ask the study's pruner whether this trial should stop early.
    ///
    /// Returns `false` when no score has been reported yet, and for
    /// detached trials, which have no pruner.
    #[must_use]
    pub fn should_prune(&self) -> bool {
        let (Some(pruner), Some(history)) = (&self.pruner, &self.history) else {
            return false;
        };
        let Some(step) = self.last_step() else {
            return false;
        };
        let completed = history.read();
        pruner.should_prune(self.id, step, &self.intermediate_values, &completed)
    }

    /// Attach a user-defined attribute to this trial.
    pub fn set_user_attr(&mut self, key: impl Into<String>, value: AttrValue) {
        self.user_attrs.insert(key.into(), value);
    }

    /// Gets a user attribute by key.
    #[must_use]
    pub fn user_attr(&self, key: &str) -> Option<&AttrValue> {
        self.user_attrs.get(key)
    }

    /// Sets the trial state to Failed.
    pub(crate) fn set_failed(&mut self) {
        self.state = TrialState::Failed;
    }

    /// Consume the trial into a stored record with the given final value
    /// and state.
    pub(crate) fn into_completed(self, value: f64, state: TrialState) -> CompletedTrial {
        CompletedTrial {
            id: self.id,
            params: self.params,
            distributions: self.distributions,
            param_labels: self.param_labels,
            value,
            intermediate_values: self.intermediate_values,
            state,
            user_attrs: self.user_attrs,
        }
    }

    /// Samples a value from the given distribution.
    ///
    /// Attached trials delegate to the study's sampler with the shared
    /// history; detached trials fall back to uniform sampling.
    fn sample_value(&self, distribution: &Distribution) -> ParamValue {
        if let (Some(sampler), Some(history)) = (&self.sampler, &self.history) {
            let completed = history.read();
            sampler.sample(distribution, self.id, &completed)
        } else {
            use crate::sampler::RandomSampler;
            RandomSampler::new().sample(distribution, self.id, &[])
        }
    }

    /// Suggests a parameter value using a [`Parameter`] definition.
    ///
    /// Handles validation, caching, conflict detection, sampling, and
    /// conversion. Suggesting the same parameter twice returns the cached
    /// value.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parameter fails validation
    /// - The parameter conflicts with a previously suggested parameter of the same id
    /// - Sampling or conversion fails
    pub fn suggest_param<P: Parameter>(&mut self, param: &P) -> Result<P::Value> {
        param.validate()?;

        let param_id = param.id();
        let distribution = param.distribution();

        if let Some(existing) = self.distributions.get(&param_id) {
            if *existing == distribution {
                if let Some(value) = self.params.get(&param_id) {
                    return param.cast_param_value(value);
                }
            }
            return Err(Error::ParameterConflict {
                name: param.label(),
                reason: "parameter was previously sampled with a different configuration or type"
                    .to_string(),
            });
        }

        let value = self.sample_value(&distribution);
        let result = param.cast_param_value(&value)?;

        self.distributions.insert(param_id, distribution);
        self.params.insert(param_id, value);
        self.param_labels.insert(param_id, param.label());

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{FloatParam, IntParam};

    #[test]
    fn repeated_suggest_returns_cached_value() {
        let mut trial = Trial::new(0);
        let x = FloatParam::new(0.0, 1.0);
        let first = x.suggest(&mut trial).unwrap();
        let second = x.suggest(&mut trial).unwrap();
        assert!((first - second).abs() < f64::EPSILON);
    }

    #[test]
    fn reports_accumulate_in_order() {
        let mut trial = Trial::new(0);
        assert_eq!(trial.last_step(), None);
        trial.report(0, -120.0);
        trial.report(1, -90.0);
        assert_eq!(trial.last_step(), Some(1));
        assert_eq!(trial.intermediate_values(), &[(0, -120.0), (1, -90.0)]);
    }

    #[test]
    fn detached_trial_never_prunes() {
        let mut trial = Trial::new(0);
        trial.report(0, 1.0);
        assert!(!trial.should_prune());
    }

    #[test]
    fn user_attrs_round_trip() {
        let mut trial = Trial::new(0);
        trial.set_user_attr("n_steps", AttrValue::Int(1024));
        assert_eq!(trial.user_attr("n_steps"), Some(&AttrValue::Int(1024)));
        assert_eq!(trial.user_attr("missing"), None);
    }

    #[test]
    fn distinct_params_do_not_conflict() {
        let mut trial = Trial::new(0);
        let a = IntParam::new(1, 5);
        let b = IntParam::new(1, 5);
        a.suggest(&mut trial).unwrap();
        b.suggest(&mut trial).unwrap();
        assert_eq!(trial.params().len(), 2);
    }
}
