//! Sampler seam and the trial history record.
//!
//! The proposal algorithm itself is an external collaborator: anything
//! implementing [`Sampler`] can drive the search. The crate ships only the
//! uniform [`RandomSampler`] baseline, which is also what the reference
//! study used for its startup trials.

mod random;

pub use random::RandomSampler;

use std::collections::HashMap;

use crate::distribution::Distribution;
use crate::param::ParamValue;
use crate::parameter::ParamId;
use crate::trial::AttrValue;
use crate::types::TrialState;

/// A finished trial with its parameters, reported scores, and final value.
///
/// Records are pushed into [`Storage`](crate::storage::Storage) when a
/// trial completes or is pruned, and handed back to samplers and pruners
/// as history.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompletedTrial {
    /// The unique identifier for this trial.
    pub id: u64,
    /// The sampled parameter values, keyed by parameter id.
    pub params: HashMap<ParamId, ParamValue>,
    /// The parameter distributions used, keyed by parameter id.
    pub distributions: HashMap<ParamId, Distribution>,
    /// Human-readable labels for parameters, keyed by parameter id.
    pub param_labels: HashMap<ParamId, String>,
    /// The objective value returned by the objective function.
    pub value: f64,
    /// Intermediate scores reported during the trial, as `(step, value)`.
    pub intermediate_values: Vec<(u64, f64)>,
    /// The state of the trial (Complete, Pruned, or Failed).
    pub state: TrialState,
    /// User-defined attributes stored during the trial.
    pub user_attrs: HashMap<String, AttrValue>,
}

impl CompletedTrial {
    /// Creates a completed trial record with no intermediate values.
    #[must_use]
    pub fn new(
        id: u64,
        params: HashMap<ParamId, ParamValue>,
        distributions: HashMap<ParamId, Distribution>,
        param_labels: HashMap<ParamId, String>,
        value: f64,
    ) -> Self {
        Self {
            id,
            params,
            distributions,
            param_labels,
            value,
            intermediate_values: Vec::new(),
            state: TrialState::Complete,
            user_attrs: HashMap::new(),
        }
    }

    /// Creates a completed trial record carrying intermediate values and
    /// user attributes.
    #[must_use]
    pub fn with_intermediate_values(
        id: u64,
        params: HashMap<ParamId, ParamValue>,
        distributions: HashMap<ParamId, Distribution>,
        param_labels: HashMap<ParamId, String>,
        value: f64,
        intermediate_values: Vec<(u64, f64)>,
        user_attrs: HashMap<String, AttrValue>,
    ) -> Self {
        Self {
            id,
            params,
            distributions,
            param_labels,
            value,
            intermediate_values,
            state: TrialState::Complete,
            user_attrs,
        }
    }

    /// Returns the typed value for the given parameter.
    ///
    /// Returns `None` if the parameter was not used in this trial.
    ///
    /// # Panics
    ///
    /// Panics if the stored value is incompatible with the parameter type
    /// (e.g., a `Float` value stored for an `IntParam`). This indicates
    /// a bug in the program, not a runtime error.
    pub fn get<P: crate::parameter::Parameter>(&self, param: &P) -> Option<P::Value> {
        self.params.get(&param.id()).map(|v| {
            param
                .cast_param_value(v)
                .expect("parameter type mismatch: stored value incompatible with parameter")
        })
    }

    /// Gets a user attribute by key.
    #[must_use]
    pub fn user_attr(&self, key: &str) -> Option<&AttrValue> {
        self.user_attrs.get(key)
    }
}

/// Trait for pluggable parameter sampling strategies.
///
/// Samplers generate parameter values from a distribution, optionally
/// informed by the history of completed trials. The trait requires
/// `Send + Sync` because a study may be shared across threads.
pub trait Sampler: Send + Sync {
    /// Samples a parameter value from the given distribution.
    ///
    /// # Arguments
    ///
    /// * `distribution` - The parameter distribution to sample from.
    /// * `trial_id` - The unique ID of the trial being sampled for.
    /// * `history` - Completed trials available for informed sampling.
    fn sample(
        &self,
        distribution: &Distribution,
        trial_id: u64,
        history: &[CompletedTrial],
    ) -> ParamValue;
}
