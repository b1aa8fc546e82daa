//! Central parameter trait and built-in parameter types.
//!
//! The [`Parameter`] trait gives each tunable hyperparameter a declared
//! distribution and a typed `suggest` entry point on a [`Trial`]. Built-in
//! implementations cover floats, integers, categoricals, and booleans,
//! enough to express the PPO search space in [`crate::ppo`].
//!
//! # Example
//!
//! ```
//! use gridtune::Trial;
//! use gridtune::parameter::{FloatParam, IntParam, Parameter};
//!
//! let mut trial = Trial::new(0);
//!
//! let lr = FloatParam::new(5e-6, 3e-3)
//!     .log_scale()
//!     .name("lr")
//!     .suggest(&mut trial)
//!     .unwrap();
//! let n_epochs = IntParam::new(3, 10).suggest(&mut trial).unwrap();
//! assert!((5e-6..=3e-3).contains(&lr));
//! assert!((3..=10).contains(&n_epochs));
//! ```

use core::fmt::Debug;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::distribution::{
    CategoricalDistribution, Distribution, FloatDistribution, IntDistribution,
};
use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::trial::Trial;

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(0);

/// A unique identifier for a parameter instance.
///
/// Each parameter is assigned a unique `ParamId` at creation time. Cloning
/// a parameter copies its `ParamId`, so clones refer to the same logical
/// parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamId(u64);

impl ParamId {
    /// Creates a new unique `ParamId`.
    pub fn new() -> Self {
        Self(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ParamId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ParamId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "param_{}", self.0)
    }
}

/// A trait for defining parameter types that can be suggested by a [`Trial`].
///
/// Implementors specify the distribution to sample from and how to convert
/// the raw [`ParamValue`] back into a typed value.
pub trait Parameter: Debug {
    /// The typed value returned after sampling.
    type Value;

    /// Returns the unique identifier for this parameter.
    fn id(&self) -> ParamId;

    /// Returns the distribution that this parameter samples from.
    fn distribution(&self) -> Distribution;

    /// Converts a raw [`ParamValue`] into the typed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the `ParamValue` variant doesn't match what
    /// this parameter expects.
    fn cast_param_value(&self, param_value: &ParamValue) -> Result<Self::Value>;

    /// Validates the parameter configuration.
    ///
    /// Called before sampling. The default implementation accepts all
    /// configurations.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter configuration is invalid.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Returns a human-readable label for this parameter.
    ///
    /// Defaults to the `Debug` output of the parameter.
    fn label(&self) -> String {
        format!("{self:?}")
    }

    /// Suggests a value for this parameter from the given trial.
    ///
    /// Convenience method that delegates to [`Trial::suggest_param`].
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the parameter conflicts with
    /// a previously suggested parameter of the same id, or sampling fails.
    fn suggest(&self, trial: &mut Trial) -> Result<Self::Value>
    where
        Self: Sized,
    {
        trial.suggest_param(self)
    }
}

/// A floating-point parameter with optional log-scale and step size.
#[derive(Clone, Debug)]
pub struct FloatParam {
    id: ParamId,
    low: f64,
    high: f64,
    log_scale: bool,
    step: Option<f64>,
    name: Option<String>,
}

impl FloatParam {
    /// Creates a new float parameter over `[low, high]`.
    #[must_use]
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            id: ParamId::new(),
            low,
            high,
            log_scale: false,
            step: None,
            name: None,
        }
    }

    /// Sample in log space. Requires a positive lower bound.
    #[must_use]
    pub fn log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }

    /// Discretize samples to multiples of `step` above the lower bound.
    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Assign a human-readable name used in labels and summaries.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Parameter for FloatParam {
    type Value = f64;

    fn id(&self) -> ParamId {
        self.id
    }

    fn distribution(&self) -> Distribution {
        Distribution::Float(FloatDistribution {
            low: self.low,
            high: self.high,
            log_scale: self.log_scale,
            step: self.step,
        })
    }

    fn cast_param_value(&self, param_value: &ParamValue) -> Result<f64> {
        match param_value {
            ParamValue::Float(v) => Ok(*v),
            _ => Err(Error::ParameterConflict {
                name: self.label(),
                reason: "stored value is not a float".to_string(),
            }),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.low > self.high {
            return Err(Error::InvalidBounds {
                low: self.low,
                high: self.high,
            });
        }
        if self.log_scale && self.low <= 0.0 {
            return Err(Error::InvalidLogBounds);
        }
        if let Some(step) = self.step {
            if step <= 0.0 {
                return Err(Error::InvalidStep);
            }
        }
        Ok(())
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// An integer parameter with optional log-scale and step size.
#[derive(Clone, Debug)]
pub struct IntParam {
    id: ParamId,
    low: i64,
    high: i64,
    log_scale: bool,
    step: Option<i64>,
    name: Option<String>,
}

impl IntParam {
    /// Creates a new integer parameter over `[low, high]`.
    #[must_use]
    pub fn new(low: i64, high: i64) -> Self {
        Self {
            id: ParamId::new(),
            low,
            high,
            log_scale: false,
            step: None,
            name: None,
        }
    }

    /// Sample in log space. Requires a positive lower bound.
    #[must_use]
    pub fn log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }

    /// Discretize samples to multiples of `step` above the lower bound.
    #[must_use]
    pub fn step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    /// Assign a human-readable name used in labels and summaries.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Parameter for IntParam {
    type Value = i64;

    fn id(&self) -> ParamId {
        self.id
    }

    fn distribution(&self) -> Distribution {
        Distribution::Int(IntDistribution {
            low: self.low,
            high: self.high,
            log_scale: self.log_scale,
            step: self.step,
        })
    }

    fn cast_param_value(&self, param_value: &ParamValue) -> Result<i64> {
        match param_value {
            ParamValue::Int(v) => Ok(*v),
            _ => Err(Error::ParameterConflict {
                name: self.label(),
                reason: "stored value is not an integer".to_string(),
            }),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.low > self.high {
            return Err(Error::InvalidBounds {
                low: self.low as f64,
                high: self.high as f64,
            });
        }
        if self.log_scale && self.low <= 0 {
            return Err(Error::InvalidLogBounds);
        }
        if let Some(step) = self.step {
            if step <= 0 {
                return Err(Error::InvalidStep);
            }
        }
        Ok(())
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// A categorical parameter over an explicit list of choices.
///
/// The sampled [`ParamValue`] stores an index; `suggest` returns a clone
/// of the chosen element. Choices may be any `Clone` type, including
/// `Option<f64>` for "maybe disabled" hyperparameters such as `target_kl`.
#[derive(Clone, Debug)]
pub struct CategoricalParam<T: Clone + Debug> {
    id: ParamId,
    choices: Vec<T>,
    name: Option<String>,
}

impl<T: Clone + Debug> CategoricalParam<T> {
    /// Creates a new categorical parameter from a list of choices.
    #[must_use]
    pub fn new(choices: Vec<T>) -> Self {
        Self {
            id: ParamId::new(),
            choices,
            name: None,
        }
    }

    /// Assign a human-readable name used in labels and summaries.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<T: Clone + Debug> Parameter for CategoricalParam<T> {
    type Value = T;

    fn id(&self) -> ParamId {
        self.id
    }

    fn distribution(&self) -> Distribution {
        Distribution::Categorical(CategoricalDistribution {
            n_choices: self.choices.len(),
        })
    }

    fn cast_param_value(&self, param_value: &ParamValue) -> Result<T> {
        match param_value {
            ParamValue::Categorical(idx) => self.choices.get(*idx).cloned().ok_or(
                Error::ParameterConflict {
                    name: self.label(),
                    reason: format!("choice index {idx} out of range"),
                },
            ),
            _ => Err(Error::ParameterConflict {
                name: self.label(),
                reason: "stored value is not categorical".to_string(),
            }),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.choices.is_empty() {
            return Err(Error::EmptyChoices);
        }
        Ok(())
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// A boolean parameter, equivalent to a two-way categorical.
#[derive(Clone, Debug)]
pub struct BoolParam {
    id: ParamId,
    name: Option<String>,
}

impl BoolParam {
    /// Creates a new boolean parameter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ParamId::new(),
            name: None,
        }
    }

    /// Assign a human-readable name used in labels and summaries.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Default for BoolParam {
    fn default() -> Self {
        Self::new()
    }
}

impl Parameter for BoolParam {
    type Value = bool;

    fn id(&self) -> ParamId {
        self.id
    }

    fn distribution(&self) -> Distribution {
        Distribution::Categorical(CategoricalDistribution { n_choices: 2 })
    }

    fn cast_param_value(&self, param_value: &ParamValue) -> Result<bool> {
        match param_value {
            ParamValue::Categorical(idx) if *idx < 2 => Ok(*idx == 1),
            _ => Err(Error::ParameterConflict {
                name: self.label(),
                reason: "stored value is not a boolean choice".to_string(),
            }),
        }
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}
