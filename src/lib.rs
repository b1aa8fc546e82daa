#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]

//! Hyperparameter tuning harness for a building energy-management
//! reinforcement-learning policy.
//!
//! The crate drives an Optuna-style optimization loop around an external
//! PPO training backend: it samples PPO configurations from a fixed search
//! space, trains them in evaluation windows against a building-energy
//! simulation, reports each window's mean episode reward, and stops
//! unpromising configurations early. The early-stopping rule,
//! [`NoImprovementPruner`](pruner::NoImprovementPruner), prunes a trial
//! once its score has gone `patience` evaluations without improving by at
//! least `min_improvement`.
//!
//! # Getting started
//!
//! ```
//! use gridtune::prelude::*;
//!
//! let study = Study::builder()
//!     .minimize()
//!     .sampler(RandomSampler::with_seed(42))
//!     .pruner(NoImprovementPruner::new(Direction::Minimize).patience(3))
//!     .build();
//!
//! let x = FloatParam::new(-10.0, 10.0).name("x");
//!
//! study
//!     .optimize(25, |trial: &mut Trial| {
//!         let v = x.suggest(trial)?;
//!         Ok::<_, Error>((v - 3.0).powi(2))
//!     })
//!     .unwrap();
//!
//! assert!(study.best_value().unwrap() >= 0.0);
//! ```
//!
//! # Crate layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`pruner`] | Early-stopping rules ([`NoImprovementPruner`](pruner::NoImprovementPruner), [`MedianPruner`](pruner::MedianPruner)) |
//! | [`parameter`] | Search-space definitions (floats, ints, categoricals, bools) |
//! | [`sampler`] | Parameter proposal seam; uniform [`RandomSampler`](sampler::RandomSampler) baseline |
//! | [`ppo`] | The PPO configuration and its tuned search space |
//! | [`reward`] | SOC-aware reward shaping for the energy simulation |
//! | [`harness`] | Trial-execution loop around an external training backend |
//! | [`storage`] | Trial-record storage (in-memory default) |
//!
//! # Feature flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on the data-model types | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at trial boundaries | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod distribution;
mod error;
pub mod harness;
pub mod objective;
mod param;
pub mod parameter;
pub mod ppo;
pub mod pruner;
pub mod reward;
mod rng_util;
pub mod sampler;
pub mod storage;
mod study;
mod trial;
mod types;

pub use distribution::{CategoricalDistribution, Distribution, FloatDistribution, IntDistribution};
pub use error::{Error, Result, TrialPruned};
pub use objective::Objective;
pub use param::ParamValue;
pub use study::{Study, StudyBuilder};
pub use trial::{AttrValue, Trial};
pub use types::{Direction, TrialState};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use gridtune::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result, TrialPruned};
    pub use crate::harness::{PolicySession, PolicyTrainer, TuneJob, TuneSettings};
    pub use crate::objective::Objective;
    pub use crate::parameter::{
        BoolParam, CategoricalParam, FloatParam, IntParam, Parameter,
    };
    pub use crate::param::ParamValue;
    pub use crate::ppo::{PpoConfig, PpoSearchSpace};
    pub use crate::pruner::{MedianPruner, NoImprovementPruner, NopPruner, Pruner};
    pub use crate::reward::{BuildingObservation, SocCostReward};
    pub use crate::sampler::{CompletedTrial, RandomSampler, Sampler};
    pub use crate::storage::{MemoryStorage, Storage};
    pub use crate::study::{Study, StudyBuilder};
    pub use crate::trial::{AttrValue, Trial};
    pub use crate::types::Direction;
}
