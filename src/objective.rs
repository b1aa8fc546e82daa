//! The [`Objective`] trait defines what gets optimized.
//!
//! Plain closures work directly with
//! [`Study::optimize`](crate::Study::optimize):
//!
//! ```
//! use gridtune::prelude::*;
//!
//! let study = Study::new(Direction::Minimize);
//! let x = FloatParam::new(-10.0, 10.0).name("x");
//!
//! study
//!     .optimize(30, |trial: &mut Trial| {
//!         let v = x.suggest(trial)?;
//!         Ok::<_, Error>((v - 3.0).powi(2))
//!     })
//!     .unwrap();
//! ```
//!
//! Struct objectives such as the training harness's
//! [`TuneJob`](crate::harness::TuneJob) implement the trait directly
//! and can use the [`after_trial`](Objective::after_trial) hook for early
//! stopping of the whole study.

use core::ops::ControlFlow;

use crate::sampler::CompletedTrial;
use crate::study::Study;
use crate::trial::Trial;

/// Defines an objective function with lifecycle hooks for optimization.
///
/// The only required method is [`evaluate`](Objective::evaluate).
/// [`after_trial`](Objective::after_trial) can stop the optimization loop
/// once a target has been reached.
///
/// Implemented for any `Fn(&mut Trial) -> Result<f64, E>` closure via a
/// blanket impl. Objectives holding per-study mutable state should use
/// interior mutability, since `evaluate` takes `&self`.
pub trait Objective {
    /// The error type returned by [`evaluate`](Objective::evaluate).
    type Error: ToString + 'static;

    /// Evaluate the objective function for a single trial.
    ///
    /// Sample parameters from `trial` via
    /// [`Parameter::suggest`](crate::parameter::Parameter::suggest) and
    /// return the objective value. Return `Err(TrialPruned)` to prune a
    /// trial early.
    ///
    /// # Errors
    ///
    /// Any error whose type implements `ToString`. Pruning errors
    /// (`Error::TrialPruned` or the `TrialPruned` marker) are handled
    /// specially: the trial is recorded as pruned rather than failed.
    fn evaluate(&self, trial: &mut Trial) -> Result<f64, Self::Error>;

    /// Called after each **completed** trial (not failed or pruned).
    ///
    /// Return `ControlFlow::Break(())` to stop the optimization loop.
    ///
    /// Default: always continues.
    fn after_trial(&self, _study: &Study, _trial: &CompletedTrial) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F, E> Objective for F
where
    F: Fn(&mut Trial) -> Result<f64, E>,
    E: ToString + 'static,
{
    type Error = E;

    fn evaluate(&self, trial: &mut Trial) -> Result<f64, E> {
        self(trial)
    }
}
