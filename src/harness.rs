//! Trial-execution harness around an external PPO training backend.
//!
//! The crate never trains a policy itself. [`PolicyTrainer`] and
//! [`PolicySession`] are the seam to the actual RL stack: the trainer
//! instantiates one session per trial from a sampled [`PpoConfig`], and the
//! session trains in timestep windows and reports a mean episode reward at
//! each evaluation. [`TuneJob`] wires that loop into a [`Study`] objective:
//! scores are reported to the trial, the pruner is consulted after every
//! evaluation, and the best-scoring model across all trials is checkpointed.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::objective::Objective;
use crate::ppo::{PpoConfig, PpoSearchSpace};
use crate::trial::Trial;

/// Factory for training sessions.
///
/// One session is built per trial from that trial's sampled configuration.
pub trait PolicyTrainer: Send + Sync {
    /// The session type produced for each trial.
    type Session: PolicySession;

    /// Build a fresh training session for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] when the external stack rejects the
    /// configuration or fails to initialize.
    fn build(&self, config: &PpoConfig) -> Result<Self::Session>;
}

/// A single policy-training run against the simulation.
pub trait PolicySession {
    /// Advance training by `timesteps` environment steps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] on training failure.
    fn train(&mut self, timesteps: u64) -> Result<()>;

    /// Evaluate the current policy over `n_episodes` full episodes and
    /// return the mean episode reward.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] on evaluation failure.
    fn evaluate(&mut self, n_episodes: u32) -> Result<f64>;

    /// Persist the current model to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] on I/O or serialization failure.
    fn save(&self, path: &Path) -> Result<()>;
}

/// Tuning-run settings shared by every trial.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TuneSettings {
    /// Total environment steps to train each trial.
    pub train_timesteps: u64,
    /// Environment steps between evaluations. Also the pruner's step unit:
    /// intermediate values are reported per evaluation window, not per
    /// timestep.
    pub eval_freq: u64,
    /// Episodes averaged per evaluation.
    pub n_eval_episodes: u32,
    /// Where to checkpoint the best model; `None` disables saving.
    pub save_dir: Option<PathBuf>,
}

impl TuneSettings {
    #[must_use]
    pub fn new(train_timesteps: u64, eval_freq: u64) -> Self {
        Self {
            train_timesteps,
            eval_freq,
            n_eval_episodes: 1,
            save_dir: None,
        }
    }

    #[must_use]
    pub fn n_eval_episodes(mut self, n: u32) -> Self {
        self.n_eval_episodes = n;
        self
    }

    #[must_use]
    pub fn save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = Some(dir.into());
        self
    }

    /// Number of evaluation windows per trial. At least one, even when
    /// `eval_freq` exceeds `train_timesteps`.
    #[must_use]
    pub fn n_evaluations(&self) -> u64 {
        if self.eval_freq == 0 {
            return 1;
        }
        (self.train_timesteps / self.eval_freq).max(1)
    }
}

/// Objective that tunes a PPO policy through a [`PolicyTrainer`].
///
/// Maximizes mean episode reward; pair it with a maximizing [`Study`] and
/// a pruner built with [`Direction::Maximize`](crate::Direction::Maximize).
///
/// # Examples
///
/// ```no_run
/// use gridtune::harness::{TuneJob, TuneSettings};
/// use gridtune::pruner::NoImprovementPruner;
/// use gridtune::{Direction, Study};
/// # use gridtune::harness::{PolicySession, PolicyTrainer};
/// # use gridtune::ppo::PpoConfig;
/// # use gridtune::Result;
/// # struct MyTrainer;
/// # struct MySession;
/// # impl PolicySession for MySession {
/// #     fn train(&mut self, _: u64) -> Result<()> { Ok(()) }
/// #     fn evaluate(&mut self, _: u32) -> Result<f64> { Ok(0.0) }
/// #     fn save(&self, _: &std::path::Path) -> Result<()> { Ok(()) }
/// # }
/// # impl PolicyTrainer for MyTrainer {
/// #     type Session = MySession;
/// #     fn build(&self, _: &PpoConfig) -> Result<MySession> { Ok(MySession) }
/// # }
///
/// let study = Study::with_sampler_and_pruner(
///     Direction::Maximize,
///     gridtune::sampler::RandomSampler::new(),
///     NoImprovementPruner::new(Direction::Maximize),
/// );
/// let job = TuneJob::new(MyTrainer, TuneSettings::new(100_000, 10_000));
/// study.optimize(50, job).unwrap();
/// println!("{}", study.summary());
/// ```
pub struct TuneJob<T: PolicyTrainer> {
    trainer: T,
    space: PpoSearchSpace,
    settings: TuneSettings,
    /// Best final score across trials, guarding checkpoint overwrites.
    best_score: Mutex<Option<f64>>,
}

impl<T: PolicyTrainer> TuneJob<T> {
    #[must_use]
    pub fn new(trainer: T, settings: TuneSettings) -> Self {
        Self {
            trainer,
            space: PpoSearchSpace::new(),
            settings,
            best_score: Mutex::new(None),
        }
    }

    /// The search space used to configure each trial.
    #[must_use]
    pub fn search_space(&self) -> &PpoSearchSpace {
        &self.space
    }

    fn run_trial(&self, trial: &mut Trial) -> Result<f64> {
        let config = self.space.suggest(trial)?;
        let mut session = self.trainer.build(&config)?;

        let mut last_score = f64::NEG_INFINITY;
        for eval_index in 0..self.settings.n_evaluations() {
            session.train(self.settings.eval_freq.min(self.settings.train_timesteps))?;
            let score = session.evaluate(self.settings.n_eval_episodes)?;

            // A diverged policy fails the trial outright. The pruner never
            // sees non-finite scores.
            if !score.is_finite() {
                return Err(Error::NonFiniteScore { eval_index });
            }

            trial.report(eval_index, score);
            trace_debug!(trial_id = trial.id(), eval_index, score, "evaluation");

            if trial.should_prune() {
                return Err(Error::TrialPruned);
            }
            last_score = score;
        }

        self.maybe_save(trial.id(), last_score, &session)?;
        Ok(last_score)
    }

    fn maybe_save(&self, trial_id: u64, score: f64, session: &T::Session) -> Result<()> {
        let Some(dir) = &self.settings.save_dir else {
            return Ok(());
        };
        let mut best = self.best_score.lock();
        if best.is_some_and(|b| score <= b) {
            return Ok(());
        }
        *best = Some(score);
        drop(best);

        let path = dir.join(format!("trial_{trial_id}"));
        session.save(&path)?;
        trace_info!(trial_id, score, path = %path.display(), "saved best model");
        Ok(())
    }
}

impl<T: PolicyTrainer> Objective for TuneJob<T> {
    type Error = Error;

    fn evaluate(&self, trial: &mut Trial) -> core::result::Result<f64, Error> {
        self.run_trial(trial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pruner::NoImprovementPruner;
    use crate::sampler::RandomSampler;
    use crate::study::Study;
    use crate::types::Direction;

    /// Backend stub whose score follows a fixed schedule per session.
    struct ScriptedTrainer {
        scores: Vec<f64>,
    }

    impl ScriptedTrainer {
        fn new(scores: Vec<f64>) -> Self {
            Self { scores }
        }
    }

    struct ScriptedSession {
        scores: Vec<f64>,
        next: usize,
    }

    impl PolicyTrainer for ScriptedTrainer {
        type Session = ScriptedSession;

        fn build(&self, _config: &PpoConfig) -> Result<ScriptedSession> {
            Ok(ScriptedSession {
                scores: self.scores.clone(),
                next: 0,
            })
        }
    }

    impl PolicySession for ScriptedSession {
        fn train(&mut self, _timesteps: u64) -> Result<()> {
            Ok(())
        }

        fn evaluate(&mut self, _n_episodes: u32) -> Result<f64> {
            let score = self.scores[self.next.min(self.scores.len() - 1)];
            self.next += 1;
            Ok(score)
        }

        fn save(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn n_evaluations_rounds_down_and_clamps() {
        assert_eq!(TuneSettings::new(100, 10).n_evaluations(), 10);
        assert_eq!(TuneSettings::new(105, 10).n_evaluations(), 10);
        assert_eq!(TuneSettings::new(5, 10).n_evaluations(), 1);
        assert_eq!(TuneSettings::new(100, 0).n_evaluations(), 1);
    }

    #[test]
    fn improving_trial_runs_all_evaluations() {
        let trainer = ScriptedTrainer::new(vec![-50.0, -40.0, -30.0, -20.0, -10.0]);
        let job = TuneJob::new(trainer, TuneSettings::new(50, 10));
        let study = Study::with_sampler_and_pruner(
            Direction::Maximize,
            RandomSampler::with_seed(1),
            NoImprovementPruner::new(Direction::Maximize)
                .warmup_steps(0)
                .patience(1)
                .min_improvement(1.0),
        );

        study.optimize(1, job).unwrap();
        let best = study.best_trial().unwrap();
        assert!((best.value - (-10.0)).abs() < f64::EPSILON);
        assert_eq!(best.intermediate_values.len(), 5);
    }

    #[test]
    fn stalled_trial_is_pruned_mid_run() {
        let trainer = ScriptedTrainer::new(vec![-50.0, -50.0, -50.0, -50.0, -50.0]);
        let job = TuneJob::new(trainer, TuneSettings::new(50, 10));
        let study = Study::with_sampler_and_pruner(
            Direction::Maximize,
            RandomSampler::with_seed(1),
            NoImprovementPruner::new(Direction::Maximize)
                .warmup_steps(0)
                .patience(1)
                .min_improvement(1.0),
        );

        let err = study.optimize(1, job).unwrap_err();
        assert!(matches!(err, Error::NoCompletedTrials));
        assert_eq!(study.n_pruned_trials(), 1);

        // best stalls at step 0, so patience 1 is exceeded at step 2
        let trials = study.trials();
        assert_eq!(trials[0].intermediate_values.len(), 3);
    }

    #[test]
    fn non_finite_score_fails_the_trial() {
        let trainer = ScriptedTrainer::new(vec![-50.0, f64::NAN]);
        let job = TuneJob::new(trainer, TuneSettings::new(50, 10));
        let study = Study::with_sampler_and_pruner(
            Direction::Maximize,
            RandomSampler::with_seed(1),
            NoImprovementPruner::new(Direction::Maximize),
        );

        let err = study.optimize(1, job).unwrap_err();
        assert!(matches!(err, Error::NoCompletedTrials));
        assert_eq!(study.n_trials(), 0);
    }
}
