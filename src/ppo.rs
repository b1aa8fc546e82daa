//! PPO hyperparameter configuration and its tuned search space.
//!
//! [`PpoSearchSpace`] mirrors the ranges that proved productive for the
//! building energy-management task. Several hyperparameters are sampled in
//! a transformed space (`gamma` and `gae_lambda` as log-uniform distances
//! from 1, `n_steps` and `batch_size` as powers of two) and the resolved
//! values are recorded as trial user attributes so summaries show the
//! numbers the trainer actually saw.

use crate::error::Result;
use crate::parameter::{BoolParam, CategoricalParam, FloatParam, IntParam, Parameter};
use crate::trial::{AttrValue, Trial};

/// A complete PPO configuration, ready to hand to a training backend.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PpoConfig {
    pub learning_rate: f64,
    /// Rollout length per environment between policy updates.
    pub n_steps: u32,
    /// Minibatch size; never exceeds `n_steps`.
    pub batch_size: u32,
    pub n_epochs: u32,
    pub gamma: f64,
    pub gae_lambda: f64,
    pub clip_range: f64,
    pub ent_coef: f64,
    pub vf_coef: f64,
    pub max_grad_norm: f64,
    /// Early-stop threshold for the policy update; `None` disables it.
    pub target_kl: Option<f64>,
    /// Steps between noise-matrix resamples for state-dependent exploration.
    pub sde_sample_freq: u32,
    /// Use a full covariance std matrix for the exploration noise.
    pub full_std: bool,
    /// Hidden layer widths of both policy and value networks.
    pub net_arch: [u32; 2],
}

/// The tuned PPO search space.
///
/// Construct once and reuse across trials: each parameter keeps a stable
/// identity, so samplers can relate values of the same hyperparameter
/// across the trial history.
///
/// # Examples
///
/// ```
/// use gridtune::ppo::PpoSearchSpace;
/// use gridtune::{Direction, Study};
///
/// let space = PpoSearchSpace::new();
/// let study = Study::new(Direction::Maximize);
///
/// let mut trial = study.ask();
/// let config = space.suggest(&mut trial).unwrap();
/// assert!(config.batch_size <= config.n_steps);
/// assert!((config.gamma - 1.0).abs() <= 0.2);
/// ```
#[derive(Debug)]
pub struct PpoSearchSpace {
    learning_rate: FloatParam,
    /// Sampled as `1 - gamma` so small distances from 1 get resolution.
    one_minus_gamma: FloatParam,
    one_minus_gae_lambda: FloatParam,
    n_epochs: IntParam,
    max_grad_norm: FloatParam,
    exponent_n_steps: IntParam,
    exponent_batch_size: IntParam,
    ent_coef: FloatParam,
    clip_range: CategoricalParam<f64>,
    vf_coef: CategoricalParam<f64>,
    target_kl: CategoricalParam<Option<f64>>,
    exponent_sde_sample_freq: IntParam,
    full_std: BoolParam,
    net_arch_layer1: IntParam,
    net_arch_layer2: IntParam,
}

impl PpoSearchSpace {
    #[must_use]
    pub fn new() -> Self {
        let mut target_kl_choices: Vec<Option<f64>> = vec![None];
        target_kl_choices.extend((1..=9).map(|k| Some(3e-4 * f64::from(k))));

        Self {
            learning_rate: FloatParam::new(5e-6, 3e-3).log_scale().name("lr"),
            one_minus_gamma: FloatParam::new(3e-4, 0.2).log_scale().name("gamma"),
            one_minus_gae_lambda: FloatParam::new(1e-3, 0.1)
                .log_scale()
                .name("gae_lambda"),
            n_epochs: IntParam::new(3, 10).name("n_epochs"),
            max_grad_norm: FloatParam::new(0.3, 0.5).log_scale().name("max_grad_norm"),
            exponent_n_steps: IntParam::new(2, 12).name("exponent_n_steps"),
            exponent_batch_size: IntParam::new(2, 12).name("exponent_batch_size"),
            ent_coef: FloatParam::new(1e-9, 0.01).log_scale().name("ent_coef"),
            clip_range: CategoricalParam::new(vec![0.1, 0.2, 0.3]).name("clip_range"),
            vf_coef: CategoricalParam::new(vec![0.5, 1.0]).name("vf_coef"),
            target_kl: CategoricalParam::new(target_kl_choices).name("target_kl"),
            exponent_sde_sample_freq: IntParam::new(8, 12).name("exponent_sde_sample_freq"),
            full_std: BoolParam::new().name("full_std"),
            net_arch_layer1: IntParam::new(256, 512).step(16).name("net_arch_layer1"),
            net_arch_layer2: IntParam::new(256, 512).step(16).name("net_arch_layer2"),
        }
    }

    /// Suggest a full PPO configuration on `trial`.
    ///
    /// Resolved values of the transformed hyperparameters (`gamma`,
    /// `gae_lambda`, `n_steps`, `batch_size`, `sde_sample_freq`) are stored
    /// as user attributes on the trial.
    ///
    /// # Errors
    ///
    /// Propagates sampling errors from the underlying parameters.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn suggest(&self, trial: &mut Trial) -> Result<PpoConfig> {
        let learning_rate = self.learning_rate.suggest(trial)?;
        let gamma = 1.0 - self.one_minus_gamma.suggest(trial)?;
        let gae_lambda = 1.0 - self.one_minus_gae_lambda.suggest(trial)?;
        let n_epochs = self.n_epochs.suggest(trial)? as u32;
        let max_grad_norm = self.max_grad_norm.suggest(trial)?;
        let n_steps = 2u32.pow(self.exponent_n_steps.suggest(trial)? as u32);
        // The minibatch cannot be larger than one rollout.
        let batch_size = 2u32
            .pow(self.exponent_batch_size.suggest(trial)? as u32)
            .min(n_steps);
        let ent_coef = self.ent_coef.suggest(trial)?;
        let clip_range = self.clip_range.suggest(trial)?;
        let vf_coef = self.vf_coef.suggest(trial)?;
        let target_kl = self.target_kl.suggest(trial)?;
        let sde_sample_freq = 2u32.pow(self.exponent_sde_sample_freq.suggest(trial)? as u32);
        let full_std = self.full_std.suggest(trial)?;
        let net_arch = [
            self.net_arch_layer1.suggest(trial)? as u32,
            self.net_arch_layer2.suggest(trial)? as u32,
        ];

        trial.set_user_attr("gamma_", AttrValue::Float(gamma));
        trial.set_user_attr("gae_lambda_", AttrValue::Float(gae_lambda));
        trial.set_user_attr("n_steps", AttrValue::Int(i64::from(n_steps)));
        trial.set_user_attr("batch_size", AttrValue::Int(i64::from(batch_size)));
        trial.set_user_attr(
            "sde_sample_freq",
            AttrValue::Int(i64::from(sde_sample_freq)),
        );

        Ok(PpoConfig {
            learning_rate,
            n_steps,
            batch_size,
            n_epochs,
            gamma,
            gae_lambda,
            clip_range,
            ent_coef,
            vf_coef,
            max_grad_norm,
            target_kl,
            sde_sample_freq,
            full_std,
            net_arch,
        })
    }
}

impl Default for PpoSearchSpace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pruner::NopPruner;
    use crate::sampler::RandomSampler;
    use crate::storage::{MemoryStorage, Storage};
    use crate::trial::Trial;
    use std::sync::Arc;

    fn seeded_trial(seed: u64) -> Trial {
        let storage = MemoryStorage::new();
        Trial::attached(
            0,
            Arc::new(RandomSampler::with_seed(seed)),
            Arc::new(NopPruner),
            Arc::clone(storage.trials_arc()),
        )
    }

    #[test]
    fn suggested_configs_respect_bounds() {
        let space = PpoSearchSpace::new();
        for seed in 0..32 {
            let mut trial = seeded_trial(seed);
            let c = space.suggest(&mut trial).unwrap();

            assert!((5e-6..=3e-3).contains(&c.learning_rate));
            assert!((0.8..1.0).contains(&c.gamma));
            assert!((0.9..1.0).contains(&c.gae_lambda));
            assert!((3..=10).contains(&c.n_epochs));
            assert!((0.3..=0.5).contains(&c.max_grad_norm));
            assert!(c.n_steps.is_power_of_two() && (4..=4096).contains(&c.n_steps));
            assert!(c.batch_size.is_power_of_two() && c.batch_size <= c.n_steps);
            assert!((1e-9..=0.01).contains(&c.ent_coef));
            assert!([0.1, 0.2, 0.3].contains(&c.clip_range));
            assert!([0.5, 1.0].contains(&c.vf_coef));
            if let Some(kl) = c.target_kl {
                assert!((3e-4..=2.7e-3 + 1e-12).contains(&kl));
            }
            assert!(
                c.sde_sample_freq.is_power_of_two()
                    && (256..=4096).contains(&c.sde_sample_freq)
            );
            for width in c.net_arch {
                assert!((256..=512).contains(&width));
                assert_eq!(width % 16, 0);
            }
        }
    }

    #[test]
    fn resolved_values_recorded_as_user_attrs() {
        let space = PpoSearchSpace::new();
        let mut trial = seeded_trial(7);
        let config = space.suggest(&mut trial).unwrap();

        let Some(AttrValue::Float(gamma)) = trial.user_attr("gamma_") else {
            panic!("gamma_ attribute missing");
        };
        assert!((gamma - config.gamma).abs() < f64::EPSILON);

        let Some(AttrValue::Int(n_steps)) = trial.user_attr("n_steps") else {
            panic!("n_steps attribute missing");
        };
        assert_eq!(*n_steps, i64::from(config.n_steps));
    }

    #[test]
    fn repeated_suggest_on_one_trial_is_stable() {
        let space = PpoSearchSpace::new();
        let mut trial = seeded_trial(3);
        let first = space.suggest(&mut trial).unwrap();
        let second = space.suggest(&mut trial).unwrap();
        assert_eq!(first, second);
    }
}
