//! Uniform random sampler.

use parking_lot::Mutex;

use crate::distribution::{Distribution, FloatDistribution, IntDistribution};
use crate::param::ParamValue;
use crate::rng_util;
use crate::sampler::{CompletedTrial, Sampler};

/// A sampler that draws uniformly from each distribution.
///
/// History is ignored. Log-scale distributions are sampled uniformly in
/// log space; stepped distributions are sampled on the step grid. This is
/// the baseline sampler and the default for new studies.
///
/// # Examples
///
/// ```
/// use gridtune::sampler::RandomSampler;
///
/// // Fresh RNG
/// let sampler = RandomSampler::new();
///
/// // Fixed seed for reproducible studies
/// let sampler = RandomSampler::with_seed(188);
/// ```
pub struct RandomSampler {
    rng: Mutex<fastrand::Rng>,
}

impl RandomSampler {
    /// Creates a random sampler seeded from entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Creates a random sampler with a fixed seed.
    ///
    /// The same seed produces the same sequence of sampled values.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn sample_float(rng: &mut fastrand::Rng, d: &FloatDistribution) -> f64 {
        if d.log_scale {
            let log_value = rng_util::f64_range(rng, d.low.ln(), d.high.ln());
            log_value.exp()
        } else if let Some(step) = d.step {
            let n_steps = ((d.high - d.low) / step).floor() as i64;
            let k = rng.i64(0..=n_steps);
            d.low + (k as f64) * step
        } else {
            rng_util::f64_range(rng, d.low, d.high)
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn sample_int(rng: &mut fastrand::Rng, d: &IntDistribution) -> i64 {
        if d.log_scale {
            let log_value = rng_util::f64_range(rng, (d.low as f64).ln(), (d.high as f64).ln());
            // Rounding may land just outside the bounds
            (log_value.exp().round() as i64).clamp(d.low, d.high)
        } else if let Some(step) = d.step {
            let n_steps = (d.high - d.low) / step;
            let k = rng.i64(0..=n_steps);
            d.low + k * step
        } else {
            rng.i64(d.low..=d.high)
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomSampler {
    fn sample(
        &self,
        distribution: &Distribution,
        _trial_id: u64,
        _history: &[CompletedTrial],
    ) -> ParamValue {
        let mut rng = self.rng.lock();

        match distribution {
            Distribution::Float(d) => ParamValue::Float(Self::sample_float(&mut rng, d)),
            Distribution::Int(d) => ParamValue::Int(Self::sample_int(&mut rng, d)),
            Distribution::Categorical(d) => ParamValue::Categorical(rng.usize(0..d.n_choices)),
        }
    }
}
