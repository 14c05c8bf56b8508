//! Nested sampling for Bayesian evidence.
//!
//! A population of live objects is drawn from the prior. Each iteration
//! removes the object with the lowest likelihood `L*`, credits it with the
//! prior mass shell it represents, and replaces it with a fresh object drawn
//! from the prior restricted to `L > L*`. The enclosed prior mass shrinks by
//! `e^{-1/N}` per iteration, so the evidence integral `Z = ∫ L dX` becomes a
//! sum over the discarded objects.
//!
//! # Strategies
//!
//! | Variant | Replacement | Best For |
//! |---------|-------------|----------|
//! | [`Explore::Crossover`] | Mix coordinates of two live parents | Separable likelihoods |
//! | [`Explore::RandomWalk`] | Adaptive MCMC walk from a survivor | General use |
//!
//! Objects live in unit-cube coordinates; [`Model::prior_bounds`] maps them to
//! parameter space, so the prior is uniform over a box.
//!
//! # References
//!
//! - D. S. Sivia and J. Skilling, "Data Analysis: A Bayesian Tutorial",
//!   2nd ed., chapter 9
//! - J. Skilling, "Nested Sampling for General Bayesian Computation" (2006)

use std::f64::consts::{LN_2, PI};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{AlgoError, Result};

/// Default number of live objects.
pub const DEFAULT_OBJECTS: usize = 100;

/// Default number of iterations.
pub const DEFAULT_ITERATIONS: usize = 1000;

/// A likelihood over a box-shaped uniform prior.
pub trait Model {
    /// Number of parameters.
    fn dims(&self) -> usize;

    /// Prior range `(lo, hi)` of parameter `dim`.
    fn prior_bounds(&self, dim: usize) -> (f64, f64);

    /// Natural log of the likelihood at `theta`.
    fn log_likelihood(&self, theta: &[f64]) -> f64;
}

/// Isotropic normalised Gaussian likelihood inside a box centred on its mean.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianModel {
    pub dims: usize,
    pub mean: f64,
    pub sigma: f64,
    /// Half-width of the prior box around `mean`.
    pub half_width: f64,
}

impl Default for GaussianModel {
    fn default() -> Self {
        Self {
            dims: 2,
            mean: 20.0,
            sigma: 8.0,
            half_width: 10.0,
        }
    }
}

impl Model for GaussianModel {
    fn dims(&self) -> usize {
        self.dims
    }

    fn prior_bounds(&self, _dim: usize) -> (f64, f64) {
        (self.mean - self.half_width, self.mean + self.half_width)
    }

    fn log_likelihood(&self, theta: &[f64]) -> f64 {
        let log_norm = -(self.sigma * (2.0 * PI).sqrt()).ln();
        theta
            .iter()
            .map(|&x| {
                let z = (x - self.mean) / self.sigma;
                log_norm - 0.5 * z * z
            })
            .sum()
    }
}

/// How a replacement object is evolved inside the likelihood constraint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Explore {
    /// Try up to `max_attempts` children of two distinct live parents, each
    /// coordinate taken from either parent. Keeps the copied survivor if none
    /// satisfies the constraint.
    Crossover { max_attempts: usize },
    /// `steps` Metropolis moves in unit-cube coordinates with wrap-around.
    /// The step size grows on acceptance and shrinks on rejection.
    RandomWalk { steps: usize, initial_step: f64 },
}

impl Default for Explore {
    fn default() -> Self {
        Explore::RandomWalk {
            steps: 20,
            initial_step: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NestedSamplingConfig {
    /// Live objects `N`.
    pub objects: usize,
    pub iterations: usize,
    pub seed: u64,
    pub strategy: Explore,
    /// Log progress every this many iterations; 0 disables it.
    pub log_every: usize,
}

impl Default for NestedSamplingConfig {
    fn default() -> Self {
        Self {
            objects: DEFAULT_OBJECTS,
            iterations: DEFAULT_ITERATIONS,
            seed: 0,
            strategy: Explore::default(),
            log_every: 100,
        }
    }
}

impl NestedSamplingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.objects < 2 {
            return Err(AlgoError::InvalidConfig(format!(
                "nested sampling needs at least 2 objects, got {}",
                self.objects
            )));
        }
        if self.iterations == 0 {
            return Err(AlgoError::InvalidConfig(
                "nested sampling needs at least 1 iteration".into(),
            ));
        }
        match self.strategy {
            Explore::Crossover { max_attempts: 0 } => Err(AlgoError::InvalidConfig(
                "crossover needs at least 1 attempt".into(),
            )),
            Explore::RandomWalk { steps: 0, .. } => Err(AlgoError::InvalidConfig(
                "random walk needs at least 1 step".into(),
            )),
            Explore::RandomWalk { initial_step, .. } if initial_step.is_nan() || initial_step <= 0.0 => {
                Err(AlgoError::InvalidConfig(format!(
                    "random walk step must be positive, got {initial_step}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// A discarded object: its position and its share of the evidence.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub theta: Vec<f64>,
    pub log_likelihood: f64,
    /// `ln(L * ΔX)`: log of the evidence contribution.
    pub log_weight: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NestedSamplingResult {
    /// `ln Z`.
    pub log_evidence: f64,
    /// Standard deviation of `ln Z`, `sqrt(H / N)`.
    pub log_evidence_error: f64,
    /// Information `H` in nats.
    pub information: f64,
    pub iterations: usize,
    pub samples: Vec<Sample>,
}

impl NestedSamplingResult {
    pub fn information_bits(&self) -> f64 {
        self.information / LN_2
    }

    /// Posterior mean of each parameter, weighting samples by `w / Z`.
    pub fn posterior_mean(&self) -> Vec<f64> {
        let dims = self.samples.first().map_or(0, |s| s.theta.len());
        let mut mean = vec![0.0; dims];
        for sample in &self.samples {
            let p = (sample.log_weight - self.log_evidence).exp();
            for (m, &x) in mean.iter_mut().zip(&sample.theta) {
                *m += p * x;
            }
        }
        mean
    }
}

/// `ln(e^a + e^b)` without overflow.
pub fn log_add(a: f64, b: f64) -> f64 {
    if a > b {
        a + (b - a).exp().ln_1p()
    } else {
        b + (a - b).exp().ln_1p()
    }
}

#[derive(Clone, Debug)]
struct Object {
    unit: Vec<f64>,
    theta: Vec<f64>,
    log_likelihood: f64,
}

struct Sampler<'a, M: Model + ?Sized> {
    model: &'a M,
    rng: StdRng,
}

impl<M: Model + ?Sized> Sampler<'_, M> {
    fn evaluate(&self, unit: Vec<f64>) -> Object {
        let theta: Vec<f64> = unit
            .iter()
            .enumerate()
            .map(|(dim, &u)| {
                let (lo, hi) = self.model.prior_bounds(dim);
                lo + u * (hi - lo)
            })
            .collect();
        let log_likelihood = self.model.log_likelihood(&theta);
        Object {
            unit,
            theta,
            log_likelihood,
        }
    }

    fn draw_from_prior(&mut self) -> Object {
        let unit = (0..self.model.dims())
            .map(|_| self.rng.random::<f64>())
            .collect();
        self.evaluate(unit)
    }

    /// Index in `0..n` other than `exclude`.
    fn other_index(&mut self, n: usize, exclude: usize) -> usize {
        let idx = self.rng.random_range(0..n - 1);
        if idx >= exclude { idx + 1 } else { idx }
    }

    fn crossover(
        &mut self,
        live: &[Object],
        start: Object,
        log_l_star: f64,
        max_attempts: usize,
    ) -> Object {
        let n = live.len();
        for _ in 0..max_attempts {
            let first = self.rng.random_range(0..n);
            let second = self.other_index(n, first);
            let parents = [&live[first], &live[second]];
            let unit = (0..self.model.dims())
                .map(|dim| parents[usize::from(self.rng.random::<bool>())].unit[dim])
                .collect();
            let child = self.evaluate(unit);
            if child.log_likelihood > log_l_star {
                return child;
            }
        }
        start
    }

    fn random_walk(
        &mut self,
        mut current: Object,
        log_l_star: f64,
        steps: usize,
        initial_step: f64,
    ) -> Object {
        let mut step = initial_step;
        let (mut accepted, mut rejected) = (0u32, 0u32);
        for _ in 0..steps {
            let unit = current
                .unit
                .iter()
                .map(|&u| {
                    let moved = u + step * (2.0 * self.rng.random::<f64>() - 1.0);
                    moved - moved.floor()
                })
                .collect();
            let trial = self.evaluate(unit);
            if trial.log_likelihood > log_l_star {
                current = trial;
                accepted += 1;
            } else {
                rejected += 1;
            }
            if accepted > rejected {
                step *= (1.0 / f64::from(accepted)).exp();
            } else if accepted < rejected {
                step /= (1.0 / f64::from(rejected)).exp();
            }
        }
        current
    }
}

/// Runs nested sampling of `model` under `config`.
pub fn run<M: Model + ?Sized>(model: &M, config: &NestedSamplingConfig) -> Result<NestedSamplingResult> {
    config.validate()?;
    if model.dims() == 0 {
        return Err(AlgoError::InvalidConfig("model has no parameters".into()));
    }

    let n = config.objects;
    let mut sampler = Sampler {
        model,
        rng: StdRng::seed_from_u64(config.seed),
    };
    let mut live: Vec<Object> = (0..n).map(|_| sampler.draw_from_prior()).collect();
    debug!(
        "nested sampling: objects={n} iterations={} dims={} strategy={:?}",
        config.iterations,
        model.dims(),
        config.strategy
    );

    // Width of the outermost shell, 1 - e^{-1/N}.
    let mut log_width = (-(-1.0 / n as f64).exp_m1()).ln();
    let mut log_z = f64::MIN;
    let mut information = 0.0;
    let mut samples = Vec::with_capacity(config.iterations);

    for iteration in 0..config.iterations {
        let worst = live
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.log_likelihood.total_cmp(&b.log_likelihood))
            .map_or(0, |(idx, _)| idx);
        let log_l_star = live[worst].log_likelihood;
        let log_weight = log_width + log_l_star;

        let log_z_new = log_add(log_z, log_weight);
        information = (log_weight - log_z_new).exp() * log_l_star
            + (log_z - log_z_new).exp() * (information + log_z)
            - log_z_new;
        log_z = log_z_new;

        samples.push(Sample {
            theta: live[worst].theta.clone(),
            log_likelihood: log_l_star,
            log_weight,
        });

        let copy = sampler.other_index(n, worst);
        let start = live[copy].clone();
        let replacement = match config.strategy {
            Explore::Crossover { max_attempts } => {
                sampler.crossover(&live, start, log_l_star, max_attempts)
            }
            Explore::RandomWalk {
                steps,
                initial_step,
            } => sampler.random_walk(start, log_l_star, steps, initial_step),
        };
        live[worst] = replacement;

        log_width -= 1.0 / n as f64;

        if config.log_every > 0 && (iteration + 1) % config.log_every == 0 {
            debug!(
                "iteration {}: ln(L*)={log_l_star:.4} ln(Z)={log_z:.4} H={information:.4}",
                iteration + 1
            );
        }
    }

    let log_evidence_error = (information / n as f64).sqrt();
    info!(
        "nested sampling done: ln(Z) = {log_z:.4} +- {log_evidence_error:.4}, H = {information:.4} nats"
    );

    Ok(NestedSamplingResult {
        log_evidence: log_z,
        log_evidence_error,
        information,
        iterations: config.iterations,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// `ln Z` for the Gaussian in a centred box: each axis keeps
    /// `erf(h / (sigma * sqrt 2))` of its mass, divided by the box volume.
    fn analytic_log_evidence(model: &GaussianModel) -> f64 {
        // erf(10 / (8 * sqrt 2)) for the default model.
        let erf = 0.788_700_452_5_f64;
        let volume = (2.0 * model.half_width).powi(model.dims as i32);
        model.dims as f64 * erf.ln() - volume.ln()
    }

    #[test]
    fn log_add_is_stable() {
        assert_abs_diff_eq!(log_add(0.0, 0.0), LN_2, epsilon = 1e-15);
        assert_abs_diff_eq!(log_add(1000.0, 1000.0), 1000.0 + LN_2, epsilon = 1e-12);
        assert_eq!(log_add(f64::MIN, -3.0), -3.0);
        assert_abs_diff_eq!(log_add(2.0f64.ln(), 3.0f64.ln()), 5.0f64.ln(), epsilon = 1e-15);
    }

    #[test]
    fn gaussian_likelihood_is_normalised() {
        let model = GaussianModel::default();
        let peak = model.log_likelihood(&[20.0, 20.0]);
        assert_abs_diff_eq!(peak, -2.0 * (8.0 * (2.0 * PI).sqrt()).ln(), epsilon = 1e-12);
        let off = model.log_likelihood(&[28.0, 20.0]);
        assert_abs_diff_eq!(peak - off, 0.5, epsilon = 1e-12);
        assert_eq!(model.prior_bounds(1), (10.0, 30.0));
    }

    #[test]
    fn random_walk_recovers_gaussian_evidence() {
        let model = GaussianModel::default();
        let config = NestedSamplingConfig {
            seed: 7,
            ..Default::default()
        };
        let result = run(&model, &config).unwrap();

        let expected = analytic_log_evidence(&model);
        assert_abs_diff_eq!(expected, -6.466, epsilon = 1e-3);
        assert!(
            (result.log_evidence - expected).abs() < 0.5,
            "ln Z = {} vs {expected}",
            result.log_evidence
        );
        assert!(result.information > 0.0);
        assert!(result.log_evidence_error > 0.0 && result.log_evidence_error < 0.5);
        assert_eq!(result.samples.len(), 1000);

        let mean = result.posterior_mean();
        assert_eq!(mean.len(), 2);
        for m in mean {
            assert!((m - 20.0).abs() < 2.0, "posterior mean {m}");
        }
    }

    #[test]
    fn discarded_likelihoods_never_decrease() {
        let config = NestedSamplingConfig {
            objects: 20,
            iterations: 200,
            seed: 3,
            ..Default::default()
        };
        let result = run(&GaussianModel::default(), &config).unwrap();
        for pair in result.samples.windows(2) {
            assert!(pair[1].log_likelihood >= pair[0].log_likelihood);
        }
    }

    #[test]
    fn crossover_terminates_and_is_deterministic() {
        let config = NestedSamplingConfig {
            objects: 30,
            iterations: 300,
            seed: 11,
            strategy: Explore::Crossover { max_attempts: 50 },
            log_every: 0,
        };
        let model = GaussianModel::default();
        let a = run(&model, &config).unwrap();
        let b = run(&model, &config).unwrap();
        assert_eq!(a, b);
        assert!(a.log_evidence.is_finite());
        assert!(a.information_bits() >= 0.0);
    }

    #[test]
    fn invalid_configs_rejected() {
        let model = GaussianModel::default();
        let bad = [
            NestedSamplingConfig {
                objects: 1,
                ..Default::default()
            },
            NestedSamplingConfig {
                iterations: 0,
                ..Default::default()
            },
            NestedSamplingConfig {
                strategy: Explore::RandomWalk {
                    steps: 0,
                    initial_step: 0.1,
                },
                ..Default::default()
            },
            NestedSamplingConfig {
                strategy: Explore::Crossover { max_attempts: 0 },
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(run(&model, &config), Err(AlgoError::InvalidConfig(_))));
        }
        let flat = GaussianModel {
            dims: 0,
            ..Default::default()
        };
        assert!(run(&flat, &NestedSamplingConfig::default()).is_err());
    }
}
