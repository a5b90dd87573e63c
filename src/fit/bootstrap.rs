//! Bootstrap engine: resample, refit, and collect successful parameter vectors.
//!
//! The ensemble is built from `target_count` independent *slots*. Each slot:
//! - owns its own RNG stream, seeded from `(seed, slot)` via SplitMix64
//! - repeatedly resamples the dataset and refits from the best-fit parameters
//! - stops at its first successful fit, counting every failed attempt
//!
//! Slots run in parallel (rayon) and are collected in slot order, so the
//! result depends only on the inputs and the seed, never on scheduling.
//! A slot that fails `max_attempts_per_sample` times in a row aborts the run
//! with `ResampleExhausted` instead of looping forever.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::domain::{BootstrapConfig, BootstrapEnsemble, DataSet, Params};
use crate::error::{AppError, ErrorKind};
use crate::fit::fitter::fit;
use crate::fit::resample::resample;
use crate::fit::simplex::Minimizer;
use crate::models::Model;

/// Derive the seed for stream `counter` from `base_seed` (SplitMix64 finalizer).
///
/// Neighbouring counters give unrelated seeds, so slot streams do not overlap
/// the way `base_seed + counter` seeding can.
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[derive(Debug, Clone, Copy)]
struct SlotOutcome {
    params: Params,
    failures: usize,
}

/// Run the bootstrap and return exactly `config.target_count` accepted fits.
pub fn run_bootstrap(
    model: &Model,
    data: &DataSet,
    best_fit: &Params,
    config: &BootstrapConfig,
    minimizer: &dyn Minimizer,
) -> Result<BootstrapEnsemble, AppError> {
    if config.max_attempts_per_sample == 0 {
        return Err(AppError::config("max_attempts_per_sample must be >= 1."));
    }
    if data.is_empty() {
        return Err(AppError::format("Cannot bootstrap an empty dataset."));
    }

    log::info!(
        "bootstrap: {} samples ({:?} resampling, seed {})",
        config.target_count,
        config.method,
        config.seed
    );

    let outcomes: Vec<SlotOutcome> = (0..config.target_count)
        .into_par_iter()
        .map(|slot| run_slot(slot, model, data, best_fit, config, minimizer))
        .collect::<Result<_, _>>()?;

    let ensemble = BootstrapEnsemble {
        samples: outcomes.iter().map(|o| o.params).collect(),
        failures: outcomes.iter().map(|o| o.failures).sum(),
    };

    log::info!(
        "bootstrap: {} accepted, {} failed fits ({:.1}% failure rate)",
        ensemble.accepted(),
        ensemble.failures,
        100.0 * ensemble.failure_rate()
    );

    Ok(ensemble)
}

fn run_slot(
    slot: usize,
    model: &Model,
    data: &DataSet,
    best_fit: &Params,
    config: &BootstrapConfig,
    minimizer: &dyn Minimizer,
) -> Result<SlotOutcome, AppError> {
    let mut rng = StdRng::seed_from_u64(counter_rng_seed(config.seed, slot as u64));
    let mut failures = 0usize;

    while failures < config.max_attempts_per_sample {
        let sample = resample(config.method, data, &mut rng)?;
        let result = fit(model, &sample, best_fit, minimizer);

        if result.success {
            return Ok(SlotOutcome {
                params: result.params,
                failures,
            });
        }

        failures += 1;
        if config.verbose {
            log::warn!(
                "failed bootstrap fit (sample {slot}, attempt {failures}): chi2={:.6} iters={} evals={} - {}",
                result.chi_sqr,
                result.iterations,
                result.evaluations,
                result.message
            );
        } else {
            log::debug!("failed bootstrap fit (sample {slot}, attempt {failures}): {}", result.message);
        }
    }

    Err(AppError::new(
        ErrorKind::ResampleExhausted,
        format!(
            "Bootstrap sample {slot} failed to fit after {} attempts.",
            config.max_attempts_per_sample
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::{Arity, Observation, ResampleMethod};
    use crate::fit::simplex::{Minimum, NelderMead};

    fn data() -> DataSet {
        let model = Model::default();
        let truth = Params::new(-0.05, 1.0, -0.02, 0.2, 3.0, 4.0);
        let obs = (0..25)
            .map(|i| {
                let x = i as f64 * 0.08;
                let wiggle = if i % 2 == 0 { 0.004 } else { -0.004 };
                Observation::new(x, model.evaluate(x, &truth) + wiggle, 0.01)
            })
            .collect();
        DataSet::new(obs, Arity::Three)
    }

    /// Fails every `period`-th call, otherwise echoes the start point.
    struct Flaky {
        calls: AtomicUsize,
        period: usize,
    }

    impl Minimizer for Flaky {
        fn minimize(&self, objective: &dyn Fn(&[f64]) -> f64, x0: &[f64]) -> Minimum {
            let call = self.calls.fetch_add(1, Ordering::Relaxed);
            Minimum {
                x: x0.to_vec(),
                fval: objective(x0),
                converged: call % self.period != 0,
                iterations: 1,
                evaluations: 1,
                message: String::new(),
            }
        }
    }

    struct NeverConverges;

    impl Minimizer for NeverConverges {
        fn minimize(&self, objective: &dyn Fn(&[f64]) -> f64, x0: &[f64]) -> Minimum {
            Minimum {
                x: x0.to_vec(),
                fval: objective(x0),
                converged: false,
                iterations: 0,
                evaluations: 1,
                message: "stub".to_string(),
            }
        }
    }

    fn config(target_count: usize) -> BootstrapConfig {
        BootstrapConfig {
            target_count,
            seed: 9,
            method: ResampleMethod::Cases,
            max_attempts_per_sample: 50,
            verbose: false,
        }
    }

    #[test]
    fn ensemble_has_exact_target_size_despite_failures() {
        let flaky = Flaky {
            calls: AtomicUsize::new(0),
            period: 3,
        };
        let best = Params::new(0.0, 1.0, 0.0, 0.0, 3.0, 4.0);
        let ens = run_bootstrap(&Model::default(), &data(), &best, &config(40), &flaky).unwrap();
        assert_eq!(ens.accepted(), 40);
        assert!(ens.failures > 0);

        let calls = flaky.calls.load(Ordering::Relaxed);
        assert_eq!(calls, ens.accepted() + ens.failures);
    }

    #[test]
    fn exhausted_slot_is_an_error() {
        let best = Params::new(0.0, 1.0, 0.0, 0.0, 3.0, 4.0);
        let cfg = BootstrapConfig {
            max_attempts_per_sample: 4,
            ..config(3)
        };
        let err = run_bootstrap(&Model::default(), &data(), &best, &cfg, &NeverConverges).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResampleExhausted);
    }

    #[test]
    fn zero_attempt_cap_is_rejected() {
        let best = Params::new(0.0, 1.0, 0.0, 0.0, 3.0, 4.0);
        let cfg = BootstrapConfig {
            max_attempts_per_sample: 0,
            ..config(3)
        };
        let err = run_bootstrap(&Model::default(), &data(), &best, &cfg, &NelderMead::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn same_seed_gives_same_ensemble() {
        let model = Model::default();
        let data = data();
        let best = crate::fit::fit(
            &model,
            &data,
            &Params::new(-0.04, 0.95, -0.01, 0.25, 2.8, 3.8),
            &NelderMead::default(),
        )
        .params;

        let cfg = BootstrapConfig {
            method: ResampleMethod::Residuals,
            ..config(8)
        };
        let a = run_bootstrap(&model, &data, &best, &cfg, &NelderMead::default()).unwrap();
        let b = run_bootstrap(&model, &data, &best, &cfg, &NelderMead::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.accepted(), 8);
    }

    #[test]
    fn counter_seeds_are_distinct() {
        let seeds: Vec<u64> = (0..1000).map(|i| counter_rng_seed(42, i)).collect();
        let mut dedup = seeds.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), seeds.len());
        assert_ne!(counter_rng_seed(1, 0), counter_rng_seed(2, 0));
    }
}
