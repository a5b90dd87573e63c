//! Randomized dataset variants for bootstrap uncertainty estimation.
//!
//! Both strategies return a dataset of the same length and column layout as
//! the input, and draw every element independently from the caller's RNG.
//! The RNG is always injected, so callers control seeding and can give each
//! worker its own stream.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::domain::{DataSet, Observation, ResampleMethod};
use crate::error::{AppError, ErrorKind};

/// Produce one resampled dataset with the given strategy.
pub fn resample<R: Rng + ?Sized>(
    method: ResampleMethod,
    data: &DataSet,
    rng: &mut R,
) -> Result<DataSet, AppError> {
    match method {
        ResampleMethod::Cases => Ok(resample_cases(data, rng)),
        ResampleMethod::Residuals => resample_residuals(data, rng),
    }
}

/// Draw `n` observations uniformly with replacement.
pub fn resample_cases<R: Rng + ?Sized>(data: &DataSet, rng: &mut R) -> DataSet {
    let obs = data.observations();
    if obs.is_empty() {
        return data.clone();
    }
    let drawn = (0..obs.len()).map(|_| obs[rng.gen_range(0..obs.len())]).collect();
    data.derive(drawn)
}

/// Replace each `y` with a draw from `N(y, weight)`; `x` and weight are kept.
pub fn resample_residuals<R: Rng + ?Sized>(data: &DataSet, rng: &mut R) -> Result<DataSet, AppError> {
    let mut drawn = Vec::with_capacity(data.len());
    for o in data {
        let normal = Normal::new(o.y, o.weight).map_err(|e| {
            AppError::new(
                ErrorKind::Numeric,
                format!("Cannot perturb y={} with uncertainty {}: {e}", o.y, o.weight),
            )
        })?;
        drawn.push(Observation::new(o.x, normal.sample(rng), o.weight));
    }
    Ok(data.derive(drawn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Arity;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn dataset(n: usize) -> DataSet {
        let obs = (0..n)
            .map(|i| Observation::new(i as f64, 10.0 + i as f64, 0.5))
            .collect();
        DataSet::new(obs, Arity::Three)
    }

    #[test]
    fn case_resample_keeps_size_and_draws_originals() {
        let data = dataset(20);
        let mut rng = StdRng::seed_from_u64(7);
        let out = resample_cases(&data, &mut rng);
        assert_eq!(out.len(), data.len());
        assert_eq!(out.arity(), data.arity());
        for o in &out {
            assert!(data.observations().contains(o));
        }
    }

    #[test]
    fn case_resample_inclusion_rate_matches_bootstrap_theory() {
        // P(point included) = 1 - (1 - 1/N)^N ≈ 0.636 for N = 50.
        let n = 50;
        let data = dataset(n);
        let mut rng = StdRng::seed_from_u64(2021);
        let trials = 10_000;
        let mut included = vec![0usize; n];

        for _ in 0..trials {
            let out = resample_cases(&data, &mut rng);
            let mut seen = vec![false; n];
            for o in &out {
                seen[o.x as usize] = true;
            }
            for (count, hit) in included.iter_mut().zip(seen) {
                *count += usize::from(hit);
            }
        }

        let expected = 1.0 - (1.0 - 1.0 / n as f64).powi(n as i32);
        let overall = included.iter().sum::<usize>() as f64 / (trials * n) as f64;
        assert!((overall - expected).abs() < 0.005, "overall {overall} vs {expected}");

        // Per-point binomial sd is ~0.0048; allow a wide band.
        for (i, &count) in included.iter().enumerate() {
            let rate = count as f64 / trials as f64;
            assert!((rate - expected).abs() < 0.03, "point {i}: {rate}");
        }
    }

    #[test]
    fn residual_resample_keeps_x_and_weight() {
        let data = dataset(30);
        let mut rng = StdRng::seed_from_u64(3);
        let out = resample_residuals(&data, &mut rng).unwrap();
        assert_eq!(out.len(), data.len());
        for (a, b) in data.iter().zip(out.iter()) {
            assert_eq!(a.x, b.x);
            assert_eq!(a.weight, b.weight);
            assert!((a.y - b.y).abs() < 6.0 * a.weight);
        }
    }

    #[test]
    fn residual_resample_has_expected_spread() {
        let data = DataSet::new(vec![Observation::new(0.0, 1.0, 0.2); 1], Arity::Three);
        let mut rng = StdRng::seed_from_u64(11);
        let draws: Vec<f64> = (0..20_000)
            .map(|_| resample_residuals(&data, &mut rng).unwrap().observations()[0].y)
            .collect();
        let mean = crate::math::mean(&draws).unwrap();
        let sd = crate::math::sample_stddev(&draws).unwrap();
        assert!((mean - 1.0).abs() < 0.01, "mean {mean}");
        assert!((sd - 0.2).abs() < 0.01, "sd {sd}");
    }

    #[test]
    fn same_seed_same_resample() {
        let data = dataset(10);
        let a = resample(ResampleMethod::Cases, &data, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = resample(ResampleMethod::Cases, &data, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);
    }
}
