//! Per-parameter bootstrap statistics.
//!
//! For each parameter column the bootstrap values are sorted ascending and
//! summarized as mean, sample standard deviation, and a 5%/95% nearest-rank
//! band (see `math::descriptive`). Percent error is `|stddev / best| * 100`
//! and is reported as `None` when the best-fit value is exactly zero.

use crate::domain::{BootstrapEnsemble, ParameterStatistic, Params};
use crate::error::{AppError, ErrorKind};
use crate::math::{Histogram, histogram, mean, nearest_rank, sample_stddev, sorted};

pub const LOWER_PERCENTILE: f64 = 0.05;
pub const UPPER_PERCENTILE: f64 = 0.95;

/// Summarize one column of bootstrap values.
pub fn summarize_column(name: &str, best: f64, values: &[f64]) -> Result<ParameterStatistic, AppError> {
    let degenerate = || {
        AppError::new(
            ErrorKind::DegenerateSample,
            format!(
                "Parameter {name}: need at least 2 bootstrap values for a standard deviation (got {}).",
                values.len()
            ),
        )
    };

    let stddev = sample_stddev(values).ok_or_else(degenerate)?;
    let mean = mean(values).ok_or_else(degenerate)?;
    let ordered = sorted(values);
    let p5 = nearest_rank(&ordered, LOWER_PERCENTILE).ok_or_else(degenerate)?;
    let p95 = nearest_rank(&ordered, UPPER_PERCENTILE).ok_or_else(degenerate)?;

    let percent_error = if best == 0.0 {
        None
    } else {
        Some((stddev / best * 100.0).abs())
    };

    Ok(ParameterStatistic {
        name: name.to_string(),
        best,
        mean,
        stddev,
        percent_error,
        p5,
        p95,
    })
}

/// Summarize every parameter of an ensemble, in `names` order.
pub fn summarize(
    ensemble: &BootstrapEnsemble,
    best_fit: &Params,
    names: &[&str],
) -> Result<Vec<ParameterStatistic>, AppError> {
    if names.len() != Params::LEN {
        return Err(AppError::config(format!(
            "Expected {} parameter names, got {}.",
            Params::LEN,
            names.len()
        )));
    }

    let best = best_fit.to_array();
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| summarize_column(name, best[idx], &ensemble.column(idx)))
        .collect()
}

/// Histogram of each parameter column, in [`Params::NAMES`] order.
pub fn parameter_histograms(ensemble: &BootstrapEnsemble, bins: usize) -> Vec<(&'static str, Option<Histogram>)> {
    Params::NAMES
        .iter()
        .enumerate()
        .map(|(idx, &name)| (name, histogram(&ensemble.column(idx), bins)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensemble_from(values: impl Fn(usize) -> Params, n: usize) -> BootstrapEnsemble {
        BootstrapEnsemble {
            samples: (0..n).map(values).collect(),
            failures: 0,
        }
    }

    #[test]
    fn percentiles_use_nearest_rank() {
        // Values 1..=100 shuffled, so sorting matters.
        let ens = ensemble_from(
            |i| {
                let v = ((i * 37) % 100 + 1) as f64;
                Params::new(v, v, v, v, v, v)
            },
            100,
        );
        let best = Params::new(50.0, 50.0, 50.0, 50.0, 50.0, 50.0);
        let stats = summarize(&ens, &best, &Params::NAMES).unwrap();
        assert_eq!(stats.len(), 6);
        for s in &stats {
            assert_eq!(s.p5, 6.0);
            assert_eq!(s.p95, 96.0);
            assert!((s.mean - 50.5).abs() < 1e-12);
        }
        assert_eq!(stats[4].name, "dG");
    }

    #[test]
    fn percent_error_and_zero_best() {
        let ens = ensemble_from(|i| Params::new(i as f64, 1.0, 0.0, 0.0, 2.0, 3.0), 5);
        let best = Params::new(0.0, 1.0, 0.0, 0.0, 2.0, -4.0);
        let stats = summarize(&ens, &best, &Params::NAMES).unwrap();

        // Column af = 0..4: sd = sqrt(2.5), best = 0 -> undefined.
        assert!((stats[0].stddev - 2.5_f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats[0].percent_error, None);

        // Constant columns: sd = 0 -> 0%.
        assert_eq!(stats[1].percent_error, Some(0.0));

        // Negative best still gives a non-negative percentage.
        assert_eq!(stats[5].percent_error, Some(0.0));
    }

    #[test]
    fn single_sample_is_degenerate() {
        let ens = ensemble_from(|_| Params::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0), 1);
        let err = summarize(&ens, &Params::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0), &Params::NAMES).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateSample);
    }

    #[test]
    fn names_must_match_parameter_count() {
        let ens = ensemble_from(|i| Params::new(i as f64, 0.0, 0.0, 0.0, 0.0, 0.0), 3);
        let err = summarize(&ens, &Params::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0), &["af", "bf"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn histograms_cover_every_parameter() {
        let ens = ensemble_from(|i| Params::new(i as f64, 1.0, 2.0, 3.0, 4.0, 5.0), 50);
        let hists = parameter_histograms(&ens, 25);
        assert_eq!(hists.len(), 6);
        for (_, h) in &hists {
            assert_eq!(h.as_ref().unwrap().counts.iter().sum::<usize>(), 50);
        }
    }
}
