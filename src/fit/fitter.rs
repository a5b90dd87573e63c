//! Fit the two-state model to one dataset.
//!
//! Given:
//! - a model (fixes `RT`)
//! - a dataset of `(x, y, weight)`
//! - an initial parameter guess
//!
//! we minimize the weighted chi-square with the supplied [`Minimizer`] and
//! package the outcome as a [`FitResult`]. A non-converged run is a normal
//! result with `success = false`; retrying is the caller's business.

use crate::domain::{DataSet, FitResult, Params};
use crate::fit::simplex::Minimizer;
use crate::models::Model;

/// Fit `model` to `data` starting at `initial`.
pub fn fit(model: &Model, data: &DataSet, initial: &Params, minimizer: &dyn Minimizer) -> FitResult {
    let objective = |x: &[f64]| match Params::from_slice(x) {
        Some(p) => model.objective(&p, data),
        None => f64::INFINITY,
    };

    let min = minimizer.minimize(&objective, &initial.to_array());

    let Some(params) = Params::from_slice(&min.x) else {
        return FitResult {
            params: *initial,
            chi_sqr: f64::INFINITY,
            success: false,
            iterations: min.iterations,
            evaluations: min.evaluations,
            message: format!("Minimizer returned {} values, expected {}.", min.x.len(), Params::LEN),
        };
    };

    let success = min.converged && min.fval.is_finite() && params.is_finite();
    log::debug!(
        "fit finished: success={success} chi2={:.6} iters={} evals={} ({})",
        min.fval,
        min.iterations,
        min.evaluations,
        min.message
    );

    FitResult {
        params,
        chi_sqr: min.fval,
        success,
        iterations: min.iterations,
        evaluations: min.evaluations,
        message: min.message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Arity, Observation};
    use crate::fit::simplex::{Minimum, NelderMead};

    fn synthetic(model: &Model, truth: &Params) -> DataSet {
        let obs = (0..40)
            .map(|i| {
                let x = i as f64 * 0.05;
                Observation::new(x, model.evaluate(x, truth), 0.01)
            })
            .collect();
        DataSet::new(obs, Arity::Three)
    }

    #[test]
    fn recovers_low_chi_square_on_noiseless_data() {
        let model = Model::default();
        let truth = Params::new(-0.05, 1.0, -0.02, 0.2, 3.0, 4.0);
        let data = synthetic(&model, &truth);
        let start = Params::new(-0.04, 0.95, -0.01, 0.25, 2.8, 3.8);

        let res = fit(&model, &data, &start, &NelderMead::default());
        assert!(res.chi_sqr < model.objective(&start, &data));
        assert!((res.chi_sqr - model.objective(&res.params, &data)).abs() < 1e-9);
    }

    struct Canned(Minimum);

    impl Minimizer for Canned {
        fn minimize(&self, _: &dyn Fn(&[f64]) -> f64, _: &[f64]) -> Minimum {
            self.0.clone()
        }
    }

    #[test]
    fn non_converged_minimizer_is_reported_not_raised() {
        let model = Model::default();
        let data = synthetic(&model, &Params::new(0.0, 1.0, 0.0, 0.0, 3.0, 4.0));
        let canned = Canned(Minimum {
            x: vec![0.0, 1.0, 0.0, 0.0, 3.0, 4.0],
            fval: 0.0,
            converged: false,
            iterations: 1200,
            evaluations: 1200,
            message: "Maximum number of iterations (1200) exceeded.".to_string(),
        });
        let res = fit(&model, &data, &Params::new(0.0, 1.0, 0.0, 0.0, 3.0, 4.0), &canned);
        assert!(!res.success);
        assert_eq!(res.iterations, 1200);
    }

    #[test]
    fn wrong_length_from_minimizer_fails_cleanly() {
        let model = Model::default();
        let data = synthetic(&model, &Params::new(0.0, 1.0, 0.0, 0.0, 3.0, 4.0));
        let canned = Canned(Minimum {
            x: vec![1.0],
            fval: 0.0,
            converged: true,
            iterations: 1,
            evaluations: 1,
            message: String::new(),
        });
        let start = Params::new(0.0, 1.0, 0.0, 0.0, 3.0, 4.0);
        let res = fit(&model, &data, &start, &canned);
        assert!(!res.success);
        assert_eq!(res.params, start);
    }
}
