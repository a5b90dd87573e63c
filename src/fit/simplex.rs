//! Derivative-free minimization (Nelder–Mead downhill simplex).
//!
//! The objective is treated as a black box `f: ℝⁿ → ℝ`. Non-finite values
//! (NaN from a degenerate parameter vector, `inf` from a zero uncertainty) are
//! mapped to `+inf` so the simplex simply moves away from them.
//!
//! Defaults follow the classic setup:
//! - initial simplex: each coordinate perturbed by 5% (or `0.00025` when zero)
//! - reflection/expansion/contraction/shrink coefficients `1, 2, 0.5, 0.5`
//! - convergence when both the simplex extent (`xatol`) and the spread of
//!   objective values (`fatol`) fall below tolerance
//! - at most `200 * n` iterations and `200 * n` evaluations
//!
//! Running out of iterations is not an error: the result carries
//! `converged = false` and callers decide what to do.

use nalgebra::DVector;

const NONZERO_DELTA: f64 = 0.05;
const ZERO_DELTA: f64 = 0.00025;

const RHO: f64 = 1.0;
const CHI: f64 = 2.0;
const PSI: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Best point found by a minimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub fval: f64,
    pub converged: bool,
    pub iterations: usize,
    pub evaluations: usize,
    pub message: String,
}

/// Capability to minimize a scalar objective from a starting point.
///
/// Implementations must be deterministic for a given objective and start and
/// must never panic on a non-converging problem.
pub trait Minimizer: Sync {
    fn minimize(&self, objective: &dyn Fn(&[f64]) -> f64, x0: &[f64]) -> Minimum;
}

/// Nelder–Mead tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadOptions {
    /// Absolute tolerance on the simplex extent (max-norm).
    pub xatol: f64,
    /// Absolute tolerance on objective spread across vertices.
    pub fatol: f64,
    /// `None` means `200 * n`.
    pub max_iters: Option<usize>,
    /// `None` means `200 * n`.
    pub max_evals: Option<usize>,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            xatol: 1e-4,
            fatol: 1e-4,
            max_iters: None,
            max_evals: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NelderMead {
    pub options: NelderMeadOptions,
}

impl NelderMead {
    pub fn new(options: NelderMeadOptions) -> Self {
        Self { options }
    }
}

struct Counted<'a> {
    f: &'a dyn Fn(&[f64]) -> f64,
    calls: usize,
}

impl Counted<'_> {
    fn call(&mut self, x: &DVector<f64>) -> f64 {
        self.calls += 1;
        let v = (self.f)(x.as_slice());
        if v.is_nan() { f64::INFINITY } else { v }
    }
}

impl Minimizer for NelderMead {
    fn minimize(&self, objective: &dyn Fn(&[f64]) -> f64, x0: &[f64]) -> Minimum {
        let n = x0.len();
        let mut f = Counted { f: objective, calls: 0 };

        if n == 0 {
            let fval = f.call(&DVector::zeros(0));
            return Minimum {
                x: Vec::new(),
                fval,
                converged: fval.is_finite(),
                iterations: 0,
                evaluations: f.calls,
                message: "Nothing to optimize.".to_string(),
            };
        }

        let max_iters = self.options.max_iters.unwrap_or(200 * n);
        let max_evals = self.options.max_evals.unwrap_or(200 * n);

        let start = DVector::from_column_slice(x0);
        let mut sim: Vec<DVector<f64>> = Vec::with_capacity(n + 1);
        sim.push(start.clone());
        for k in 0..n {
            let mut y = start.clone();
            if y[k] != 0.0 {
                y[k] *= 1.0 + NONZERO_DELTA;
            } else {
                y[k] = ZERO_DELTA;
            }
            sim.push(y);
        }
        let mut fsim: Vec<f64> = sim.iter().map(|v| f.call(v)).collect();

        let mut iterations = 0usize;
        let converged = loop {
            sort_simplex(&mut sim, &mut fsim);

            if has_converged(&sim, &fsim, self.options.xatol, self.options.fatol) {
                break true;
            }
            if iterations >= max_iters || f.calls >= max_evals {
                break false;
            }

            // Centroid of all but the worst vertex.
            let mut xbar = DVector::<f64>::zeros(n);
            for v in &sim[..n] {
                xbar += v;
            }
            xbar /= n as f64;

            let worst = sim[n].clone();
            let xr = &xbar * (1.0 + RHO) - &worst * RHO;
            let fxr = f.call(&xr);

            if fxr < fsim[0] {
                let xe = &xbar * (1.0 + RHO * CHI) - &worst * (RHO * CHI);
                let fxe = f.call(&xe);
                if fxe < fxr {
                    sim[n] = xe;
                    fsim[n] = fxe;
                } else {
                    sim[n] = xr;
                    fsim[n] = fxr;
                }
            } else if fxr < fsim[n - 1] {
                sim[n] = xr;
                fsim[n] = fxr;
            } else {
                let accepted = if fxr < fsim[n] {
                    // Outside contraction.
                    let xc = &xbar * (1.0 + PSI * RHO) - &worst * (PSI * RHO);
                    let fxc = f.call(&xc);
                    (fxc <= fxr).then_some((xc, fxc))
                } else {
                    // Inside contraction.
                    let xcc = &xbar * (1.0 - PSI) + &worst * PSI;
                    let fxcc = f.call(&xcc);
                    (fxcc < fsim[n]).then_some((xcc, fxcc))
                };

                match accepted {
                    Some((x, fx)) => {
                        sim[n] = x;
                        fsim[n] = fx;
                    }
                    None => {
                        let best = sim[0].clone();
                        for j in 1..=n {
                            sim[j] = &best + (&sim[j] - &best) * SIGMA;
                            fsim[j] = f.call(&sim[j]);
                        }
                    }
                }
            }

            iterations += 1;
        };

        let fval = fsim[0];
        let (converged, message) = if !fval.is_finite() {
            (false, "Objective is not finite at the best vertex.".to_string())
        } else if converged {
            (true, "Optimization terminated successfully.".to_string())
        } else if f.calls >= max_evals {
            (false, format!("Maximum number of function evaluations ({max_evals}) exceeded."))
        } else {
            (false, format!("Maximum number of iterations ({max_iters}) exceeded."))
        };

        Minimum {
            x: sim[0].iter().copied().collect(),
            fval,
            converged,
            iterations,
            evaluations: f.calls,
            message,
        }
    }
}

fn sort_simplex(sim: &mut Vec<DVector<f64>>, fsim: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..fsim.len()).collect();
    order.sort_by(|&a, &b| fsim[a].total_cmp(&fsim[b]));
    *sim = order.iter().map(|&i| sim[i].clone()).collect();
    *fsim = order.iter().map(|&i| fsim[i]).collect();
}

fn has_converged(sim: &[DVector<f64>], fsim: &[f64], xatol: f64, fatol: f64) -> bool {
    let best = &sim[0];
    let x_ok = sim[1..]
        .iter()
        .all(|v| (v - best).amax() <= xatol);
    let f_ok = fsim[1..].iter().all(|fv| (fsim[0] - fv).abs() <= fatol);
    x_ok && f_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_quadratic_minimum() {
        let f = |x: &[f64]| (x[0] - 2.0).powi(2) + (x[1] + 3.0).powi(2);
        let min = NelderMead::default().minimize(&f, &[0.0, 0.0]);
        assert!(min.converged, "{}", min.message);
        assert!((min.x[0] - 2.0).abs() < 1e-3);
        assert!((min.x[1] + 3.0).abs() < 1e-3);
        assert!(min.fval < 1e-6);
    }

    #[test]
    fn minimizes_rosenbrock() {
        let f = |x: &[f64]| 100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2);
        let opts = NelderMeadOptions {
            xatol: 1e-8,
            fatol: 1e-8,
            max_iters: Some(5000),
            max_evals: Some(10_000),
        };
        let min = NelderMead::new(opts).minimize(&f, &[-1.2, 1.0]);
        assert!(min.converged, "{}", min.message);
        assert!((min.x[0] - 1.0).abs() < 1e-3, "x={:?}", min.x);
        assert!((min.x[1] - 1.0).abs() < 1e-3, "x={:?}", min.x);
    }

    #[test]
    fn reports_iteration_exhaustion_without_panicking() {
        let f = |x: &[f64]| (x[0] - 50.0).powi(2);
        let opts = NelderMeadOptions {
            max_iters: Some(3),
            ..NelderMeadOptions::default()
        };
        let min = NelderMead::new(opts).minimize(&f, &[0.0]);
        assert!(!min.converged);
        assert_eq!(min.iterations, 3);
        assert!(min.message.contains("iterations"));
    }

    #[test]
    fn nan_objective_is_not_converged() {
        let f = |_: &[f64]| f64::NAN;
        let min = NelderMead::default().minimize(&f, &[1.0, 1.0]);
        assert!(!min.converged);
        assert!(min.fval.is_infinite());
    }

    #[test]
    fn is_deterministic() {
        let f = |x: &[f64]| (x[0] - 0.3).abs() + (x[1] * x[1] - 0.5).powi(2);
        let a = NelderMead::default().minimize(&f, &[1.0, 1.0]);
        let b = NelderMead::default().minimize(&f, &[1.0, 1.0]);
        assert_eq!(a, b);
    }
}
