//! Reporting utilities: residuals, sampled curves, normalized views, and
//! per-parameter bootstrap summaries.
//!
//! Everything here is a pure function of the model, data, and fitted
//! parameters; writing files is left to `io::export`.

use serde::{Deserialize, Serialize};

use crate::domain::{DataSet, Observation, Params};
use crate::error::{AppError, ErrorKind};
use crate::models::Model;

pub mod format;
pub mod summary;

pub use format::*;
pub use summary::*;

/// Spacing of sampled curve points.
pub const CURVE_STEP: f64 = 0.01;

/// Sampled curves extend this factor past the largest observed `x`.
pub const CURVE_MARGIN: f64 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualPoint {
    pub x: f64,
    pub residual: f64,
    pub weight: f64,
}

/// Goodness-of-fit numbers for the initial and best-fit parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub initial_chi_sqr: f64,
    pub final_chi_sqr: f64,
    pub n_points: usize,
    /// `n_points - 6`; may be zero or negative for tiny datasets.
    pub ndof: i64,
    /// `final_chi_sqr / ndof`, `None` when `ndof <= 0`.
    pub reduced_chi_sqr: Option<f64>,
}

/// Data mapped onto the normalized (0..1) two-state scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    /// `(x, y_norm(x) + residual * scale, weight * scale)` per observation.
    pub points: Vec<Observation>,
    /// Normalized model curve.
    pub curve: Vec<CurvePoint>,
    /// `1 / (max(y) - min(y))`.
    pub scale: f64,
}

pub fn diagnostics(model: &Model, data: &DataSet, initial: &Params, best: &Params) -> FitDiagnostics {
    let final_chi_sqr = model.objective(best, data);
    let ndof = data.len() as i64 - Params::LEN as i64;
    FitDiagnostics {
        initial_chi_sqr: model.objective(initial, data),
        final_chi_sqr,
        n_points: data.len(),
        ndof,
        reduced_chi_sqr: (ndof > 0).then(|| final_chi_sqr / ndof as f64),
    }
}

/// Residuals `y - y(x)` with each point's uncertainty.
pub fn compute_residuals(model: &Model, data: &DataSet, params: &Params) -> Result<Vec<ResidualPoint>, AppError> {
    let mut out = Vec::with_capacity(data.len());
    for o in data {
        let residual = o.y - model.evaluate(o.x, params);
        if !residual.is_finite() {
            return Err(AppError::new(
                ErrorKind::Numeric,
                format!("Non-finite residual at x={}.", o.x),
            ));
        }
        out.push(ResidualPoint {
            x: o.x,
            residual,
            weight: o.weight,
        });
    }
    Ok(out)
}

/// Sample the model on `[0, CURVE_MARGIN * x_max]` every `CURVE_STEP`.
pub fn sample_curve(model: &Model, params: &Params, x_max: f64) -> Vec<CurvePoint> {
    let upper = x_max * CURVE_MARGIN;
    if !(upper.is_finite() && upper >= 0.0) {
        return Vec::new();
    }
    // Small slack so an endpoint that is an exact multiple of the step survives rounding.
    let steps = (upper / CURVE_STEP + 1e-9).floor() as usize;
    (0..=steps)
        .map(|i| {
            let x = i as f64 * CURVE_STEP;
            CurvePoint {
                x,
                y: model.evaluate(x, params),
            }
        })
        .collect()
}

/// Re-express data and fit on the normalized two-state scale.
///
/// Baselines are replaced by `folded = 1`, `unfolded = 0`, residuals and
/// uncertainties are scaled by the observed y-range, so curves from different
/// signals can be compared directly.
pub fn transform(model: &Model, data: &DataSet, params: &Params) -> Result<Transformed, AppError> {
    let Some((y_min, y_max)) = data.y_range() else {
        return Err(AppError::format("Cannot transform an empty dataset."));
    };
    let span = y_max - y_min;
    if !(span.is_finite() && span > 0.0) {
        return Err(AppError::new(
            ErrorKind::Numeric,
            "Cannot normalize data: all y values are equal.",
        ));
    }
    let scale = 1.0 / span;
    let norm = params.normalized();

    let points = data
        .iter()
        .map(|o| {
            let residual = o.y - model.evaluate(o.x, params);
            Observation::new(o.x, model.evaluate(o.x, &norm) + residual * scale, o.weight * scale)
        })
        .collect();

    let curve = sample_curve(model, &norm, data.x_max().unwrap_or(0.0));

    Ok(Transformed { points, curve, scale })
}
