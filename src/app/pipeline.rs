//! Shared "fit pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> initial fit -> residuals/transform -> bootstrap -> statistics
//!
//! Front-ends then focus on presentation (printing and exports).

use crate::domain::{BootstrapEnsemble, DataSet, FitConfig, FitResult, ParameterStatistic, Params};
use crate::error::AppError;
use crate::fit::{NelderMead, NelderMeadOptions, fit, run_bootstrap};
use crate::io::load_dataset;
use crate::math::Histogram;
use crate::models::Model;
use crate::report::{
    CurvePoint, FitDiagnostics, ResidualPoint, Transformed, compute_residuals, diagnostics, parameter_histograms,
    sample_curve, summarize, transform,
};

/// All computed outputs of a single `unfold fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub data: DataSet,
    pub model: Model,
    pub fit: FitResult,
    pub diagnostics: FitDiagnostics,
    pub curve: Vec<CurvePoint>,
    pub residuals: Vec<ResidualPoint>,
    pub transformed: Transformed,
    pub ensemble: BootstrapEnsemble,
    pub statistics: Vec<ParameterStatistic>,
    pub histograms: Vec<(&'static str, Option<Histogram>)>,
}

/// Build the simplex minimizer described by `config`.
pub fn minimizer_for(config: &FitConfig) -> Result<NelderMead, AppError> {
    for (name, v) in [("xatol", config.xatol), ("fatol", config.fatol)] {
        if !(v.is_finite() && v > 0.0) {
            return Err(AppError::config(format!("{name} must be finite and > 0 (got {v}).")));
        }
    }
    Ok(NelderMead::new(NelderMeadOptions {
        xatol: config.xatol,
        fatol: config.fatol,
        max_iters: config.max_iters,
        max_evals: config.max_iters.map(|n| n.saturating_mul(2)),
    }))
}

/// Execute the full pipeline from the data file named in `config`.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let data = load_dataset(&config.data_path, &config.load)?;
    run_fit_with_data(config, data)
}

/// Execute the pipeline on an already-loaded dataset.
pub fn run_fit_with_data(config: &FitConfig, data: DataSet) -> Result<RunOutput, AppError> {
    let model = Model::new(config.gas_constant, config.temperature)?;
    let minimizer = minimizer_for(config)?;

    // 1) Initial fit.
    let best = fit(&model, &data, &config.initial_guess, &minimizer);
    if !best.success {
        log::warn!("initial fit did not converge: {}", best.message);
    }
    let diag = diagnostics(&model, &data, &config.initial_guess, &best.params);

    // 2) Derived series for plotting/export.
    let curve = sample_curve(&model, &best.params, data.x_max().unwrap_or(0.0));
    let residuals = compute_residuals(&model, &data, &best.params)?;
    let transformed = transform(&model, &data, &best.params)?;

    // 3) Bootstrap from the best fit.
    let ensemble = run_bootstrap(&model, &data, &best.params, &config.bootstrap, &minimizer)?;

    // 4) Per-parameter statistics.
    let statistics = summarize(&ensemble, &best.params, &Params::NAMES)?;
    let histograms = parameter_histograms(&ensemble, config.histogram_bins);

    Ok(RunOutput {
        data,
        model,
        fit: best,
        diagnostics: diag,
        curve,
        residuals,
        transformed,
        ensemble,
        statistics,
        histograms,
    })
}
