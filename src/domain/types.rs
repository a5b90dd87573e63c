//! Shared domain types.
//!
//! These types are intentionally plain data so they can be:
//!
//! - used in-memory during fitting and resampling
//! - handed to reporting/export code without hidden state
//! - serialized into the JSON run summary

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default gas constant (kcal mol⁻¹ K⁻¹).
pub const DEFAULT_GAS_CONSTANT: f64 = 1.9872e-3;

/// Default absolute temperature (K), 22 °C.
pub const DEFAULT_TEMPERATURE: f64 = 273.15 + 22.0;

/// Default scale for inferring uncertainties on 2-column data.
pub const DEFAULT_GUESS_FRACTION: f64 = 0.05;

/// A single `(x, y, weight)` observation.
///
/// `weight` is the standard error of `y`, not an inverse variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

impl Observation {
    pub fn new(x: f64, y: f64, weight: f64) -> Self {
        Self { x, y, weight }
    }
}

/// Column layout a dataset was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    /// `x y`, uncertainty supplied by configuration or inference.
    Two,
    /// `x y err`, uncertainty taken literally.
    Three,
}

impl Arity {
    pub fn columns(self) -> usize {
        match self {
            Arity::Two => 2,
            Arity::Three => 3,
        }
    }
}

/// Ordered observations sharing one column layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    observations: Vec<Observation>,
    arity: Arity,
}

impl DataSet {
    pub fn new(observations: Vec<Observation>, arity: Arity) -> Self {
        Self {
            observations,
            arity,
        }
    }

    /// Build a dataset with the same layout as `self` (used by resamplers).
    pub fn derive(&self, observations: Vec<Observation>) -> Self {
        Self {
            observations,
            arity: self.arity,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Replace every uncertainty with `weight`.
    pub fn with_uniform_weight(&self, weight: f64) -> Self {
        self.derive(
            self.observations
                .iter()
                .map(|o| Observation::new(o.x, o.y, weight))
                .collect(),
        )
    }

    pub fn x_max(&self) -> Option<f64> {
        self.observations.iter().map(|o| o.x).reduce(f64::max)
    }

    /// `(min(y), max(y))`, or `None` for an empty dataset.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        let mut it = self.observations.iter().map(|o| o.y);
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

/// Two-state model parameters.
///
/// - `af`, `bf`: folded baseline `af*x + bf`
/// - `au`, `bu`: unfolded baseline `au*x + bu`
/// - `dg`: unfolding free energy at zero denaturant
/// - `m`: cooperativity (slope of ΔG with denaturant)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub af: f64,
    pub bf: f64,
    pub au: f64,
    pub bu: f64,
    #[serde(rename = "dG")]
    pub dg: f64,
    pub m: f64,
}

impl Params {
    pub const LEN: usize = 6;

    /// Display names, in vector order.
    pub const NAMES: [&'static str; Params::LEN] = ["af", "bf", "au", "bu", "dG", "m"];

    pub fn new(af: f64, bf: f64, au: f64, bu: f64, dg: f64, m: f64) -> Self {
        Self {
            af,
            bf,
            au,
            bu,
            dg,
            m,
        }
    }

    pub fn to_array(self) -> [f64; Params::LEN] {
        [self.af, self.bf, self.au, self.bu, self.dg, self.m]
    }

    pub fn from_array(v: [f64; Params::LEN]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5])
    }

    /// Build from a slice of exactly [`Params::LEN`] values.
    pub fn from_slice(v: &[f64]) -> Option<Self> {
        let arr: [f64; Params::LEN] = v.try_into().ok()?;
        Some(Self::from_array(arr))
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.to_array().get(idx).copied()
    }

    /// Same free-energy terms with baselines pinned to `ff = 1 → y = 1`, `fu = 1 → y = 0`.
    pub fn normalized(&self) -> Self {
        Self::new(0.0, 1.0, 0.0, 0.0, self.dg, self.m)
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Outcome of one optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub params: Params,
    /// Objective value at `params`.
    pub chi_sqr: f64,
    /// `false` when the optimizer stopped without meeting its tolerances.
    pub success: bool,
    pub iterations: usize,
    pub evaluations: usize,
    pub message: String,
}

/// Successful bootstrap fits plus the number of discarded attempts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BootstrapEnsemble {
    pub samples: Vec<Params>,
    pub failures: usize,
}

impl BootstrapEnsemble {
    pub fn accepted(&self) -> usize {
        self.samples.len()
    }

    /// Share of attempts that failed, in `[0, 1]`.
    pub fn failure_rate(&self) -> f64 {
        let attempts = self.samples.len() + self.failures;
        if attempts == 0 {
            0.0
        } else {
            self.failures as f64 / attempts as f64
        }
    }

    /// Values of parameter `idx` across the ensemble, in sample order.
    pub fn column(&self, idx: usize) -> Vec<f64> {
        self.samples.iter().filter_map(|p| p.get(idx)).collect()
    }
}

/// Bootstrap summary for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterStatistic {
    pub name: String,
    pub best: f64,
    pub mean: f64,
    pub stddev: f64,
    /// `|stddev / best| * 100`; `None` when `best == 0`.
    pub percent_error: Option<f64>,
    pub p5: f64,
    pub p95: f64,
}

/// Bootstrap resampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResampleMethod {
    /// Draw observations with replacement.
    Cases,
    /// Perturb each `y` by its own uncertainty.
    Residuals,
}

/// How uncertainties are assigned while loading.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Flat uncertainty for 2-column rows.
    pub fixed_err: Option<f64>,
    /// Uncertainty as a fraction of `|y|` for 2-column rows (wins over `fixed_err`).
    pub frac_err: Option<f64>,
    /// Inference scale used when neither of the above is set.
    pub guess: f64,
    /// Override every uncertainty after loading.
    pub reset_err: Option<f64>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            fixed_err: None,
            frac_err: None,
            guess: DEFAULT_GUESS_FRACTION,
            reset_err: None,
        }
    }
}

/// Bootstrap engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapConfig {
    /// Number of accepted fits to collect.
    pub target_count: usize,
    pub seed: u64,
    pub method: ResampleMethod,
    /// Consecutive failed attempts tolerated per sample slot.
    pub max_attempts_per_sample: usize,
    /// Surface failed-fit diagnostics at `warn` level.
    pub verbose: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            target_count: 100,
            seed: 42,
            method: ResampleMethod::Cases,
            max_attempts_per_sample: 1000,
            verbose: false,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub data_path: PathBuf,
    pub load: LoadOptions,
    pub gas_constant: f64,
    pub temperature: f64,
    pub initial_guess: Params,
    pub xatol: f64,
    pub fatol: f64,
    /// `None` means `200 * Params::LEN`.
    pub max_iters: Option<usize>,
    pub bootstrap: BootstrapConfig,
    pub histogram_bins: usize,
    /// Directory for text/JSON artifacts; `None` disables export.
    pub output_dir: Option<PathBuf>,
}
