//! Two-state unfolding model.
//!
//! The observed signal is a population-weighted mix of two linear baselines:
//!
//! ```text
//! ΔG(x) = dG - m*x
//! K     = exp(-ΔG(x) / RT)
//! y(x)  = (af*x + bf) * ff + (au*x + bu) * fu
//! ```
//!
//! `RT` is fixed when the model is built so models at different temperatures
//! can coexist.

use crate::domain::{DEFAULT_GAS_CONSTANT, DEFAULT_TEMPERATURE, DataSet, Params};
use crate::error::AppError;
use crate::math::two_state_fractions;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Model {
    rt: f64,
}

impl Model {
    /// Build a model from the gas constant and absolute temperature.
    pub fn new(gas_constant: f64, temperature: f64) -> Result<Self, AppError> {
        let rt = gas_constant * temperature;
        if !(rt.is_finite() && rt > 0.0) {
            return Err(AppError::config(format!(
                "Invalid thermal energy: R={gas_constant}, T={temperature} (R*T must be finite and > 0)."
            )));
        }
        Ok(Self { rt })
    }

    pub fn rt(&self) -> f64 {
        self.rt
    }

    /// Predicted signal at `x`.
    pub fn evaluate(&self, x: f64, p: &Params) -> f64 {
        let dg = p.dg - p.m * x;
        let (ff, fu) = two_state_fractions(-dg / self.rt);
        (p.af * x + p.bf) * ff + (p.au * x + p.bu) * fu
    }

    /// Weighted chi-square `Σ ((y - y(x)) / w)^2`.
    pub fn objective(&self, p: &Params, data: &DataSet) -> f64 {
        data.iter()
            .map(|o| {
                let r = (o.y - self.evaluate(o.x, p)) / o.weight;
                r * r
            })
            .sum()
    }

    /// Residuals `y - y(x)` in dataset order.
    pub fn residuals(&self, p: &Params, data: &DataSet) -> Vec<f64> {
        data.iter().map(|o| o.y - self.evaluate(o.x, p)).collect()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self {
            rt: DEFAULT_GAS_CONSTANT * DEFAULT_TEMPERATURE,
        }
    }
}
