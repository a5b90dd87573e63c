//! Descriptive statistics over bootstrap columns.
//!
//! Percentiles use the nearest-rank rule on an ascending sort: the `p`
//! percentile is the element at 0-based index `floor(p * n)`, clamped to the
//! last element. No interpolation is performed, so the result is always one of
//! the observed values. This differs from the linear-interpolation (R-7)
//! default of most numeric libraries.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (`n - 1` denominator). `None` when `n <= 1`.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() <= 1 {
        return None;
    }
    let avg = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    Some((ss / (values.len() as f64 - 1.0)).sqrt())
}

/// Sort ascending; NaNs go last.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan())));
    out
}

/// Nearest-rank percentile of an ascending-sorted slice; `p` in `[0, 1]`.
pub fn nearest_rank(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let idx = ((p * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    Some(sorted[idx])
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `bins + 1` ascending bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Bin `values` into `bins` equal-width bins spanning `[min, max]`.
///
/// The last bin is closed on the right so the maximum is counted. When every
/// value is identical the range is widened to `value ± 0.5`.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return None;
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi.partial_cmp(&lo) != Some(Ordering::Greater) {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Some(Histogram { edges, counts })
}
