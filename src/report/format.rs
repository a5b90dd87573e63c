//! Text formatting for terminal output and exported tables.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{BootstrapEnsemble, FitResult, ParameterStatistic, Params};
use crate::report::FitDiagnostics;

/// Format like C's `%{width}.{precision}e` (`1.23450e+00`, exponent at least two digits).
pub fn sci(value: f64, width: usize, precision: usize) -> String {
    let body = if value.is_finite() {
        let raw = format!("{value:.precision$e}");
        match raw.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exp),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => raw,
        }
    } else {
        format!("{value}")
    };
    format!("{body:>width$}")
}

/// The `%13.5e` field used throughout exported text files.
pub fn sci13(value: f64) -> String {
    sci(value, 13, 5)
}

fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:8.2}%"),
        None => format!("{:>9}", "undefined"),
    }
}

/// Column header for the parameter table.
pub fn summary_header() -> String {
    format!(
        "{:>5} {:<13} {:<13} {:<13} {:<9} {:<13} {:<13}",
        "var", "best", "avg", "stddev", "pcterr", "5%", "95%"
    )
}

/// One parameter row, aligned with [`summary_header`].
pub fn summary_row(s: &ParameterStatistic) -> String {
    format!(
        "{:>5} {:13.6} {:13.6} {:13.6} {} {:13.6} {:13.6}",
        s.name,
        s.best,
        s.mean,
        s.stddev,
        pct(s.percent_error),
        s.p5,
        s.p95
    )
}

pub fn format_summary_table(stats: &[ParameterStatistic]) -> String {
    let mut out = summary_header();
    out.push('\n');
    for s in stats {
        out.push_str(&summary_row(s));
        out.push('\n');
    }
    out
}

pub fn format_params(p: &Params) -> String {
    Params::NAMES
        .iter()
        .zip(p.to_array())
        .map(|(name, v)| format!("{name}={v:.6}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Initial-fit report: optimizer status and chi-square diagnostics.
pub fn format_fit_report(fit: &FitResult, diag: &FitDiagnostics) -> String {
    let mut out = String::new();
    out.push_str("* Initial fit\n");
    out.push_str(&format!(
        "  - Optimizer: {} ({} iterations, {} evaluations)\n",
        fit.message, fit.iterations, fit.evaluations
    ));
    out.push_str(&format!("  - Success: {}\n", fit.success));
    out.push_str(&format!("  - Parameters: {}\n", format_params(&fit.params)));
    out.push_str(&format!("  - Initial chi-sqr: {:.3}\n", diag.initial_chi_sqr));
    out.push_str(&format!("  - Final   chi-sqr: {:.3}\n", diag.final_chi_sqr));
    out.push_str(&format!("  - Deg. of Freedom: {}\n", diag.ndof));
    match diag.reduced_chi_sqr {
        Some(v) => out.push_str(&format!("  - Reduced chi-sqr: {v:.3}\n")),
        None => out.push_str("  - Reduced chi-sqr: undefined\n"),
    }
    out
}

/// Bootstrap summary: sample/failure counts plus the parameter table.
pub fn format_bootstrap_report(ensemble: &BootstrapEnsemble, stats: &[ParameterStatistic]) -> String {
    let mut out = String::new();
    out.push_str(&format!("* Bootstrap ({} samples)\n", ensemble.accepted()));
    out.push_str(&format!(
        "  - Failed fits: {} ({:.1}%)\n",
        ensemble.failures,
        100.0 * ensemble.failure_rate()
    ));
    out.push_str("\n* Summary of parameters:\n");
    out.push_str(&format_summary_table(stats));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sci_matches_c_layout() {
        assert_eq!(sci13(1.0), "  1.00000e+00");
        assert_eq!(sci13(-0.00123456), " -1.23456e-03");
        assert_eq!(sci13(6.02e23), "  6.02000e+23");
        assert_eq!(sci13(0.0), "  0.00000e+00");
        assert_eq!(sci(1.5e-100, 0, 2), "1.50e-100");
    }

    #[test]
    fn undefined_percent_error_is_explicit() {
        let s = ParameterStatistic {
            name: "af".to_string(),
            best: 0.0,
            mean: 0.1,
            stddev: 0.2,
            percent_error: None,
            p5: -0.2,
            p95: 0.4,
        };
        let row = summary_row(&s);
        assert!(row.contains("undefined"));
        assert!(row.trim_start().starts_with("af"));
    }
}
