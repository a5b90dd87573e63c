//! Whitespace-delimited text ingest.
//!
//! This module turns `x y [err]` text into a [`DataSet`] of observations whose
//! uncertainties are all strictly positive.
//!
//! Loading happens in two explicit phases:
//! 1. **parse**: tokenize every data line, recording `(x, y, Option<err>)`
//! 2. **backfill**: assign uncertainties to 2-column rows once the whole file
//!    has been seen (inference needs `min |y|` over all rows)
//!
//! Any malformed line aborts the load; no partial dataset is returned.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::domain::{Arity, DataSet, LoadOptions, Observation};
use crate::error::AppError;

/// Comment marker, both for whole lines and trailing content.
const COMMENT: char = '#';

/// A parsed data line before uncertainty assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RawRow {
    line: usize,
    x: f64,
    y: f64,
    err: Option<f64>,
}

/// Load a dataset from a file on disk.
pub fn load_dataset(path: &Path, opts: &LoadOptions) -> Result<DataSet, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open data file '{}': {e}", path.display())))?;
    let data = load_from_reader(BufReader::new(file), opts)?;

    log::info!(
        "loaded {} observations ({}-column) from {}",
        data.len(),
        data.arity().columns(),
        path.display()
    );
    Ok(data)
}

/// Load a dataset from any buffered reader.
pub fn load_from_reader<R: BufRead>(reader: R, opts: &LoadOptions) -> Result<DataSet, AppError> {
    let lines = reader
        .lines()
        .collect::<Result<Vec<String>, _>>()
        .map_err(|e| AppError::io(format!("Failed to read data: {e}")))?;
    parse_lines(&lines, opts)
}

/// Parse already-split lines into a dataset.
pub fn parse_lines<S: AsRef<str>>(lines: &[S], opts: &LoadOptions) -> Result<DataSet, AppError> {
    validate_options(opts)?;

    let rows = parse_rows(lines)?;
    let arity = resolve_arity(&rows)?;

    let observations = match arity {
        Arity::Three => rows
            .iter()
            .map(|r| Observation::new(r.x, r.y, r.err.unwrap_or_default()))
            .collect(),
        Arity::Two => backfill_uncertainties(&rows, opts)?,
    };

    let data = DataSet::new(observations, arity);
    Ok(match opts.reset_err {
        Some(w) => data.with_uniform_weight(w),
        None => data,
    })
}

fn validate_options(opts: &LoadOptions) -> Result<(), AppError> {
    let positive = |v: f64| v.is_finite() && v > 0.0;

    if let Some(v) = opts.fixed_err {
        if !positive(v) {
            return Err(AppError::config(format!("fixed_err must be finite and > 0 (got {v}).")));
        }
    }
    if let Some(v) = opts.frac_err {
        if !positive(v) {
            return Err(AppError::config(format!("frac_err must be finite and > 0 (got {v}).")));
        }
    }
    if !positive(opts.guess) {
        return Err(AppError::config(format!("guess must be finite and > 0 (got {}).", opts.guess)));
    }
    if let Some(v) = opts.reset_err {
        if !positive(v) {
            return Err(AppError::config(format!("reset_err must be finite and > 0 (got {v}).")));
        }
    }
    Ok(())
}

fn parse_rows<S: AsRef<str>>(lines: &[S]) -> Result<Vec<RawRow>, AppError> {
    let mut rows = Vec::new();

    for (idx, raw) in lines.iter().enumerate() {
        let line = idx + 1;
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT) {
            continue;
        }

        let content = trimmed.split(COMMENT).next().unwrap_or_default();
        let tokens: Vec<&str> = content.split_whitespace().collect();

        let row = match tokens.as_slice() {
            [x, y] => RawRow {
                line,
                x: parse_number(x, line)?,
                y: parse_number(y, line)?,
                err: None,
            },
            [x, y, err] => RawRow {
                line,
                x: parse_number(x, line)?,
                y: parse_number(y, line)?,
                err: Some(parse_number(err, line)?),
            },
            _ => {
                return Err(AppError::format(format!(
                    "Line {line}: expected 2 or 3 columns, found {}.",
                    tokens.len()
                )));
            }
        };
        rows.push(row);
    }

    Ok(rows)
}

fn parse_number(token: &str, line: usize) -> Result<f64, AppError> {
    let v: f64 = token
        .parse()
        .map_err(|_| AppError::format(format!("Line {line}: '{token}' is not a number.")))?;
    if !v.is_finite() {
        return Err(AppError::format(format!("Line {line}: '{token}' is not finite.")));
    }
    Ok(v)
}

fn resolve_arity(rows: &[RawRow]) -> Result<Arity, AppError> {
    let Some(first) = rows.first() else {
        return Err(AppError::format("No observations found in input."));
    };

    let arity_of = |r: &RawRow| if r.err.is_some() { Arity::Three } else { Arity::Two };
    let expected = arity_of(first);

    if let Some(bad) = rows.iter().find(|r| arity_of(r) != expected) {
        return Err(AppError::format(format!(
            "Line {}: mixed column counts ({} vs {} established at line {}).",
            bad.line,
            arity_of(bad).columns(),
            expected.columns(),
            first.line
        )));
    }

    if expected == Arity::Three {
        if let Some(bad) = rows.iter().find(|r| r.err.is_some_and(|e| e <= 0.0)) {
            return Err(AppError::format(format!(
                "Line {}: uncertainty must be > 0.",
                bad.line
            )));
        }
    }

    Ok(expected)
}

/// Second phase for 2-column data: assign every row an uncertainty.
///
/// Precedence: `frac_err`, then `fixed_err`, then inference from
/// `guess * min |y|`. A `y` of exactly zero would produce a zero uncertainty
/// under `frac_err` or inference, so the minimum is taken over non-zero `|y|`
/// and zero-`y` rows under `frac_err` receive `frac_err * min |y|`.
fn backfill_uncertainties(rows: &[RawRow], opts: &LoadOptions) -> Result<Vec<Observation>, AppError> {
    if let (Some(frac), Some(_)) = (opts.frac_err, opts.fixed_err) {
        log::warn!("both frac_err and fixed_err set; using frac_err={frac}");
    }

    let min_abs_y = min_nonzero_abs_y(rows);
    let zero_rows = rows.iter().filter(|r| r.y == 0.0).count();

    let floor = |scale: f64, what: &str| -> Result<f64, AppError> {
        let min = min_abs_y.ok_or_else(|| {
            AppError::format(format!("Cannot derive {what} uncertainties: every y value is zero."))
        })?;
        Ok(scale * min)
    };

    if let Some(frac) = opts.frac_err {
        let zero_fill = if zero_rows > 0 {
            let w = floor(frac, "fractional")?;
            log::warn!("{zero_rows} row(s) with y = 0 given uncertainty {w:.5e} (frac_err * min |y|)");
            w
        } else {
            0.0
        };
        return Ok(rows
            .iter()
            .map(|r| {
                let w = (frac * r.y).abs();
                Observation::new(r.x, r.y, if w > 0.0 { w } else { zero_fill })
            })
            .collect());
    }

    if let Some(fixed) = opts.fixed_err {
        return Ok(rows.iter().map(|r| Observation::new(r.x, r.y, fixed)).collect());
    }

    let guessed = floor(opts.guess, "inferred")?;
    if zero_rows > 0 {
        log::warn!("ignored {zero_rows} row(s) with y = 0 when inferring uncertainty");
    }
    log::info!("inferred uncertainty {guessed:.5e} (guess={} * min |y|)", opts.guess);

    Ok(rows.iter().map(|r| Observation::new(r.x, r.y, guessed)).collect())
}

fn min_nonzero_abs_y(rows: &[RawRow]) -> Option<f64> {
    rows.iter()
        .map(|r| r.y.abs())
        .filter(|v| *v > 0.0)
        .reduce(f64::min)
}

/// Render a dataset in the 3-column input format.
///
/// Values use Rust's shortest round-trip representation, so reloading the
/// output reproduces every field exactly.
pub fn format_dataset(data: &DataSet) -> String {
    let mut out = String::new();
    out.push_str("# x y err\n");
    for o in data {
        out.push_str(&format!("{} {} {}\n", o.x, o.y, o.weight));
    }
    out
}
