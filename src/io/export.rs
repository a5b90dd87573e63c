//! Text artifact exports.
//!
//! Every file is whitespace-delimited with `%13.5e` numbers so the outputs can
//! be fed straight back into plotting tools (or this crate's own loader).
//! All writes happen after the bootstrap ensemble is final.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::{BootstrapEnsemble, Observation, ParameterStatistic, Params};
use crate::error::AppError;
use crate::math::Histogram;
use crate::report::{CurvePoint, ResidualPoint, sci13, summary_header, summary_row};

pub const FIT_CURVE_FILE: &str = "fit_curve.txt";
pub const RESIDUALS_FILE: &str = "residuals.txt";
pub const TRANS_DATA_FILE: &str = "trans_data.txt";
pub const TRANS_CURVE_FILE: &str = "trans_curve.txt";
pub const PAR_SUMMARY_FILE: &str = "par_summary.txt";

fn create(path: &Path) -> Result<BufWriter<File>, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", path.display())))?;
    Ok(BufWriter::new(file))
}

fn write_lines<I>(path: &Path, lines: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = String>,
{
    let mut w = create(path)?;
    let fail = |e: std::io::Error| AppError::io(format!("Failed to write '{}': {e}", path.display()));
    for line in lines {
        writeln!(w, "{line}").map_err(fail)?;
    }
    w.flush().map_err(fail)
}

/// `x y` pairs of a sampled curve.
pub fn write_curve(path: &Path, curve: &[CurvePoint]) -> Result<(), AppError> {
    write_lines(path, curve.iter().map(|c| format!("{} {}", sci13(c.x), sci13(c.y))))
}

/// `x residual weight` triples.
pub fn write_residuals(path: &Path, residuals: &[ResidualPoint]) -> Result<(), AppError> {
    write_lines(
        path,
        residuals
            .iter()
            .map(|r| format!("{} {} {}", sci13(r.x), sci13(r.residual), sci13(r.weight))),
    )
}

/// `x y weight` triples (3-column loader format).
pub fn write_points(path: &Path, points: &[Observation]) -> Result<(), AppError> {
    write_lines(
        path,
        points
            .iter()
            .map(|o| format!("{} {} {}", sci13(o.x), sci13(o.y), sci13(o.weight))),
    )
}

/// Parameter table with a `#`-commented header.
pub fn write_parameter_summary(path: &Path, stats: &[ParameterStatistic]) -> Result<(), AppError> {
    let header = format!("# {}", summary_header());
    write_lines(path, std::iter::once(header).chain(stats.iter().map(summary_row)))
}

/// One bootstrap value per line, in sample order.
pub fn write_parameter_values(path: &Path, values: &[f64]) -> Result<(), AppError> {
    write_lines(path, values.iter().map(|v| sci13(*v)))
}

/// `lower upper count` per bin.
pub fn write_histogram(path: &Path, hist: &Histogram) -> Result<(), AppError> {
    write_lines(
        path,
        std::iter::once("# lower upper count".to_string()).chain(
            hist.edges
                .windows(2)
                .zip(&hist.counts)
                .map(|(edge, count)| format!("{} {} {count}", sci13(edge[0]), sci13(edge[1]))),
        ),
    )
}

/// Write per-parameter value lists and histograms; returns the files written.
pub fn write_parameter_columns(
    dir: &Path,
    ensemble: &BootstrapEnsemble,
    histograms: &[(&str, Option<Histogram>)],
) -> Result<Vec<PathBuf>, AppError> {
    let mut written = Vec::new();
    for (idx, name) in Params::NAMES.iter().enumerate() {
        let path = dir.join(format!("par_{name}_list.txt"));
        write_parameter_values(&path, &ensemble.column(idx))?;
        written.push(path);
    }
    for (name, hist) in histograms {
        let Some(hist) = hist else {
            log::warn!("no finite bootstrap values for {name}; histogram skipped");
            continue;
        };
        let path = dir.join(format!("par_{name}_histogram.txt"));
        write_histogram(&path, hist)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Arity, DataSet, LoadOptions};

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("unfold-export-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn exported_points_reload_through_ingest() {
        let dir = temp_dir("points");
        let path = dir.join(TRANS_DATA_FILE);
        let points = vec![Observation::new(0.5, 1.25, 0.125), Observation::new(1.0, 0.75, 0.0625)];
        write_points(&path, &points).unwrap();

        let data = crate::io::load_dataset(&path, &LoadOptions::default()).unwrap();
        assert_eq!(data, DataSet::new(points, Arity::Three));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn histogram_file_has_one_line_per_bin() {
        let dir = temp_dir("hist");
        let path = dir.join("h.txt");
        let hist = crate::math::histogram(&[0.0, 1.0, 2.0, 3.0], 4).unwrap();
        write_histogram(&path, &hist).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert!(text.lines().nth(1).unwrap().ends_with(" 1"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
