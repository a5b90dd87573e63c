//! Read/write the JSON run summary.
//!
//! The summary is the portable record of a run:
//! - the physical constants and options used
//! - the initial fit and its diagnostics
//! - bootstrap counts and per-parameter statistics

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FitResult, ParameterStatistic, ResampleMethod};
use crate::error::AppError;
use crate::report::FitDiagnostics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub data_file: String,
    pub gas_constant: f64,
    pub temperature: f64,
    pub n_points: usize,
    pub fit: FitResult,
    pub diagnostics: FitDiagnostics,
    pub bootstrap: BootstrapSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSummary {
    pub method: ResampleMethod,
    pub seed: u64,
    pub accepted: usize,
    pub failures: usize,
    pub parameters: Vec<ParameterStatistic>,
}

pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::io(format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}

pub fn read_summary_json(path: &Path) -> Result<RunSummary, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open summary JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::format(format!("Invalid summary JSON: {e}")))
}
