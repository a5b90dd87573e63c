//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observations and datasets (`Observation`, `DataSet`)
//! - model parameters and fit outputs (`Params`, `FitResult`)
//! - bootstrap outputs (`BootstrapEnsemble`, `ParameterStatistic`)
//! - run configuration (`LoadOptions`, `BootstrapConfig`, `FitConfig`)

pub mod types;

pub use types::*;
