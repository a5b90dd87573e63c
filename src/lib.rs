//! `unfold-fit` library crate.
//!
//! Fits a two-state equilibrium unfolding model to `(x, y, err)` data and
//! estimates parameter uncertainties by bootstrap resampling.
//!
//! The binary (`unfold`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the model, fitter, and bootstrap engine are reusable from other tools

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
