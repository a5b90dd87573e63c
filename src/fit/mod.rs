//! Fitting orchestration.
//!
//! Responsibilities:
//!
//! - minimize the chi-square objective from an initial guess (`simplex`, `fitter`)
//! - generate randomized dataset variants (`resample`)
//! - collect an ensemble of bootstrap refits (parallel, `bootstrap`)

pub mod bootstrap;
pub mod fitter;
pub mod resample;
pub mod simplex;

pub use bootstrap::*;
pub use fitter::*;
pub use resample::*;
pub use simplex::*;
