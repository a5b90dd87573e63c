//! Two-state unfolding model implementation.
//!
//! The model is a small value type (`RT` only) so fitting and resampling code
//! can share it freely across threads.

pub mod model;

pub use model::*;
