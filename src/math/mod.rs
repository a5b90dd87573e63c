//! Mathematical utilities: two-state populations and descriptive statistics.

pub mod descriptive;
pub mod populations;

pub use descriptive::*;
pub use populations::*;
