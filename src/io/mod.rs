//! Input/output helpers.
//!
//! - text dataset ingest + uncertainty assignment (`ingest`)
//! - text artifact exports (`export`)
//! - JSON run summary read/write (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
