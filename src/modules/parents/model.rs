//! Parent data models.
//!
//! Re-exports the parent models from the `matricula-models` crate.

pub use matricula_models::parents::*;
