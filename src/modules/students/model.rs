//! Student data models and DTOs.
//!
//! Re-exports the student models from the `matricula-models` crate.

pub use matricula_models::students::*;
