//! Admission models and DTOs.
//!
//! Re-exports the shared admission models from `matricula-models` and adds
//! the types only the HTTP layer needs.

pub use matricula_models::admissions::*;

use serde::Serialize;
use utoipa::ToSchema;

/// How an application was approved, used for the metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMode {
    Simple,
    Full,
}

impl ApprovalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalMode::Simple => "simple",
            ApprovalMode::Full => "full",
        }
    }
}
