use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::role::Role;

/// JWT claims for access tokens.
///
/// `sub` is the id of the principal inside the collection named by `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}
