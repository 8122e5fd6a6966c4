//! Login DTOs and the identity profile returned to signed-in users.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use matricula_core::serde::deserialize_trimmed;

pub use matricula_auth::{Claims, Role};

/// Credentials for one identity collection.
///
/// `identifier` is an email for staff, an email or roll number for students,
/// and an email or a child's roll number for parents.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(alias = "email", default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Identifier is required"))]
    #[schema(example = "101")]
    pub identifier: String,
    #[serde(alias = "password", default)]
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "student123")]
    pub secret: String,
    pub role: Role,
}

/// Who a token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
    pub email: String,
    /// Set for students only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    /// Roll numbers of a parent's children
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: IdentityProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_accepts_legacy_field_names() {
        let req: LoginRequest = serde_json::from_str(
            r#"{"email":" admin@nalandaschool.edu ","password":"secret","role":"admin"}"#,
        )
        .unwrap();
        assert_eq!(req.identifier, "admin@nalandaschool.edu");
        assert_eq!(req.secret, "secret");
        assert_eq!(req.role, Role::Admin);
    }

    #[test]
    fn test_login_request_requires_fields() {
        let req: LoginRequest = serde_json::from_str(r#"{"role":"student"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
