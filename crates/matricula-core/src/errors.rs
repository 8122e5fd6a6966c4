//! HTTP-facing application error.
//!
//! Every handler returns `Result<_, AppError>`. The response body always
//! carries `error`; validation and conflict failures add `errors`, a list of
//! `{field, message}` pairs, and state conflicts add the current `status` of
//! the resource.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Dotted path of the field, e.g. `parentInfo.email`
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub details: Vec<FieldError>,
    pub resource_status: Option<String>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            details: Vec::new(),
            resource_status: None,
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, Error::msg(msg.into()))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, Error::msg(msg.into()))
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, Error::msg(msg.into()))
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, Error::msg(msg.into()))
    }

    pub fn too_many_requests(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, Error::msg(msg.into()))
    }

    /// 400 carrying every rejected field at once.
    pub fn validation(details: Vec<FieldError>) -> Self {
        Self::bad_request(Error::msg("Validation failed")).with_details(details)
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = details;
        self
    }

    pub fn with_resource_status(mut self, status: impl Into<String>) -> Self {
        self.resource_status = Some(status.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = ?self.error, "Request failed");
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let mut body = json!({ "error": message });
        if !self.details.is_empty() {
            body["errors"] = json!(self.details);
        }
        if let Some(status) = self.resource_status {
            body["status"] = json!(status);
        }

        (self.status, Json(body)).into_response()
    }
}

/// Flattens `validator` errors into field errors with camelCase dotted paths,
/// ordered by field so responses are stable.
///
/// `class_name` is reported as `class`, its name on the wire.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_field_errors(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect_field_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            to_camel_case(field)
        } else {
            format!("{}.{}", prefix, to_camel_case(field))
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", path));
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

fn to_camel_case(field: &str) -> String {
    if field == "class_name" || field == "className" {
        return "class".to_string();
    }
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Credentials {
        #[validate(length(min = 6, message = "Student password must be at least 6 characters"))]
        student_password: String,
        #[validate(length(min = 1, message = "Roll number is required"))]
        roll_number: String,
    }

    #[test]
    fn test_field_errors_are_camel_cased_and_sorted() {
        let input = Credentials {
            student_password: "abc".to_string(),
            roll_number: String::new(),
        };
        let errors = input.validate().unwrap_err();
        let details = field_errors(&errors);

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field, "rollNumber");
        assert_eq!(details[0].message, "Roll number is required");
        assert_eq!(details[1].field, "studentPassword");
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("zip_code"), "zipCode");
        assert_eq!(to_camel_case("email"), "email");
        assert_eq!(to_camel_case("class_name"), "class");
    }

    #[test]
    fn test_validation_error_status() {
        let err = AppError::validation(vec![FieldError::new("class", "Class is required")]);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.details.len(), 1);
    }

    #[test]
    fn test_conflict_carries_resource_status() {
        let err = AppError::conflict("Application already approved").with_resource_status("approved");
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.resource_status.as_deref(), Some("approved"));
    }
}
