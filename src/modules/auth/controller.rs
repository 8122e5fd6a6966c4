use axum::{Json, extract::State};
use tracing::instrument;
use utoipa::ToSchema;

use matricula_core::{AppError, FieldError};

use super::model::{IdentityProfile, LoginRequest, LoginResponse};
use super::service::AuthService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Error body shared by every endpoint.
#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Offending fields, for validation failures and duplicates
    pub errors: Option<Vec<FieldError>>,
    /// Current application status, for refused review actions
    pub status: Option<String>,
}

/// Login as an admin, teacher, student or parent
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 429, description = "Too many login attempts", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state, dto).await?;
    Ok(Json(response))
}

/// Profile of the signed-in account
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current identity", body = IdentityProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<IdentityProfile>, AppError> {
    let profile =
        AuthService::profile(state.store.as_ref(), auth_user.subject()?, auth_user.role()).await?;
    Ok(Json(profile))
}
