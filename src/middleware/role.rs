//! Role gates for Axum routers.
//!
//! Read access to admissions and students is open to staff (admins and
//! teachers). Mutating handlers additionally take [`AdminUser`]. The parent
//! and student portals each admit only their own role.
//!
//! [`AdminUser`]: crate::middleware::auth::AdminUser

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use matricula_core::AppError;
use matricula_models::auth::Role;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub const STAFF_ROLES: &[Role] = &[Role::Admin, Role::Teacher];

/// Rejects the request unless the bearer token carries one of `allowed_roles`.
/// The verified [`AuthUser`] is stored in the request extensions.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &[Role],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if !auth_user.has_any_role(allowed_roles) {
        return Err(AppError::forbidden(format!(
            "Access denied for role {}",
            auth_user.role()
        )));
    }

    parts.extensions.insert(auth_user);
    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Admins and teachers.
pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, STAFF_ROLES).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_parent(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, &[Role::Parent]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_student(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, &[Role::Student]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
