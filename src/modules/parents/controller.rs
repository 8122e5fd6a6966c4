use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use matricula_core::AppError;
use matricula_models::{ParentId, StudentId};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::parents::model::{ChildAttendance, ChildGrades};
use crate::modules::parents::service::ParentService;
use crate::modules::students::model::Student;
use crate::state::AppState;

fn parent_id(auth_user: &AuthUser) -> Result<ParentId, AppError> {
    Ok(ParentId::from_uuid(auth_user.subject()?))
}

/// Active children of the signed-in parent
#[utoipa::path(
    get,
    path = "/api/parents/children",
    responses(
        (status = 200, description = "Linked active students", body = Vec<Student>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - parents only", body = ErrorResponse),
        (status = 404, description = "Parent account no longer exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Parents"
)]
#[instrument(skip(state))]
pub async fn get_children(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Student>>, AppError> {
    let children = ParentService::children(state.store.as_ref(), parent_id(&auth_user)?).await?;
    Ok(Json(children))
}

#[utoipa::path(
    get,
    path = "/api/parents/children/{id}/attendance",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Attendance of the child", body = ChildAttendance),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not one of the parent's children", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Parents"
)]
#[instrument(skip(state))]
pub async fn get_child_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
) -> Result<Json<ChildAttendance>, AppError> {
    let child = ParentService::child(state.store.as_ref(), parent_id(&auth_user)?, id).await?;
    Ok(Json(child.into()))
}

#[utoipa::path(
    get,
    path = "/api/parents/children/{id}/grades",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Marks of the child", body = ChildGrades),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not one of the parent's children", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Parents"
)]
#[instrument(skip(state))]
pub async fn get_child_grades(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
) -> Result<Json<ChildGrades>, AppError> {
    let child = ParentService::child(state.store.as_ref(), parent_id(&auth_user)?, id).await?;
    Ok(Json(child.into()))
}
