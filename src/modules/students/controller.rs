use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;

use matricula_core::AppError;
use matricula_models::StudentId;

use crate::middleware::auth::{AdminUser, AuthUser};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::enrollment::model::Enrollment;
use crate::modules::students::model::{
    CreateStudentDto, RecordAttendanceDto, RecordMarksDto, Student, UpdateProfileDto,
    UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/admin/students",
    responses(
        (status = 200, description = "All students", body = Vec<Student>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - staff only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, AppError> {
    let students = StudentService::list_students(state.store.as_ref()).await?;
    Ok(Json(students))
}

/// Enroll a student directly, creating or linking the parent account
#[utoipa::path(
    post,
    path = "/api/admin/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student enrolled", body = Enrollment),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 409, description = "Roll or admission number already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment = StudentService::quick_add(&state, dto).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Students with no linked parent account
#[utoipa::path(
    get,
    path = "/api/admin/students/orphans",
    responses(
        (status = 200, description = "Students whose parent link is missing", body = Vec<Student>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - staff only", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_orphan_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<Student>>, AppError> {
    let students = StudentService::list_orphans(state.store.as_ref()).await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/admin/students/{id}",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - staff only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::get_student(state.store.as_ref(), id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/api/admin/students/{id}",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::update_student(state.store.as_ref(), id, dto).await?;
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/admin/students/{id}",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<StudentId>,
) -> Result<Json<serde_json::Value>, AppError> {
    StudentService::delete_student(state.store.as_ref(), id).await?;
    Ok(Json(json!({"message": "Student deleted successfully"})))
}

/// Record a day's attendance
#[utoipa::path(
    post,
    path = "/api/admin/students/{id}/attendance",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    request_body = RecordAttendanceDto,
    responses(
        (status = 200, description = "Attendance recorded and totals recomputed", body = Student),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn record_attendance(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<RecordAttendanceDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::record_attendance(state.store.as_ref(), id, dto).await?;
    Ok(Json(student))
}

/// Record an exam result for a subject
#[utoipa::path(
    post,
    path = "/api/admin/students/{id}/marks",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    request_body = RecordMarksDto,
    responses(
        (status = 200, description = "Marks recorded and grades recomputed", body = Student),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn record_marks(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<RecordMarksDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::record_marks(state.store.as_ref(), id, dto).await?;
    Ok(Json(student))
}

/// Full record of the signed-in student
#[utoipa::path(
    get,
    path = "/api/students/profile",
    responses(
        (status = 200, description = "Own student record", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - students only", body = ErrorResponse),
        (status = 404, description = "Student no longer exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Student>, AppError> {
    let id = StudentId::from_uuid(auth_user.subject()?);
    let student = StudentService::get_student(state.store.as_ref(), id).await?;
    Ok(Json(student))
}

/// Update the signed-in student's phone and address
#[utoipa::path(
    put,
    path = "/api/students/profile",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = Student),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - students only", body = ErrorResponse),
        (status = 404, description = "Student no longer exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<Student>, AppError> {
    let id = StudentId::from_uuid(auth_user.subject()?);
    let student = StudentService::update_profile(state.store.as_ref(), id, dto).await?;
    Ok(Json(student))
}
