use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use matricula_core::AppError;
use matricula_models::{ApplicationId, StaffId};

use super::model::{
    AdmissionApplication, ApplicationInput, ApproveFullDto, FullApprovalResponse, RejectDto,
    ReviewDto, SubmitApplicationResponse,
};
use super::service::AdmissionService;
use crate::middleware::auth::AdminUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

fn reviewer(admin: &AdminUser) -> Result<Option<StaffId>, AppError> {
    Ok(Some(StaffId::from_uuid(admin.0.subject()?)))
}

/// Submit an admission application
#[utoipa::path(
    post,
    path = "/api/admission/apply",
    request_body = ApplicationInput,
    responses(
        (status = 201, description = "Application received", body = SubmitApplicationResponse),
        (status = 400, description = "Validation failed, every offending field listed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admissions"
)]
#[instrument(skip(state, input))]
pub async fn submit_application(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ApplicationInput>,
) -> Result<(StatusCode, Json<SubmitApplicationResponse>), AppError> {
    let response = AdmissionService::submit(&state, input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/admission/applications",
    responses(
        (status = 200, description = "Applications, newest first", body = Vec<AdmissionApplication>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - staff only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admissions"
)]
#[instrument(skip(state))]
pub async fn list_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdmissionApplication>>, AppError> {
    let applications = AdmissionService::list_applications(state.store.as_ref()).await?;
    Ok(Json(applications))
}

#[utoipa::path(
    get,
    path = "/api/admission/applications/{id}",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application details", body = AdmissionApplication),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - staff only", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admissions"
)]
#[instrument(skip(state))]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<AdmissionApplication>, AppError> {
    let application = AdmissionService::get_application(state.store.as_ref(), id).await?;
    Ok(Json(application))
}

/// Approve an application without creating accounts
#[utoipa::path(
    post,
    path = "/api/admission/applications/{id}/approve",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application approved", body = AdmissionApplication),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Already approved or rejected", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admissions"
)]
#[instrument(skip(state))]
pub async fn approve_application(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<ApplicationId>,
) -> Result<Json<AdmissionApplication>, AppError> {
    let application = AdmissionService::approve(&state, id, reviewer(&admin)?).await?;
    Ok(Json(application))
}

/// Approve an application and create the student and parent accounts
#[utoipa::path(
    post,
    path = "/api/admission/applications/{id}/approve-full",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    request_body = ApproveFullDto,
    responses(
        (status = 200, description = "Application approved and accounts provisioned", body = FullApprovalResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Roll number taken, or accounts already provisioned", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admissions"
)]
#[instrument(skip(state, dto))]
pub async fn approve_application_full(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<ApplicationId>,
    ValidatedJson(dto): ValidatedJson<ApproveFullDto>,
) -> Result<Json<FullApprovalResponse>, AppError> {
    let response = AdmissionService::approve_full(&state, id, reviewer(&admin)?, dto).await?;
    Ok(Json(response))
}

/// Mark a pending application as under review
#[utoipa::path(
    post,
    path = "/api/admission/applications/{id}/review",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    request_body = ReviewDto,
    responses(
        (status = 200, description = "Application under review", body = AdmissionApplication),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Application is no longer pending", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admissions"
)]
#[instrument(skip(state, dto))]
pub async fn review_application(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<ApplicationId>,
    ValidatedJson(dto): ValidatedJson<ReviewDto>,
) -> Result<Json<AdmissionApplication>, AppError> {
    let application =
        AdmissionService::mark_under_review(&state, id, reviewer(&admin)?, dto).await?;
    Ok(Json(application))
}

#[utoipa::path(
    post,
    path = "/api/admission/applications/{id}/reject",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    request_body = RejectDto,
    responses(
        (status = 200, description = "Application rejected", body = AdmissionApplication),
        (status = 400, description = "Remarks missing", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Already approved or rejected", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admissions"
)]
#[instrument(skip(state, dto))]
pub async fn reject_application(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<ApplicationId>,
    ValidatedJson(dto): ValidatedJson<RejectDto>,
) -> Result<Json<AdmissionApplication>, AppError> {
    let application = AdmissionService::reject(&state, id, reviewer(&admin)?, dto).await?;
    Ok(Json(application))
}
