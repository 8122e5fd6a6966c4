use axum::{Json, extract::State};
use tracing::instrument;

use matricula_core::AppError;
use matricula_models::SchoolStatistics;

use crate::middleware::auth::AdminUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::dashboard::service::DashboardService;
use crate::state::AppState;

/// Student, staff and parent counts
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Current head counts", body = SchoolStatistics),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_statistics(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<SchoolStatistics>, AppError> {
    let stats = DashboardService::statistics(state.store.as_ref()).await?;
    Ok(Json(stats))
}
