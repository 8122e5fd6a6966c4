use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    approve_application, approve_application_full, get_application, list_applications,
    reject_application, review_application, submit_application,
};

/// Public submission endpoint.
pub fn init_admissions_router() -> Router<AppState> {
    Router::new().route("/apply", post(submit_application))
}

/// Review endpoints. Mounted behind the staff gate.
pub fn init_applications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_applications))
        .route("/{id}", get(get_application))
        .route("/{id}/approve", post(approve_application))
        .route("/{id}/approve-full", post(approve_application_full))
        .route("/{id}/review", post(review_application))
        .route("/{id}/reject", post(reject_application))
}
