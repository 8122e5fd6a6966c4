use crate::modules::students::controller::{
    create_student, delete_student, get_orphan_students, get_profile, get_student, get_students,
    record_attendance, record_marks, update_profile, update_student,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_student).get(get_students))
        .route("/orphans", get(get_orphan_students))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/{id}/attendance", post(record_attendance))
        .route("/{id}/marks", post(record_marks))
}

/// Self-service routes for a signed-in student.
pub fn init_student_profile_router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}
