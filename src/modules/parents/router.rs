use crate::modules::parents::controller::{get_child_attendance, get_child_grades, get_children};
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_parents_router() -> Router<AppState> {
    Router::new()
        .route("/children", get(get_children))
        .route("/children/{id}/attendance", get(get_child_attendance))
        .route("/children/{id}/grades", get(get_child_grades))
}
