use crate::modules::dashboard::controller::get_statistics;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_dashboard_router() -> Router<AppState> {
    Router::new().route("/", get(get_statistics))
}
