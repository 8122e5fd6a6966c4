use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::rate_limit::login_rate_limit;
use crate::state::AppState;

use super::controller::{login, me};

pub fn init_auth_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            post(login).route_layer(middleware::from_fn_with_state(state, login_rate_limit)),
        )
        .route("/me", get(me))
}
