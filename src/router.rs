use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::{metrics_app, metrics_middleware};
use crate::middleware::role::{require_parent, require_staff, require_student};
use crate::modules::admissions::{init_admissions_router, init_applications_router};
use crate::modules::auth::init_auth_router;
use crate::modules::dashboard::init_dashboard_router;
use crate::modules::parents::init_parents_router;
use crate::modules::students::{init_student_profile_router, init_students_router};
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn init_router(state: AppState) -> Router {
    let metrics_handle = state.metrics_handle.clone();

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .nest(
                    "/admission",
                    init_admissions_router().nest(
                        "/applications",
                        init_applications_router().route_layer(middleware::from_fn_with_state(
                            state.clone(),
                            require_staff,
                        )),
                    ),
                )
                .merge(init_auth_router(state.clone()))
                .nest(
                    "/admin/students",
                    init_students_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff)),
                )
                .nest("/admin/dashboard", init_dashboard_router())
                .nest(
                    "/parents",
                    init_parents_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_parent)),
                )
                .nest(
                    "/students",
                    init_student_profile_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_student,
                    )),
                ),
        )
        .with_state(state.clone());

    let router = match metrics_handle {
        Some(handle) => router
            .merge(metrics_app(handle))
            .layer(middleware::from_fn(metrics_middleware)),
        None => router,
    };

    router
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
