use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::web::{AppState, routes};

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::service_info))
        .route("/healthz", get(healthz))
        .route("/summarize", post(routes::summarize))
        .route("/summarize-structured", post(routes::summarize_structured))
        .route("/summarize-multi", post(routes::summarize_multi))
        .route("/qa", post(routes::qa))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
