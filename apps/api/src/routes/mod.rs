pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::resumes::{dashboard, handlers};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/upload", post(handlers::handle_upload_url))
        .route(
            "/api/v1/resumes",
            post(handlers::handle_create_resume).get(handlers::handle_list_resumes),
        )
        .route("/api/v1/resumes/:id", get(handlers::handle_get_resume))
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route("/api/v1/dashboard", get(dashboard::handle_dashboard))
        .with_state(state)
}
