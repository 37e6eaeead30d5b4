//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
///
/// The `/v1` routes are only mounted when instructor recruitment is enabled
/// in the state's settings.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new().route("/health", get(handlers::health_check));

    if state.settings.instructor_recruitment_enabled {
        let api_v1 = Router::new()
            // Recruitment processes
            .route("/recruitments", get(handlers::list_recruitments))
            .route("/recruitments/{id}", get(handlers::recruitment_details))
            .route("/recruitments/{id}/assign", post(handlers::assign_recruitment))
            .route("/recruitments/{id}/signups", post(handlers::signup_for_recruitment))
            .route("/events/{event_id}/recruitments", post(handlers::create_recruitment))
            .route("/events/{event_id}/recruitments/new", get(handlers::new_recruitment))
            // Signup workflow
            .route("/signups/{id}/change-state", post(handlers::change_signup_state))
            // People
            .route("/persons", post(handlers::create_person))
            .route(
                "/persons/{id}/profile",
                get(handlers::get_profile).put(handlers::update_profile),
            )
            // Scheduled jobs
            .route("/jobs", get(handlers::list_jobs))
            .route("/tasks/{id}/jobs", get(handlers::task_jobs));
        router = router.nest("/v1", api_v1);
    } else {
        tracing::info!("Instructor recruitment disabled; only /health is served");
    }

    router
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
