pub mod applications;
pub mod extract;
pub mod health;
pub mod hr;

use axum::{
    routing::{get, post},
    Router,
};

use crate::middleware::{
    auth::{require_hr_role, AuthKeys},
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub jwt_secret: String,
    pub public_rps: u32,
    pub integration_rps: u32,
}

/// Candidate-facing and HR routes with their auth and rate-limit layers.
pub fn build_router(state: AppState, settings: &RouterSettings) -> Router {
    let candidate_api = Router::new()
        .route("/api/applications", post(applications::apply))
        .route("/api/applications/:id", get(applications::get_application))
        .route("/api/applications/:id/stages", get(applications::list_stages))
        .route(
            "/api/applications/:id/stages/:stage",
            axum::routing::put(applications::record_stage_outcome),
        )
        .route(
            "/api/applications/:id/resume",
            post(applications::complete_resume_upload),
        )
        .route(
            "/api/candidates/:id/applications",
            get(applications::list_candidate_applications),
        )
        .route("/api/pipeline/stages", get(applications::pipeline_stages))
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new("public", settings.public_rps),
            rps_middleware,
        ));

    let hr_api = Router::new()
        .route("/api/hr/applications", get(hr::list_applications))
        .route("/api/hr/applications/:id/status", post(hr::override_status))
        .route("/api/hr/applications/:id/overrides", get(hr::list_overrides))
        .route("/api/hr/applications/:id/resync", post(hr::resync_progress))
        .route("/api/hr/dashboard", get(hr::dashboard))
        .route("/api/hr/dictionaries/statuses", get(hr::status_dictionary))
        .layer(axum::middleware::from_fn_with_state(
            AuthKeys::new(&settings.jwt_secret),
            require_hr_role,
        ))
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new("integration", settings.integration_rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(candidate_api)
        .merge(hr_api)
        .with_state(state)
}
