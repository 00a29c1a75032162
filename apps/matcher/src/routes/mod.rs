pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers as matches;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Résumés
        .route("/api/v1/resumes", post(resumes::handle_upload))
        .route("/api/v1/resumes/:resume_id", get(resumes::handle_get_resume))
        .route(
            "/api/v1/resumes/:resume_id/matches",
            get(matches::handle_top_for_resume),
        )
        // Matches
        .route(
            "/api/v1/matches/:resume_id/:job_id",
            get(matches::handle_get_match),
        )
        .route(
            "/api/v1/matches/:resume_id/:job_id/interview-questions",
            post(matches::handle_interview_questions),
        )
        // Jobs
        .route("/api/v1/jobs/:job_id/matches", get(matches::handle_top_for_job))
        .route(
            "/api/v1/jobs/:job_id/transition",
            post(matches::handle_transition_job),
        )
        // Taxonomy
        .route(
            "/api/v1/taxonomy/reload",
            post(matches::handle_reload_taxonomy),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
