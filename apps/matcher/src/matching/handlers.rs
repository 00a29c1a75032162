use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analyzer::interview::{InterviewQuestion, DEFAULT_QUESTION_COUNT};
use crate::errors::AppError;
use crate::matching::pipeline::TaxonomyReload;
use crate::models::job::JobStatus;
use crate::models::match_record::MatchProjection;
use crate::state::AppState;
use crate::taxonomy::loader::load_rows;

const DEFAULT_TOP_K: usize = 20;

#[derive(Deserialize)]
pub struct TopQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct TopMatchesResponse {
    pub matches: Vec<MatchProjection>,
}

#[derive(Deserialize)]
pub struct InterviewRequest {
    pub count: Option<usize>,
}

#[derive(Serialize)]
pub struct InterviewResponse {
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct TransitionResponse {
    pub job_id: Uuid,
    pub status: String,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub closed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// GET /api/v1/matches/:resume_id/:job_id
pub async fn handle_get_match(
    State(state): State<AppState>,
    Path((resume_id, job_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MatchProjection>, AppError> {
    let record = state.pipeline.match_score(resume_id, job_id).await?;
    Ok(Json(record.projection()))
}

/// GET /api/v1/jobs/:job_id/matches?limit=K
pub async fn handle_top_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<TopQuery>,
) -> Result<Json<TopMatchesResponse>, AppError> {
    let records = state
        .pipeline
        .top_for_job(job_id, params.limit.unwrap_or(DEFAULT_TOP_K))
        .await?;
    Ok(Json(TopMatchesResponse {
        matches: records.iter().map(|r| r.projection()).collect(),
    }))
}

/// GET /api/v1/resumes/:resume_id/matches?limit=K
pub async fn handle_top_for_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(params): Query<TopQuery>,
) -> Result<Json<TopMatchesResponse>, AppError> {
    let records = state
        .pipeline
        .top_for_resume(resume_id, params.limit.unwrap_or(DEFAULT_TOP_K))
        .await?;
    Ok(Json(TopMatchesResponse {
        matches: records.iter().map(|r| r.projection()).collect(),
    }))
}

/// POST /api/v1/matches/:resume_id/:job_id/interview-questions
/// Body is optional: `{"count": 5}`.
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Path((resume_id, job_id)): Path<(Uuid, Uuid)>,
    body: Option<Json<InterviewRequest>>,
) -> Result<Json<InterviewResponse>, AppError> {
    let count = body
        .and_then(|Json(req)| req.count)
        .unwrap_or(DEFAULT_QUESTION_COUNT);
    let questions = state
        .pipeline
        .interview_questions(resume_id, job_id, count)
        .await?;
    Ok(Json(InterviewResponse {
        resume_id,
        job_id,
        questions,
    }))
}

/// POST /api/v1/jobs/:job_id/transition
pub async fn handle_transition_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<TransitionResponse>, AppError> {
    let target: JobStatus = req
        .status
        .parse()
        .map_err(|s| AppError::Validation(format!("unknown job status '{s}'")))?;
    let row = state.pipeline.transition_job(job_id, target).await?;
    Ok(Json(TransitionResponse {
        job_id: row.id,
        status: row.status,
        published_at: row.published_at,
        closed_at: row.closed_at,
    }))
}

/// POST /api/v1/taxonomy/reload
/// Re-reads `TAXONOMY_SOURCE` and publishes it as the next taxonomy version.
pub async fn handle_reload_taxonomy(
    State(state): State<AppState>,
) -> Result<Json<TaxonomyReload>, AppError> {
    let rows = load_rows(&state.config.taxonomy_source)
        .await
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;
    Ok(Json(state.pipeline.reload_taxonomy(rows)?))
}
