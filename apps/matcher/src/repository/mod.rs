//! Match Repository: durable `MatchRecord` storage, one row per (résumé, job).
//!
//! Query correctness never depends on the match cache.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::match_record::MatchRecord;

pub mod postgres;

pub use postgres::PgMatchRepository;

/// Largest `limit` a top-K query honours.
pub const MAX_TOP_K: usize = 100;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(String),

    #[error("concurrent write for resume {resume_id} / job {job_id} could not be resolved")]
    Conflict { resume_id: Uuid, job_id: Uuid },
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        RepositoryError::Database(e.to_string())
    }
}

#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Inserts or replaces the record for `(resume_id, job_id)` in one atomic
    /// write and returns the stored row. A replaced row keeps its original `id`.
    async fn upsert(&self, record: &MatchRecord) -> Result<MatchRecord, RepositoryError>;

    async fn get(&self, resume_id: Uuid, job_id: Uuid)
        -> Result<Option<MatchRecord>, RepositoryError>;

    /// Best matches for a job, in `rank_matches` order.
    async fn top_for_job(&self, job_id: Uuid, limit: usize)
        -> Result<Vec<MatchRecord>, RepositoryError>;

    /// Best matches for a résumé, in `rank_matches` order.
    async fn top_for_resume(
        &self,
        resume_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, RepositoryError>;
}

pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_TOP_K)
}
