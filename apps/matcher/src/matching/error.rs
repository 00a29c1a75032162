use std::fmt;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::analyzer::AnalyzerError;
use crate::db::StoreError;
use crate::extraction::ExtractError;
use crate::jobs::JobValidationError;
use crate::repository::RepositoryError;
use crate::taxonomy::TaxonomyError;

/// Pipeline stage a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Analyze,
    Taxonomy,
    Normalize,
    Repository,
    Cache,
    Pipeline,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Analyze => "analyze",
            Stage::Taxonomy => "taxonomy",
            Stage::Normalize => "normalize",
            Stage::Repository => "repository",
            Stage::Cache => "cache",
            Stage::Pipeline => "pipeline",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    EmptyDocument,
    MalformedDocument,
    UploadTooLarge,
    LlmTransport,
    LlmSchemaViolation,
    Timeout,
    TaxonomyConflict,
    JobValidation,
    JobNotEligible,
    NotFound,
    RepositoryConflict,
    Storage,
    Internal,
}

impl ErrorKind {
    /// Remote or system failures an orchestrator may retry with backoff.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::LlmTransport | ErrorKind::Timeout | ErrorKind::Storage
        )
    }
}

/// A pipeline failure: what went wrong, in which stage, for which input.
///
/// Cloneable so a single failure can be handed to every single-flight waiter.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{stage} failed for {subject}: {detail}")]
pub struct MatchError {
    pub kind: ErrorKind,
    pub stage: Stage,
    pub subject: String,
    pub detail: String,
}

impl MatchError {
    pub fn new(
        kind: ErrorKind,
        stage: Stage,
        subject: impl fmt::Display,
        detail: impl fmt::Display,
    ) -> Self {
        Self {
            kind,
            stage,
            subject: subject.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn not_found(stage: Stage, entity: &str, id: Uuid) -> Self {
        Self::new(ErrorKind::NotFound, stage, format!("{entity} {id}"), "does not exist")
    }

    pub fn timeout(stage: Stage, subject: impl fmt::Display, after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            stage,
            subject,
            format!("deadline of {after:?} exceeded"),
        )
    }

    pub fn from_extract(e: &ExtractError, subject: impl fmt::Display) -> Self {
        let kind = match e {
            ExtractError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ExtractError::EmptyDocument { .. } => ErrorKind::EmptyDocument,
            ExtractError::Malformed { .. } => ErrorKind::MalformedDocument,
            ExtractError::TooLarge { .. } => ErrorKind::UploadTooLarge,
            ExtractError::Io(_) => ErrorKind::Internal,
        };
        Self::new(kind, Stage::Extract, subject, e)
    }

    pub fn from_analyzer(e: &AnalyzerError, subject: impl fmt::Display) -> Self {
        let kind = match e {
            AnalyzerError::Transport(_) => ErrorKind::LlmTransport,
            AnalyzerError::SchemaViolation(_) => ErrorKind::LlmSchemaViolation,
            AnalyzerError::Timeout(_) => ErrorKind::Timeout,
        };
        Self::new(kind, Stage::Analyze, subject, e)
    }

    pub fn from_job(e: &JobValidationError, job_id: Uuid) -> Self {
        Self::new(ErrorKind::JobValidation, Stage::Normalize, format!("job {job_id}"), e)
    }

    pub fn from_taxonomy(e: &TaxonomyError) -> Self {
        let kind = match e {
            TaxonomyError::Source(_) => ErrorKind::Storage,
            _ => ErrorKind::TaxonomyConflict,
        };
        Self::new(kind, Stage::Taxonomy, "skills taxonomy", e)
    }

    pub fn from_store(e: &StoreError, subject: impl fmt::Display) -> Self {
        let kind = match e {
            StoreError::Database(_) => ErrorKind::Storage,
            StoreError::Stale { .. } => ErrorKind::RepositoryConflict,
        };
        Self::new(kind, Stage::Repository, subject, e)
    }

    pub fn from_repository(e: &RepositoryError, subject: impl fmt::Display) -> Self {
        let kind = match e {
            RepositoryError::Database(_) => ErrorKind::Storage,
            RepositoryError::Conflict { .. } => ErrorKind::RepositoryConflict,
        };
        Self::new(kind, Stage::Repository, subject, e)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
