//! Job listings: validation errors, lifecycle, normalization into `JobFacts`, storage.

use thiserror::Error;

use crate::models::job::JobStatus;

pub mod lifecycle;
pub mod normalizer;
pub mod store;

pub use normalizer::normalize_job;
pub use store::{JobStore, PgJobStore};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum JobValidationError {
    #[error("experience band {min}..{max} is outside 0..=60")]
    ExperienceOutOfRange { min: i64, max: i64 },

    #[error("experience band is inverted: min {min} > max {max}")]
    InvertedExperience { min: i64, max: i64 },

    #[error("salary bound {0} is negative or not finite")]
    InvalidSalary(f64),

    #[error("salary band is inverted: min {min} > max {max}")]
    InvertedSalary { min: f64, max: f64 },

    #[error("unknown remote type '{0}'")]
    UnknownRemoteType(String),

    #[error("unknown job status '{0}'")]
    UnknownStatus(String),

    #[error("illegal status transition {from} -> {to}")]
    IllegalTransition { from: JobStatus, to: JobStatus },
}
