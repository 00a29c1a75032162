use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteType {
    Onsite,
    Remote,
    Hybrid,
}

impl RemoteType {
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteType::Onsite => "onsite",
            RemoteType::Remote => "remote",
            RemoteType::Hybrid => "hybrid",
        }
    }
}

impl FromStr for RemoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "onsite" | "on-site" | "office" => Ok(RemoteType::Onsite),
            "remote" => Ok(RemoteType::Remote),
            "hybrid" => Ok(RemoteType::Hybrid),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
    Filled,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Published => "published",
            JobStatus::Closed => "closed",
            JobStatus::Filled => "filled",
        }
    }

    /// Only published listings take part in matching.
    pub fn is_match_eligible(self) -> bool {
        self == JobStatus::Published
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(JobStatus::Draft),
            "published" => Ok(JobStatus::Published),
            "closed" => Ok(JobStatus::Closed),
            "filled" => Ok(JobStatus::Filled),
            other => Err(other.to_string()),
        }
    }
}

/// A job listing as stored by the application database.
///
/// Skills are free text here; `jobs::normalize_job` turns the row into `JobFacts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub required_skills: Vec<String>,
    pub nice_to_have_skills: Vec<String>,
    pub min_experience: Option<i32>,
    pub max_experience: Option<i32>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub location: Option<String>,
    pub remote_type: String,
    pub status: String,
    /// Bumped on every edit; part of the match cache key.
    pub version: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical projection of a job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFacts {
    pub id: Uuid,
    pub title: String,
    pub required_skills: BTreeSet<String>,
    /// Disjoint from `required_skills`.
    pub nice_to_have_skills: BTreeSet<String>,
    pub min_experience: u32,
    pub max_experience: u32,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub location: Option<String>,
    pub remote_type: RemoteType,
    pub status: JobStatus,
}
