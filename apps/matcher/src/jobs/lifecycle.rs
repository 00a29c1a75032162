use uuid::Uuid;

use super::JobValidationError;
use crate::clock::Clock;
use crate::models::job::{JobFacts, JobRow, JobStatus};

impl JobStatus {
    /// `draft → published → (closed | filled)`; everything else is illegal.
    pub fn can_transition_to(self, target: JobStatus) -> bool {
        matches!(
            (self, target),
            (JobStatus::Draft, JobStatus::Published)
                | (JobStatus::Published, JobStatus::Closed)
                | (JobStatus::Published, JobStatus::Filled)
        )
    }
}

impl JobRow {
    /// A new listing in `draft`, stamped by `clock`.
    pub fn draft(title: impl Into<String>, clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            required_skills: Vec::new(),
            nice_to_have_skills: Vec::new(),
            min_experience: None,
            max_experience: None,
            salary_min: None,
            salary_max: None,
            location: None,
            remote_type: "onsite".to_string(),
            status: JobStatus::Draft.as_str().to_string(),
            version: 1,
            published_at: None,
            closed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the listing to `target`, stamping `published_at` / `closed_at`.
    pub fn transition(&mut self, target: JobStatus, clock: &dyn Clock) -> Result<(), JobValidationError> {
        let current: JobStatus = self
            .status
            .parse()
            .map_err(JobValidationError::UnknownStatus)?;
        if !current.can_transition_to(target) {
            return Err(JobValidationError::IllegalTransition {
                from: current,
                to: target,
            });
        }

        let now = clock.now();
        match target {
            JobStatus::Published => self.published_at = Some(now),
            JobStatus::Closed | JobStatus::Filled => self.closed_at = Some(now),
            JobStatus::Draft => {}
        }
        self.status = target.as_str().to_string();
        self.updated_at = now;
        Ok(())
    }
}

impl JobFacts {
    /// Writes the facts back as a storable row. Normalizing the result under the
    /// same taxonomy yields `self` again.
    pub fn to_row(&self, clock: &dyn Clock) -> JobRow {
        let now = clock.now();
        let is_live = self.status != JobStatus::Draft;
        let is_over = matches!(self.status, JobStatus::Closed | JobStatus::Filled);
        JobRow {
            id: self.id,
            title: self.title.clone(),
            required_skills: self.required_skills.iter().cloned().collect(),
            nice_to_have_skills: self.nice_to_have_skills.iter().cloned().collect(),
            min_experience: Some(self.min_experience as i32),
            max_experience: Some(self.max_experience as i32),
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            location: self.location.clone(),
            remote_type: self.remote_type.as_str().to_string(),
            status: self.status.as_str().to_string(),
            version: 1,
            published_at: is_live.then_some(now),
            closed_at: is_over.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }
}
