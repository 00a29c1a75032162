//! Job Descriptor Normalizer: `JobRow` + taxonomy snapshot → `JobFacts`.
//!
//! Pure and deterministic for a given taxonomy version. Skills the taxonomy does
//! not know are dropped with a warning; inconsistent bands are rejected.

use std::collections::BTreeSet;

use tracing::warn;

use super::JobValidationError;
use crate::models::job::{JobFacts, JobRow, JobStatus, RemoteType};
use crate::models::resume::MAX_YEARS_EXPERIENCE;
use crate::taxonomy::Taxonomy;

const MAX_EXPERIENCE: i64 = MAX_YEARS_EXPERIENCE as i64;

pub fn normalize_job(row: &JobRow, taxonomy: &Taxonomy) -> Result<JobFacts, JobValidationError> {
    let remote_type: RemoteType = row
        .remote_type
        .parse()
        .map_err(JobValidationError::UnknownRemoteType)?;
    let status: JobStatus = row
        .status
        .parse()
        .map_err(JobValidationError::UnknownStatus)?;

    let (min_experience, max_experience) =
        experience_band(row.min_experience, row.max_experience)?;
    validate_salary(row.salary_min, row.salary_max)?;

    let required_skills = canonical_skills(row, &row.required_skills, taxonomy);
    let nice_to_have_skills = canonical_skills(row, &row.nice_to_have_skills, taxonomy)
        .difference(&required_skills)
        .cloned()
        .collect();

    Ok(JobFacts {
        id: row.id,
        title: row.title.trim().to_string(),
        required_skills,
        nice_to_have_skills,
        min_experience,
        max_experience,
        salary_min: row.salary_min,
        salary_max: row.salary_max,
        location: row
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
        remote_type,
        status,
    })
}

fn canonical_skills(row: &JobRow, raw: &[String], taxonomy: &Taxonomy) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for token in raw {
        match taxonomy.canonicalize(token) {
            Some(id) => {
                out.insert(id.to_string());
            }
            None => warn!(
                job_id = %row.id,
                skill = %token,
                taxonomy_version = taxonomy.version(),
                "Dropping job skill unknown to the taxonomy"
            ),
        }
    }
    out
}

/// Missing `min` means 0, missing `max` means open-ended (60).
fn experience_band(min: Option<i32>, max: Option<i32>) -> Result<(u32, u32), JobValidationError> {
    let min = i64::from(min.unwrap_or(0));
    let max = max.map(i64::from).unwrap_or(MAX_EXPERIENCE);

    if !(0..=MAX_EXPERIENCE).contains(&min) || !(0..=MAX_EXPERIENCE).contains(&max) {
        return Err(JobValidationError::ExperienceOutOfRange { min, max });
    }
    if min > max {
        return Err(JobValidationError::InvertedExperience { min, max });
    }
    Ok((min as u32, max as u32))
}

fn validate_salary(min: Option<f64>, max: Option<f64>) -> Result<(), JobValidationError> {
    for bound in [min, max].into_iter().flatten() {
        if !bound.is_finite() || bound < 0.0 {
            return Err(JobValidationError::InvalidSalary(bound));
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(JobValidationError::InvertedSalary { min, max });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::sample_taxonomy;
    use crate::testing::job_row;

    #[test]
    fn test_skills_are_canonicalized_and_unknown_dropped() {
        let mut row = job_row();
        row.required_skills = vec!["Python".into(), "postgres sql".into(), "COBOL".into()];
        row.nice_to_have_skills = vec!["py".into(), "k8s".into()];

        let facts = normalize_job(&row, &sample_taxonomy()).unwrap();
        assert_eq!(
            facts.required_skills,
            BTreeSet::from(["skill:python".to_string(), "skill:sql".to_string()])
        );
        // python is already required, so it leaves the nice-to-have set
        assert_eq!(
            facts.nice_to_have_skills,
            BTreeSet::from(["skill:kubernetes".to_string()])
        );
    }

    #[test]
    fn test_missing_experience_bounds_default_to_open_band() {
        let mut row = job_row();
        row.min_experience = None;
        row.max_experience = None;
        let facts = normalize_job(&row, &sample_taxonomy()).unwrap();
        assert_eq!((facts.min_experience, facts.max_experience), (0, 60));
    }

    #[test]
    fn test_inconsistent_bands_are_rejected() {
        let taxonomy = sample_taxonomy();

        let mut row = job_row();
        row.min_experience = Some(8);
        row.max_experience = Some(3);
        assert_eq!(
            normalize_job(&row, &taxonomy),
            Err(JobValidationError::InvertedExperience { min: 8, max: 3 })
        );

        let mut row = job_row();
        row.max_experience = Some(75);
        assert!(matches!(
            normalize_job(&row, &taxonomy),
            Err(JobValidationError::ExperienceOutOfRange { .. })
        ));

        let mut row = job_row();
        row.salary_min = Some(150_000.0);
        row.salary_max = Some(100_000.0);
        assert!(matches!(
            normalize_job(&row, &taxonomy),
            Err(JobValidationError::InvertedSalary { .. })
        ));

        let mut row = job_row();
        row.salary_min = Some(-1.0);
        assert_eq!(
            normalize_job(&row, &taxonomy),
            Err(JobValidationError::InvalidSalary(-1.0))
        );
    }

    #[test]
    fn test_unknown_enums_are_rejected() {
        let mut row = job_row();
        row.remote_type = "sometimes".into();
        assert!(matches!(
            normalize_job(&row, &sample_taxonomy()),
            Err(JobValidationError::UnknownRemoteType(_))
        ));

        let mut row = job_row();
        row.status = "archived".into();
        assert!(matches!(
            normalize_job(&row, &sample_taxonomy()),
            Err(JobValidationError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let taxonomy = sample_taxonomy();
        let row = job_row();
        assert_eq!(
            normalize_job(&row, &taxonomy).unwrap(),
            normalize_job(&row, &taxonomy).unwrap()
        );
    }
}
