use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::prompts::PromptSet;
use super::schema::RawInterviewQuestions;
use super::{complete_json, AnalyzerError};
use crate::llm_client::{ChatBackend, ChatMessage};
use crate::models::job::JobFacts;
use crate::models::resume::ResumeFacts;
use crate::taxonomy::Taxonomy;

pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const MAX_QUESTION_COUNT: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

impl Difficulty {
    fn parse_loose(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "basic" | "easy" | "junior" => Difficulty::Basic,
            "advanced" | "hard" | "senior" | "expert" => Difficulty::Advanced,
            _ => Difficulty::Intermediate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub skill: Option<String>,
    pub difficulty: Difficulty,
}

/// Generates interview questions for a (candidate, job) pair through the same
/// chat backend and JSON policy as the résumé analyzer.
#[derive(Clone)]
pub struct InterviewQuestionGenerator {
    backend: Arc<dyn ChatBackend>,
    prompts: PromptSet,
    call_timeout: Duration,
}

impl InterviewQuestionGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>, prompts: PromptSet, call_timeout: Duration) -> Self {
        Self {
            backend,
            prompts,
            call_timeout,
        }
    }

    pub async fn generate(
        &self,
        resume: &ResumeFacts,
        job: &JobFacts,
        taxonomy: &Taxonomy,
        count: usize,
    ) -> Result<Vec<InterviewQuestion>, AnalyzerError> {
        let count = count.clamp(1, MAX_QUESTION_COUNT);
        let display = |ids: &std::collections::BTreeSet<String>| -> Vec<String> {
            ids.iter()
                .map(|id| {
                    taxonomy
                        .entry(id)
                        .map(|e| e.display_name.clone())
                        .unwrap_or_else(|| id.clone())
                })
                .collect()
        };

        let candidate = json!({
            "skills": display(&resume.skills),
            "other_skills": resume.unknown_skills,
            "years_experience": resume.years_experience,
            "education_level": resume.education_level,
            "summary": resume.summary,
        });
        let job_view = json!({
            "title": job.title,
            "required_skills": display(&job.required_skills),
            "nice_to_have_skills": display(&job.nice_to_have_skills),
            "min_experience": job.min_experience,
            "max_experience": job.max_experience,
        });

        let count_text = count.to_string();
        let candidate_text = candidate.to_string();
        let job_text = job_view.to_string();
        let prompt = self.prompts.render(&[
            ("count", count_text.as_str()),
            ("candidate", candidate_text.as_str()),
            ("job", job_text.as_str()),
        ]);
        let messages = vec![
            ChatMessage::system(self.prompts.system.clone()),
            ChatMessage::user(prompt),
        ];

        let raw: RawInterviewQuestions =
            complete_json(self.backend.as_ref(), messages, self.call_timeout).await?;

        let questions: Vec<InterviewQuestion> = raw
            .questions
            .into_iter()
            .filter(|q| !q.question.trim().is_empty())
            .take(count)
            .map(|q| InterviewQuestion {
                question: q.question.trim().to_string(),
                skill: q.skill.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
                difficulty: q
                    .difficulty
                    .as_deref()
                    .map(Difficulty::parse_loose)
                    .unwrap_or(Difficulty::Intermediate),
            })
            .collect();

        if questions.is_empty() {
            return Err(AnalyzerError::SchemaViolation(
                "reply contained no questions".to_string(),
            ));
        }

        info!(
            resume_id = %resume.id,
            job_id = %job.id,
            questions = questions.len(),
            "Interview questions generated"
        );
        Ok(questions)
    }
}
