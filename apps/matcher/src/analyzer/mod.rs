//! Résumé Analyzer: cleaned résumé text in, `ResumeFacts` out, via one chat completion.
//!
//! Result policy:
//! - the reply must be a single JSON object (code fences tolerated)
//! - anything else triggers exactly one re-ask with a tightening system message
//! - a second bad reply is a `SchemaViolation`
//! - HTTP failures are `Transport`; no retries happen here

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub mod interview;
pub mod normalize;
pub mod prompts;
pub mod schema;

use crate::llm_client::prompts::TIGHTEN_JSON_SYSTEM;
use crate::llm_client::{strip_json_fences, ChatBackend, ChatMessage, LlmError};
use crate::models::resume::ResumeFacts;
use crate::taxonomy::Taxonomy;
use prompts::PromptSet;
use schema::RawResumeFacts;

pub use interview::{Difficulty, InterviewQuestion, InterviewQuestionGenerator};

/// Input budget for the résumé text, in characters (~6k tokens).
pub const MAX_INPUT_CHARS: usize = 24_000;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyzerError {
    #[error("LLM transport error: {0}")]
    Transport(String),

    #[error("LLM reply violated the schema: {0}")]
    SchemaViolation(String),

    #[error("LLM call exceeded {0:?}")]
    Timeout(Duration),
}

impl From<LlmError> for AnalyzerError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout(after) => AnalyzerError::Timeout(after),
            LlmError::Parse(e) => AnalyzerError::SchemaViolation(e.to_string()),
            LlmError::EmptyContent => {
                AnalyzerError::SchemaViolation("LLM returned empty content".to_string())
            }
            other => AnalyzerError::Transport(other.to_string()),
        }
    }
}

/// Parses a reply that must be exactly one JSON object.
fn parse_strict<T: DeserializeOwned>(content: &str) -> Result<T, String> {
    let body = strip_json_fences(content);
    if !(body.starts_with('{') && body.ends_with('}')) {
        return Err("reply contains text outside the JSON object".to_string());
    }
    serde_json::from_str(body).map_err(|e| e.to_string())
}

/// Shared completion loop for every JSON-producing prompt.
pub(crate) async fn complete_json<T: DeserializeOwned>(
    backend: &dyn ChatBackend,
    mut messages: Vec<ChatMessage>,
    call_timeout: Duration,
) -> Result<T, AnalyzerError> {
    let mut last_problem = String::new();

    for attempt in 0..2 {
        let reply = tokio::time::timeout(call_timeout, backend.complete(&messages))
            .await
            .map_err(|_| AnalyzerError::Timeout(call_timeout))?;

        let content = match reply {
            Ok(content) => content,
            Err(LlmError::EmptyContent) => String::new(),
            Err(e) => return Err(e.into()),
        };

        match parse_strict::<T>(&content) {
            Ok(parsed) => return Ok(parsed),
            Err(problem) => {
                warn!(attempt, "Rejected LLM reply: {problem}");
                last_problem = problem;
            }
        }

        if attempt == 0 {
            messages.push(ChatMessage::assistant(content));
            messages.push(ChatMessage::system(TIGHTEN_JSON_SYSTEM));
        }
    }

    Err(AnalyzerError::SchemaViolation(last_problem))
}

/// Turns résumé text into `ResumeFacts`. Holds no state besides its collaborators.
#[derive(Clone)]
pub struct ResumeAnalyzer {
    backend: Arc<dyn ChatBackend>,
    prompts: PromptSet,
    call_timeout: Duration,
    max_input_chars: usize,
}

impl ResumeAnalyzer {
    pub fn new(backend: Arc<dyn ChatBackend>, prompts: PromptSet, call_timeout: Duration) -> Self {
        Self {
            backend,
            prompts,
            call_timeout,
            max_input_chars: MAX_INPUT_CHARS,
        }
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    pub async fn analyze(
        &self,
        resume_id: Uuid,
        text: &str,
        taxonomy: &Taxonomy,
    ) -> Result<ResumeFacts, AnalyzerError> {
        let input = normalize::truncate_at_paragraph(text, self.max_input_chars);
        if input.len() < text.len() {
            debug!(
                resume_id = %resume_id,
                kept = input.len(),
                total = text.len(),
                "Résumé text truncated to input budget"
            );
        }

        let messages = vec![
            ChatMessage::system(self.prompts.system.clone()),
            ChatMessage::user(self.prompts.render(&[("resume_text", input)])),
        ];
        let raw: RawResumeFacts =
            complete_json(self.backend.as_ref(), messages, self.call_timeout).await?;

        let facts = normalize::into_facts(raw, resume_id, taxonomy);
        info!(
            resume_id = %resume_id,
            skills = facts.skills.len(),
            unknown_skills = facts.unknown_skills.len(),
            taxonomy_version = taxonomy.version(),
            "Résumé analyzed"
        );
        Ok(facts)
    }
}
