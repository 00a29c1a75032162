//! Shared fixtures and in-memory doubles for unit tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::analyzer::{InterviewQuestionGenerator, ResumeAnalyzer};
use crate::analyzer::prompts::PromptSet;
use crate::clock::ManualClock;
use crate::config::Config;
use crate::db::StoreError;
use crate::extraction::{DocumentKind, TextExtractor};
use crate::jobs::JobStore;
use crate::llm_client::{ChatBackend, ChatMessage, LlmError};
use crate::matching::cache::MatchCache;
use crate::matching::pipeline::{MatchPipeline, PipelineContext};
use crate::matching::scorer::WeightedScorer;
use crate::models::job::{JobFacts, JobRow, JobStatus, RemoteType};
use crate::models::match_record::{rank_matches, MatchRecord};
use crate::models::resume::{EducationLevel, ResumeFacts};
use crate::repository::{clamp_limit, MatchRepository, RepositoryError};
use crate::resumes::store::{ResumeDocument, ResumeStore};
use crate::taxonomy::registry::TaxonomyRegistry;
use crate::taxonomy::sample_rows;

// ────────────────────────────────────────────────────────────────────────────
// LLM stub
// ────────────────────────────────────────────────────────────────────────────

/// Well-formed analyzer reply for "Jane Doe".
pub const RESUME_REPLY: &str = r#"{
    "name": "Jane Doe",
    "email": "jane@example.com",
    "phone": null,
    "skills": ["Python", "SQL"],
    "years_experience": 5,
    "education_level": "master",
    "languages": ["English"],
    "self_reported_score": 80,
    "summary": "Backend engineer working with Python and SQL.",
    "location": "Berlin",
    "salary_min": 90000,
    "salary_max": 130000
}"#;

/// Scripted `ChatBackend`. Replies are handed out in order; once only one
/// `Ok` reply is left it is repeated for every further call.
pub struct StubChat {
    replies: Mutex<Vec<Result<String, LlmError>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl StubChat {
    pub fn replying(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn request(&self, index: usize) -> Vec<ChatMessage> {
        self.requests.lock().unwrap()[index].clone()
    }

    fn next_reply(&self) -> Result<String, LlmError> {
        let mut replies = self.replies.lock().unwrap();
        match replies.len() {
            0 => Err(LlmError::EmptyContent),
            1 => match &replies[0] {
                Ok(reply) => Ok(reply.clone()),
                Err(_) => replies.remove(0),
            },
            _ => replies.remove(0),
        }
    }
}

#[async_trait]
impl ChatBackend for StubChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(messages.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_reply()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

/// Python + SQL, five years, Berlin, expecting 90k – 130k.
pub fn resume_facts() -> ResumeFacts {
    let mut facts = ResumeFacts::empty(Uuid::nil());
    facts.name = Some("Jane Doe".to_string());
    facts.skills = BTreeSet::from(["skill:python".to_string(), "skill:sql".to_string()]);
    facts.years_experience = 5.0;
    facts.education_level = EducationLevel::None;
    facts.location = Some("Berlin".to_string());
    facts.salary_min = Some(90_000.0);
    facts.salary_max = Some(130_000.0);
    facts
}

/// Published remote listing requiring Python, SQL and Docker with a 3 – 7 year band.
pub fn job_facts() -> JobFacts {
    JobFacts {
        id: Uuid::nil(),
        title: "Backend Engineer".to_string(),
        required_skills: BTreeSet::from([
            "skill:docker".to_string(),
            "skill:python".to_string(),
            "skill:sql".to_string(),
        ]),
        nice_to_have_skills: BTreeSet::new(),
        min_experience: 3,
        max_experience: 7,
        salary_min: Some(100_000.0),
        salary_max: Some(140_000.0),
        location: Some("Berlin".to_string()),
        remote_type: RemoteType::Remote,
        status: JobStatus::Published,
    }
}

/// Raw counterpart of `job_facts`.
pub fn job_row() -> JobRow {
    let now = fixed_time();
    JobRow {
        id: Uuid::new_v4(),
        title: "Backend Engineer".to_string(),
        required_skills: vec!["Python".into(), "SQL".into(), "Docker".into()],
        nice_to_have_skills: Vec::new(),
        min_experience: Some(3),
        max_experience: Some(7),
        salary_min: Some(100_000.0),
        salary_max: Some(140_000.0),
        location: Some("Berlin".to_string()),
        remote_type: "remote".to_string(),
        status: "published".to_string(),
        version: 1,
        published_at: Some(now),
        closed_at: None,
        created_at: now,
        updated_at: now,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory stores
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryResumeStore {
    docs: Mutex<HashMap<Uuid, ResumeDocument>>,
}

impl MemoryResumeStore {
    pub fn insert(&self, doc: ResumeDocument) {
        self.docs.lock().unwrap().insert(doc.id, doc);
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn store_document(
        &self,
        id: Uuid,
        content_type: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ResumeDocument, StoreError> {
        let mut docs = self.docs.lock().unwrap();
        let doc = match docs.get(&id) {
            Some(existing) => ResumeDocument {
                version: existing.version + 1,
                content_type: content_type.to_string(),
                text: text.to_string(),
                facts: None,
                updated_at: now,
                ..existing.clone()
            },
            None => ResumeDocument {
                id,
                version: 1,
                content_type: content_type.to_string(),
                text: text.to_string(),
                facts: None,
                created_at: now,
                updated_at: now,
            },
        };
        docs.insert(id, doc.clone());
        Ok(doc)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResumeDocument>, StoreError> {
        Ok(self.docs.lock().unwrap().get(&id).cloned())
    }

    async fn save_facts(
        &self,
        id: Uuid,
        version: i32,
        facts: &ResumeFacts,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut docs = self.docs.lock().unwrap();
        match docs.get_mut(&id) {
            Some(doc) if doc.version == version && doc.facts.is_none() => {
                doc.facts = Some(facts.clone());
                doc.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryJobStore {
    rows: Mutex<HashMap<Uuid, JobRow>>,
    read_delay: Mutex<Option<Duration>>,
}

impl MemoryJobStore {
    pub fn insert(&self, row: JobRow) {
        self.rows.lock().unwrap().insert(row.id, row);
    }

    /// Every later `get` sleeps this long first, like a stalled database.
    pub fn stall_reads(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn get(&self, id: Uuid) -> Result<Option<JobRow>, StoreError> {
        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn save_status(&self, row: &JobRow) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&row.id) {
            Some(stored) if stored.version == row.version => {
                stored.status = row.status.clone();
                stored.published_at = row.published_at;
                stored.closed_at = row.closed_at;
                stored.updated_at = row.updated_at;
                Ok(())
            }
            _ => Err(StoreError::Stale {
                entity: "job",
                id: row.id,
            }),
        }
    }
}

#[derive(Default)]
pub struct MemoryMatchRepository {
    rows: Mutex<HashMap<(Uuid, Uuid), MatchRecord>>,
    writes: AtomicUsize,
}

impl MemoryMatchRepository {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn top_where(&self, keep: impl Fn(&MatchRecord) -> bool, limit: usize) -> Vec<MatchRecord> {
        let mut records: Vec<MatchRecord> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| keep(r))
            .cloned()
            .collect();
        rank_matches(&mut records);
        records.truncate(clamp_limit(limit));
        records
    }
}

#[async_trait]
impl MatchRepository for MemoryMatchRepository {
    async fn upsert(&self, record: &MatchRecord) -> Result<MatchRecord, RepositoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let key = (record.resume_id, record.job_id);
        let stored = match rows.get(&key) {
            Some(existing) => MatchRecord {
                id: existing.id,
                ..record.clone()
            },
            None => record.clone(),
        };
        rows.insert(key, stored.clone());
        Ok(stored)
    }

    async fn get(
        &self,
        resume_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<MatchRecord>, RepositoryError> {
        Ok(self.rows.lock().unwrap().get(&(resume_id, job_id)).cloned())
    }

    async fn top_for_job(
        &self,
        job_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, RepositoryError> {
        Ok(self.top_where(|r| r.job_id == job_id, limit))
    }

    async fn top_for_resume(
        &self,
        resume_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, RepositoryError> {
        Ok(self.top_where(|r| r.resume_id == resume_id, limit))
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/matcher_test".to_string(),
        redis_url: None,
        llm_base_url: "http://127.0.0.1:9".to_string(),
        llm_api_key: "test-key".to_string(),
        llm_model: "gpt-4o-mini".to_string(),
        llm_temperature: 0.2,
        llm_timeout_secs: 60,
        cache_ttl_secs: 3600,
        pipeline_deadline_secs: 90,
        max_upload_bytes: 1024 * 1024,
        allowed_formats: DocumentKind::ALL.to_vec(),
        taxonomy_source: "taxonomy.json".to_string(),
        port: 8080,
        rust_log: "debug".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline harness
// ────────────────────────────────────────────────────────────────────────────

/// A pipeline wired to in-memory stores, a manual clock and a scripted LLM.
pub struct Harness {
    pub pipeline: MatchPipeline,
    pub chat: Arc<StubChat>,
    pub resumes: Arc<MemoryResumeStore>,
    pub jobs: Arc<MemoryJobStore>,
    pub repository: Arc<MemoryMatchRepository>,
    pub taxonomy: Arc<TaxonomyRegistry>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(chat: StubChat) -> Self {
        Self::with_deadline(chat, Duration::from_secs(90))
    }

    pub fn with_deadline(chat: StubChat, deadline: Duration) -> Self {
        let chat = Arc::new(chat);
        let resumes = Arc::new(MemoryResumeStore::default());
        let jobs = Arc::new(MemoryJobStore::default());
        let repository = Arc::new(MemoryMatchRepository::default());
        let taxonomy = Arc::new(TaxonomyRegistry::new(sample_rows()).unwrap());
        let clock = Arc::new(ManualClock::default());
        let call_timeout = Duration::from_secs(60);

        let ctx = PipelineContext {
            extractor: TextExtractor::new(1024 * 1024, DocumentKind::ALL.to_vec()),
            analyzer: ResumeAnalyzer::new(chat.clone(), PromptSet::resume_default(), call_timeout),
            interviewer: InterviewQuestionGenerator::new(
                chat.clone(),
                PromptSet::interview_default(),
                call_timeout,
            ),
            taxonomy: taxonomy.clone(),
            scorer: Arc::new(WeightedScorer::default()),
            resumes: resumes.clone(),
            jobs: jobs.clone(),
            repository: repository.clone(),
            cache: MatchCache::new(chrono::Duration::hours(1), clock.clone(), None),
            clock: clock.clone(),
            deadline,
        };

        Self {
            pipeline: MatchPipeline::new(ctx),
            chat,
            resumes,
            jobs,
            repository,
            taxonomy,
            clock,
        }
    }

    /// Stores `job_row()` and returns its id.
    pub fn seed_job(&self) -> Uuid {
        let row = job_row();
        let id = row.id;
        self.jobs.insert(row);
        id
    }

    /// Stores a résumé whose facts are already analyzed.
    pub fn seed_analyzed_resume(&self, facts: ResumeFacts) -> Uuid {
        let id = Uuid::new_v4();
        self.resumes.insert(ResumeDocument {
            id,
            version: 1,
            content_type: "text/plain".to_string(),
            text: "Jane Doe. Python, SQL.".to_string(),
            facts: Some(ResumeFacts { id, ..facts }),
            created_at: fixed_time(),
            updated_at: fixed_time(),
        });
        id
    }
}
