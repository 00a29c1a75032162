//! Match pipeline: extract → analyze → normalize → score → persist, fronted by
//! the match cache.
//!
//! Every collaborator lives in an explicit `PipelineContext`; nothing here
//! reaches for globals, so tests build the whole pipeline from stubs.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::cache::{CacheStats, MatchCache};
use super::error::{ErrorKind, MatchError, Stage};
use super::fingerprint::CacheKey;
use super::scorer::MatchScorer;
use crate::analyzer::{InterviewQuestion, InterviewQuestionGenerator, ResumeAnalyzer};
use crate::clock::Clock;
use crate::extraction::TextExtractor;
use crate::jobs::{normalize_job, JobStore, JobValidationError};
use crate::models::job::{JobFacts, JobRow, JobStatus};
use crate::models::match_record::MatchRecord;
use crate::models::resume::ResumeFacts;
use crate::repository::{clamp_limit, MatchRepository};
use crate::resumes::store::{ResumeDocument, ResumeStore};
use crate::taxonomy::registry::TaxonomyRegistry;
use crate::taxonomy::{SkillRow, Taxonomy};

pub struct PipelineContext {
    pub extractor: TextExtractor,
    pub analyzer: ResumeAnalyzer,
    pub interviewer: InterviewQuestionGenerator,
    pub taxonomy: Arc<TaxonomyRegistry>,
    pub scorer: Arc<dyn MatchScorer>,
    pub resumes: Arc<dyn ResumeStore>,
    pub jobs: Arc<dyn JobStore>,
    pub repository: Arc<dyn MatchRepository>,
    pub cache: MatchCache,
    pub clock: Arc<dyn Clock>,
    /// Budget for one whole computation, LLM call included.
    pub deadline: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyReload {
    pub version: u64,
    pub skills: usize,
    pub evicted: usize,
}

#[derive(Clone)]
pub struct MatchPipeline {
    ctx: Arc<PipelineContext>,
}

impl MatchPipeline {
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Résumés
    // ────────────────────────────────────────────────────────────────────────

    /// Extracts, stores and analyzes one upload. Passing an existing id stores
    /// a new version of that résumé.
    ///
    /// Extraction failures happen before anything is stored or sent to the LLM.
    /// If analysis fails the text stays stored without facts; the next match
    /// request for it analyzes again.
    pub async fn ingest_resume(
        &self,
        resume_id: Option<Uuid>,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<ResumeDocument, MatchError> {
        let ctx = &self.ctx;
        let id = resume_id.unwrap_or_else(Uuid::new_v4);
        let subject = format!("resume {id}");

        let text = ctx
            .extractor
            .extract(content_type, bytes)
            .await
            .map_err(|e| MatchError::from_extract(&e, &subject))?;
        debug!(resume_id = %id, chars = text.chars().count(), "Résumé text extracted");

        let mut doc = ctx
            .resumes
            .store_document(id, content_type, &text, ctx.clock.now())
            .await
            .map_err(|e| MatchError::from_store(&e, &subject))?;
        info!(resume_id = %id, version = doc.version, "Résumé stored");

        let taxonomy = ctx.taxonomy.snapshot();
        let facts = ctx
            .within(&subject, ctx.ensure_facts(doc.clone(), &taxonomy))
            .await?;
        doc.facts = Some(facts);
        Ok(doc)
    }

    pub async fn resume(&self, resume_id: Uuid) -> Result<ResumeDocument, MatchError> {
        self.ctx.load_resume(resume_id).await
    }

    // ────────────────────────────────────────────────────────────────────────
    // Matching
    // ────────────────────────────────────────────────────────────────────────

    /// Scores one (résumé, job) pair, served from the cache when the résumé,
    /// job, taxonomy and scorer versions are all unchanged.
    ///
    /// Loading the inputs and computing the score each run under the pipeline
    /// deadline.
    pub async fn match_score(
        &self,
        resume_id: Uuid,
        job_id: Uuid,
    ) -> Result<MatchRecord, MatchError> {
        let ctx = &self.ctx;
        let (resume, job) = ctx
            .within(&format!("resume {resume_id} / job {job_id}"), async {
                let job = ctx.load_job(job_id).await?;
                let status = job.status.parse::<JobStatus>().map_err(|s| {
                    MatchError::from_job(&JobValidationError::UnknownStatus(s), job_id)
                })?;
                if !status.is_match_eligible() {
                    return Err(MatchError::new(
                        ErrorKind::JobNotEligible,
                        Stage::Pipeline,
                        format!("job {job_id}"),
                        format!("job is {status}, only published jobs are matched"),
                    ));
                }
                let resume = ctx.load_resume(resume_id).await?;
                Ok((resume, job))
            })
            .await?;

        // One snapshot for the whole computation, even if a reload lands meanwhile.
        let taxonomy = ctx.taxonomy.snapshot();
        let key = CacheKey {
            resume_id,
            resume_version: resume.version,
            job_id,
            job_version: job.version,
            taxonomy_version: taxonomy.version(),
            scorer_version: ctx.scorer.version().to_string(),
        };

        let worker = self.ctx.clone();
        let subject = key.subject();
        ctx.cache
            .get_or_compute(&key, move || async move {
                worker
                    .within(&subject, worker.compute(resume, job, taxonomy))
                    .await
            })
            .await
    }

    pub async fn top_for_job(
        &self,
        job_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, MatchError> {
        self.ctx
            .repository
            .top_for_job(job_id, clamp_limit(limit))
            .await
            .map_err(|e| MatchError::from_repository(&e, format!("job {job_id}")))
    }

    pub async fn top_for_resume(
        &self,
        resume_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, MatchError> {
        self.ctx
            .repository
            .top_for_resume(resume_id, clamp_limit(limit))
            .await
            .map_err(|e| MatchError::from_repository(&e, format!("resume {resume_id}")))
    }

    /// Interview questions for a candidate against a job. Not cached.
    pub async fn interview_questions(
        &self,
        resume_id: Uuid,
        job_id: Uuid,
        count: usize,
    ) -> Result<Vec<InterviewQuestion>, MatchError> {
        let ctx = &self.ctx;
        let taxonomy = ctx.taxonomy.snapshot();
        let subject = format!("resume {resume_id} / job {job_id}");

        ctx.within(&subject, async {
            let job = ctx.load_job(job_id).await?;
            let resume = ctx.load_resume(resume_id).await?;
            let facts = ctx.ensure_facts(resume, &taxonomy).await?;
            let job_facts = normalize(&job, &taxonomy)?;
            ctx.interviewer
                .generate(&facts, &job_facts, &taxonomy, count)
                .await
                .map_err(|e| MatchError::from_analyzer(&e, &subject))
        })
        .await
    }

    // ────────────────────────────────────────────────────────────────────────
    // Administration
    // ────────────────────────────────────────────────────────────────────────

    /// Publishes a new taxonomy snapshot and evicts cached scores built on older ones.
    pub fn reload_taxonomy(&self, rows: Vec<SkillRow>) -> Result<TaxonomyReload, MatchError> {
        let ctx = &self.ctx;
        let taxonomy = ctx
            .taxonomy
            .publish(rows)
            .map_err(|e| MatchError::from_taxonomy(&e))?;
        let evicted = ctx
            .cache
            .invalidate_versions(taxonomy.version(), ctx.scorer.version());
        Ok(TaxonomyReload {
            version: taxonomy.version(),
            skills: taxonomy.len(),
            evicted,
        })
    }

    pub async fn transition_job(
        &self,
        job_id: Uuid,
        target: JobStatus,
    ) -> Result<JobRow, MatchError> {
        let ctx = &self.ctx;
        let mut row = ctx.load_job(job_id).await?;
        let from = row.status.clone();
        row.transition(target, ctx.clock.as_ref())
            .map_err(|e| MatchError::from_job(&e, job_id))?;
        ctx.jobs
            .save_status(&row)
            .await
            .map_err(|e| MatchError::from_store(&e, format!("job {job_id}")))?;
        info!(job_id = %job_id, from = %from, to = %target, "Job status changed");
        Ok(row)
    }

    pub fn taxonomy_version(&self) -> u64 {
        self.ctx.taxonomy.snapshot().version()
    }

    pub fn scorer_version(&self) -> &str {
        self.ctx.scorer.version()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.ctx.cache.stats()
    }
}

fn normalize(job: &JobRow, taxonomy: &Taxonomy) -> Result<JobFacts, MatchError> {
    normalize_job(job, taxonomy).map_err(|e| MatchError::from_job(&e, job.id))
}

impl PipelineContext {
    async fn within<T>(
        &self,
        subject: &str,
        work: impl Future<Output = Result<T, MatchError>>,
    ) -> Result<T, MatchError> {
        match tokio::time::timeout(self.deadline, work).await {
            Ok(result) => result,
            Err(_) => {
                warn!(subject, deadline = ?self.deadline, "Pipeline deadline exceeded");
                Err(MatchError::timeout(Stage::Pipeline, subject, self.deadline))
            }
        }
    }

    async fn load_job(&self, job_id: Uuid) -> Result<JobRow, MatchError> {
        self.jobs
            .get(job_id)
            .await
            .map_err(|e| MatchError::from_store(&e, format!("job {job_id}")))?
            .ok_or_else(|| MatchError::not_found(Stage::Pipeline, "job", job_id))
    }

    async fn load_resume(&self, resume_id: Uuid) -> Result<ResumeDocument, MatchError> {
        self.resumes
            .get(resume_id)
            .await
            .map_err(|e| MatchError::from_store(&e, format!("resume {resume_id}")))?
            .ok_or_else(|| MatchError::not_found(Stage::Pipeline, "resume", resume_id))
    }

    /// Facts for exactly `doc.version`, analyzing the text on first use.
    async fn ensure_facts(
        &self,
        doc: ResumeDocument,
        taxonomy: &Taxonomy,
    ) -> Result<ResumeFacts, MatchError> {
        if let Some(facts) = doc.facts {
            return Ok(facts);
        }

        let subject = format!("resume {}", doc.id);
        let facts = self
            .analyzer
            .analyze(doc.id, &doc.text, taxonomy)
            .await
            .map_err(|e| MatchError::from_analyzer(&e, &subject))?;

        let saved = self
            .resumes
            .save_facts(doc.id, doc.version, &facts, self.clock.now())
            .await
            .map_err(|e| MatchError::from_store(&e, &subject))?;
        if saved {
            return Ok(facts);
        }

        // Someone else attached facts to this version first; theirs are the record.
        match self.load_resume(doc.id).await? {
            ResumeDocument {
                version,
                facts: Some(stored),
                ..
            } if version == doc.version => Ok(stored),
            _ => Ok(facts),
        }
    }

    async fn compute(
        &self,
        resume: ResumeDocument,
        job: JobRow,
        taxonomy: Arc<Taxonomy>,
    ) -> Result<MatchRecord, MatchError> {
        let (resume_id, job_id) = (resume.id, job.id);
        let facts = self.ensure_facts(resume, &taxonomy).await?;
        let job_facts = normalize(&job, &taxonomy)?;

        let breakdown = self.scorer.score(&facts, &job_facts, &taxonomy);
        let record = MatchRecord {
            id: Uuid::new_v4(),
            resume_id,
            job_id,
            skills: breakdown.sub_scores.skills,
            experience: breakdown.sub_scores.experience,
            salary: breakdown.sub_scores.salary,
            location: breakdown.sub_scores.location,
            total_score: breakdown.total,
            scorer_version: self.scorer.version().to_string(),
            calculated_at: self.clock.now(),
        };

        let stored = self
            .repository
            .upsert(&record)
            .await
            .map_err(|e| MatchError::from_repository(&e, format!("resume {resume_id} / job {job_id}")))?;
        info!(
            resume_id = %resume_id,
            job_id = %job_id,
            total_score = stored.total_score,
            taxonomy_version = taxonomy.version(),
            "Match scored"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::taxonomy::sample_rows;
    use crate::testing::{job_row, resume_facts, Harness, StubChat, RESUME_REPLY};

    const RESUME_TEXT: &str =
        "Jane Doe\njane@example.com\nBackend engineer, five years of Python and SQL in Berlin.";

    fn stub() -> StubChat {
        StubChat::replying(vec![Ok(RESUME_REPLY.to_string())])
    }

    #[tokio::test]
    async fn test_match_score_for_analyzed_resume() {
        let h = Harness::new(stub());
        let job_id = h.seed_job();
        let resume_id = h.seed_analyzed_resume(resume_facts());

        let record = h.pipeline.match_score(resume_id, job_id).await.unwrap();

        assert!((record.skills - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(record.experience, 1.0);
        assert!((record.salary - 0.75).abs() < 1e-9);
        assert_eq!(record.location, 1.0);
        assert!((record.total_score - 79.166_666_666).abs() < 1e-6);
        assert_eq!(record.calculated_at, h.clock.now());
        assert_eq!(h.chat.calls(), 0);
        assert_eq!(h.repository.len(), 1);
    }

    #[tokio::test]
    async fn test_repeat_request_is_served_from_cache() {
        let h = Harness::new(stub());
        let job_id = h.seed_job();
        let resume_id = h.seed_analyzed_resume(resume_facts());

        let first = h.pipeline.match_score(resume_id, job_id).await.unwrap();
        let second = h.pipeline.match_score(resume_id, job_id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.repository.writes(), 1);
        assert_eq!(h.pipeline.cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_analyze_once() {
        let h = Harness::new(stub());
        let job_id = h.seed_job();
        let resume_id = Uuid::new_v4();
        h.resumes
            .store_document(resume_id, "text/plain", RESUME_TEXT, h.clock.now())
            .await
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pipeline = h.pipeline.clone();
                tokio::spawn(async move { pipeline.match_score(resume_id, job_id).await })
            })
            .collect();
        let mut records = Vec::new();
        for handle in handles {
            records.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(h.chat.calls(), 1);
        assert_eq!(h.repository.writes(), 1);
        assert!(records.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_empty_document_fails_before_llm_and_storage() {
        let h = Harness::new(stub());
        let id = Uuid::new_v4();

        let err = h
            .pipeline
            .ingest_resume(Some(id), "text/plain", Bytes::from_static(b"  hi x  "))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::EmptyDocument);
        assert_eq!(err.stage, Stage::Extract);
        assert_eq!(h.chat.calls(), 0);
        assert!(h.resumes.get(id).await.unwrap().is_none());
        let stats = h.pipeline.cache_stats();
        assert_eq!(stats.entries + stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_unsupported_format_is_rejected() {
        let h = Harness::new(stub());
        let err = h
            .pipeline
            .ingest_resume(None, "image/png", Bytes::from_static(b"\x89PNG......."))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedFormat);
    }

    #[tokio::test]
    async fn test_ingest_stores_versions_and_facts() {
        let h = Harness::new(stub());
        let id = Uuid::new_v4();

        let first = h
            .pipeline
            .ingest_resume(Some(id), "text/plain", Bytes::from_static(RESUME_TEXT.as_bytes()))
            .await
            .unwrap();
        assert_eq!(first.version, 1);
        let facts = first.facts.unwrap();
        assert!(facts.skills.contains("skill:python"));
        assert_eq!(facts.id, id);

        let second = h
            .pipeline
            .ingest_resume(Some(id), "text/plain", Bytes::from_static(RESUME_TEXT.as_bytes()))
            .await
            .unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(h.chat.calls(), 2);
        assert!(h.pipeline.resume(id).await.unwrap().facts.is_some());
    }

    #[tokio::test]
    async fn test_new_resume_version_misses_the_cache() {
        let h = Harness::new(stub());
        let job_id = h.seed_job();
        let id = Uuid::new_v4();
        let body = Bytes::from_static(RESUME_TEXT.as_bytes());

        h.pipeline
            .ingest_resume(Some(id), "text/plain", body.clone())
            .await
            .unwrap();
        h.pipeline.match_score(id, job_id).await.unwrap();
        h.pipeline
            .ingest_resume(Some(id), "text/plain", body)
            .await
            .unwrap();
        h.pipeline.match_score(id, job_id).await.unwrap();

        assert_eq!(h.repository.writes(), 2);
        assert_eq!(h.repository.len(), 1);
    }

    #[tokio::test]
    async fn test_unpublished_job_is_not_eligible() {
        let h = Harness::new(stub());
        let mut row = job_row();
        row.status = "draft".to_string();
        let job_id = row.id;
        h.jobs.insert(row);
        let resume_id = h.seed_analyzed_resume(resume_facts());

        let err = h.pipeline.match_score(resume_id, job_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::JobNotEligible);
        assert_eq!(h.repository.len(), 0);
    }

    #[tokio::test]
    async fn test_missing_entities_are_not_found() {
        let h = Harness::new(stub());
        let job_id = h.seed_job();

        let err = h
            .pipeline
            .match_score(Uuid::new_v4(), job_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(err.subject.starts_with("resume "));

        let err = h
            .pipeline
            .match_score(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(err.subject.starts_with("job "));
    }

    #[tokio::test]
    async fn test_invalid_job_is_a_validation_failure() {
        let h = Harness::new(stub());
        let mut row = job_row();
        row.min_experience = Some(9);
        row.max_experience = Some(2);
        let job_id = row.id;
        h.jobs.insert(row);
        let resume_id = h.seed_analyzed_resume(resume_facts());

        let err = h.pipeline.match_score(resume_id, job_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::JobValidation);
        assert_eq!(err.stage, Stage::Normalize);
        assert_eq!(err.subject, format!("job {job_id}"));
    }

    #[tokio::test]
    async fn test_llm_failure_is_not_cached() {
        let chat = StubChat::replying(vec![
            Err(LlmError::Api {
                status: 503,
                message: "overloaded".to_string(),
            }),
            Ok(RESUME_REPLY.to_string()),
        ]);
        let h = Harness::new(chat);
        let job_id = h.seed_job();
        let resume_id = Uuid::new_v4();
        h.resumes
            .store_document(resume_id, "text/plain", RESUME_TEXT, h.clock.now())
            .await
            .unwrap();

        let err = h.pipeline.match_score(resume_id, job_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::LlmTransport);
        assert!(err.is_retryable());
        assert_eq!(h.pipeline.cache_stats().entries, 0);

        assert!(h.pipeline.match_score(resume_id, job_id).await.is_ok());
        assert_eq!(h.chat.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pipeline_deadline_aborts_and_clears_marker() {
        let chat = stub().with_delay(Duration::from_secs(45));
        let h = Harness::with_deadline(chat, Duration::from_secs(30));
        let job_id = h.seed_job();
        let resume_id = Uuid::new_v4();
        h.resumes
            .store_document(resume_id, "text/plain", RESUME_TEXT, h.clock.now())
            .await
            .unwrap();

        let err = h.pipeline.match_score(resume_id, job_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.stage, Stage::Pipeline);
        assert_eq!(h.pipeline.cache_stats().in_flight, 0);
        assert_eq!(h.repository.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_job_read_is_bounded_by_deadline() {
        let h = Harness::with_deadline(stub(), Duration::from_secs(30));
        let job_id = h.seed_job();
        let resume_id = h.seed_analyzed_resume(resume_facts());
        h.jobs.stall_reads(Duration::from_secs(3600));

        let started = tokio::time::Instant::now();
        let err = h.pipeline.match_score(resume_id, job_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(31));

        let err = h
            .pipeline
            .interview_questions(resume_id, job_id, 3)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(h.pipeline.cache_stats().in_flight, 0);
    }

    #[tokio::test]
    async fn test_taxonomy_reload_evicts_and_rescores() {
        let h = Harness::new(stub());
        let job_id = h.seed_job();
        let resume_id = h.seed_analyzed_resume(resume_facts());
        h.pipeline.match_score(resume_id, job_id).await.unwrap();

        let reload = h.pipeline.reload_taxonomy(sample_rows()).unwrap();
        assert_eq!(reload.version, 2);
        assert_eq!(reload.evicted, 1);
        assert_eq!(h.pipeline.taxonomy_version(), 2);

        h.pipeline.match_score(resume_id, job_id).await.unwrap();
        assert_eq!(h.repository.writes(), 2);
    }

    #[tokio::test]
    async fn test_bad_taxonomy_reload_keeps_snapshot() {
        let h = Harness::new(stub());
        let mut rows = sample_rows();
        rows[0].importance_weight = Some(f64::NAN);

        let err = h.pipeline.reload_taxonomy(rows).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TaxonomyConflict);
        assert_eq!(h.taxonomy.snapshot().version(), 1);
    }

    #[tokio::test]
    async fn test_top_k_ranks_stored_matches() {
        let h = Harness::new(stub());
        let job_id = h.seed_job();
        let strong = h.seed_analyzed_resume(resume_facts());
        let mut weak_facts = resume_facts();
        weak_facts.skills.remove("skill:sql");
        let weak = h.seed_analyzed_resume(weak_facts);

        h.pipeline.match_score(weak, job_id).await.unwrap();
        h.pipeline.match_score(strong, job_id).await.unwrap();

        let top = h.pipeline.top_for_job(job_id, 10).await.unwrap();
        let order: Vec<Uuid> = top.iter().map(|r| r.resume_id).collect();
        assert_eq!(order, vec![strong, weak]);
        assert_eq!(h.pipeline.top_for_resume(weak, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_job_transition_controls_eligibility() {
        let h = Harness::new(stub());
        let mut row = job_row();
        row.status = "draft".to_string();
        row.published_at = None;
        let job_id = row.id;
        h.jobs.insert(row);
        let resume_id = h.seed_analyzed_resume(resume_facts());

        let published = h
            .pipeline
            .transition_job(job_id, JobStatus::Published)
            .await
            .unwrap();
        assert_eq!(published.published_at, Some(h.clock.now()));
        assert!(h.pipeline.match_score(resume_id, job_id).await.is_ok());

        let err = h
            .pipeline
            .transition_job(job_id, JobStatus::Draft)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::JobValidation);
    }

    #[tokio::test]
    async fn test_interview_questions_use_stored_facts() {
        let reply = r#"{"questions": [
            {"question": "How would you containerize a Python service?", "skill": "Docker", "difficulty": "intermediate"}
        ]}"#;
        let h = Harness::new(StubChat::replying(vec![Ok(reply.to_string())]));
        let job_id = h.seed_job();
        let resume_id = h.seed_analyzed_resume(resume_facts());

        let questions = h
            .pipeline
            .interview_questions(resume_id, job_id, 3)
            .await
            .unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(h.chat.calls(), 1);
        assert!(h.chat.request(0)[1].content.contains("Backend Engineer"));
    }
}
