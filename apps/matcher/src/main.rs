mod analyzer;
mod clock;
mod config;
mod db;
mod errors;
mod extraction;
mod jobs;
mod llm_client;
mod matching;
mod models;
mod repository;
mod resumes;
mod routes;
mod state;
mod taxonomy;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analyzer::prompts::PromptSet;
use crate::analyzer::{InterviewQuestionGenerator, ResumeAnalyzer};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::TextExtractor;
use crate::jobs::PgJobStore;
use crate::llm_client::{ChatBackend, LlmClient};
use crate::matching::cache::MatchCache;
use crate::matching::durable::{DurableCache, RedisCache};
use crate::matching::scorer::WeightedScorer;
use crate::matching::{MatchPipeline, PipelineContext};
use crate::repository::PgMatchRepository;
use crate::resumes::PgResumeStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::taxonomy::loader::load_rows;
use crate::taxonomy::registry::TaxonomyRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting matcher v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Skills taxonomy, version 1
    let taxonomy = Arc::new(TaxonomyRegistry::new(
        load_rows(&config.taxonomy_source).await?,
    )?);

    // Optional Redis tier behind the in-memory match cache
    let durable: Option<Arc<dyn DurableCache>> = match &config.redis_url {
        Some(url) => match RedisCache::connect(url).await {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                warn!("Redis unavailable ({e}); match cache runs in-memory only");
                None
            }
        },
        None => None,
    };

    // Initialize LLM client
    let llm_timeout = Duration::from_secs(config.llm_timeout_secs);
    let llm = LlmClient::new(
        &config.llm_base_url,
        config.llm_api_key.clone(),
        config.llm_model.clone(),
        config.llm_temperature,
        llm_timeout,
    )?;
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        llm.model(),
        llm.endpoint()
    );
    let chat: Arc<dyn ChatBackend> = Arc::new(llm);

    let clock = Arc::new(SystemClock);
    let pipeline = MatchPipeline::new(PipelineContext {
        extractor: TextExtractor::new(config.max_upload_bytes, config.allowed_formats.clone()),
        analyzer: ResumeAnalyzer::new(chat.clone(), PromptSet::resume_default(), llm_timeout),
        interviewer: InterviewQuestionGenerator::new(
            chat,
            PromptSet::interview_default(),
            llm_timeout,
        ),
        taxonomy,
        scorer: Arc::new(WeightedScorer::default()),
        resumes: Arc::new(PgResumeStore::new(db.clone())),
        jobs: Arc::new(PgJobStore::new(db.clone())),
        repository: Arc::new(PgMatchRepository::new(db)),
        cache: MatchCache::new(
            chrono::Duration::seconds(config.cache_ttl_secs as i64),
            clock.clone(),
            durable,
        ),
        clock,
        deadline: Duration::from_secs(config.pipeline_deadline_secs),
    });
    info!(
        "Match pipeline ready (scorer: {}, cache TTL: {}s, deadline: {}s)",
        pipeline.scorer_version(),
        config.cache_ttl_secs,
        config.pipeline_deadline_secs
    );

    // Build app state
    let state = AppState {
        pipeline,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
