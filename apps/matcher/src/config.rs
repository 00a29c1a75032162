use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::extraction::DocumentKind;

const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Durable cache tier; in-memory only when unset.
    pub redis_url: Option<String>,
    pub llm_base_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub pipeline_deadline_secs: u64,
    pub max_upload_bytes: usize,
    pub allowed_formats: Vec<DocumentKind>,
    /// Path to a JSON file of skill rows, or a `postgres://` DSN.
    pub taxonomy_source: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: optional_env("REDIS_URL"),
            llm_base_url: optional_env("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            llm_api_key: require_env("LLM_API_KEY")?,
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_temperature: parse_env("LLM_TEMPERATURE", 0.2)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECONDS", 60)?,
            cache_ttl_secs: parse_env("CACHE_TTL_SECONDS", 3600)?,
            pipeline_deadline_secs: parse_env("PIPELINE_DEADLINE_SECONDS", 90)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 16 * 1024 * 1024)?,
            allowed_formats: parse_formats(
                optional_env("ALLOWED_EXTENSIONS").as_deref().unwrap_or("pdf,docx,doc,txt"),
            )?,
            taxonomy_source: require_env("TAXONOMY_SOURCE")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

/// Comma-separated extensions, each one of the supported formats.
fn parse_formats(raw: &str) -> Result<Vec<DocumentKind>> {
    let mut kinds = Vec::new();
    for ext in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let ext = ext.trim_start_matches('.').to_lowercase();
        let Some(kind) = DocumentKind::ALL.iter().find(|k| k.extension() == ext) else {
            bail!("ALLOWED_EXTENSIONS lists unsupported format '{ext}'");
        };
        if !kinds.contains(kind) {
            kinds.push(*kind);
        }
    }
    if kinds.is_empty() {
        bail!("ALLOWED_EXTENSIONS must name at least one format");
    }
    Ok(kinds)
}
