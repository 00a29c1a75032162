use crate::config::Config;
use crate::matching::MatchPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: MatchPipeline,
    pub config: Config,
}
