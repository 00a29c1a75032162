pub mod cache;
pub mod durable;
pub mod error;
pub mod fingerprint;
pub mod handlers;
pub mod pipeline;
pub mod scorer;
pub mod vectorizer;

pub use error::{ErrorKind, MatchError, Stage};
pub use pipeline::{MatchPipeline, PipelineContext};
