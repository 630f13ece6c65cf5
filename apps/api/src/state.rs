use std::sync::Arc;

use crate::archive::ResumeArchive;
use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::llm_client::ProviderClient;
use crate::storage::ResultStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Resolved once at startup from `LLM_PROVIDER`.
    pub provider: Arc<dyn ProviderClient>,
    pub extractor: Arc<dyn TextExtractor>,
    /// Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn ResultStore>,
    /// Present only when `S3_BUCKET` is configured.
    pub archive: Option<ResumeArchive>,
    pub config: Config,
}
