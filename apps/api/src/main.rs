mod analysis;
mod archive;
mod config;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::archive::ResumeArchive;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::extraction::extractor_for;
use crate::llm_client::ProviderRegistry;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{MemoryResultStore, PgResultStore, ResultStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Resolve the LLM provider now so a missing API key stops startup
    let registry = ProviderRegistry::new(config.llm.clone())?;
    let provider = registry.resolve_configured()?;
    info!(
        "LLM provider: {} (selector: {:?})",
        provider.provider_id(),
        config.llm.provider
    );

    let extractor = extractor_for(&config.pdf_extractor);
    info!("PDF extractor: {}", config.pdf_extractor);

    // Result history: Postgres if configured, otherwise in-memory
    let store: Arc<dyn ResultStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgResultStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set; results are kept in memory");
            Arc::new(MemoryResultStore::new())
        }
    };

    // Optional S3 / MinIO archive for uploaded PDFs
    let archive = match &config.s3 {
        Some(settings) => Some(ResumeArchive::connect(settings).await),
        None => None,
    };

    let state = AppState {
        provider,
        extractor,
        store,
        archive,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
