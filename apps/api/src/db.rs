use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the results table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analysis_results (
            id              UUID PRIMARY KEY,
            filename        TEXT NOT NULL,
            provider_id     TEXT NOT NULL,
            candidate_name  TEXT NOT NULL,
            match_score     DOUBLE PRECISION NOT NULL,
            analyzed_at     TIMESTAMPTZ NOT NULL,
            archive_key     TEXT,
            details         JSONB NOT NULL,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS analysis_results_analyzed_at_idx ON analysis_results (analyzed_at DESC)",
    )
    .execute(pool)
    .await?;

    info!("analysis_results schema ready");
    Ok(())
}
