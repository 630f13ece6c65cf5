use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use super::{AnalysisRecord, ResultStore, StorageError};
use crate::models::result::{AnalysisResultRow, RESULT_ROW_COLUMNS};

/// History backed by the `analysis_results` table (see `db::ensure_schema`).
#[derive(Clone)]
pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_RESULT: &str = r#"
    INSERT INTO analysis_results
        (id, filename, provider_id, candidate_name, match_score, analyzed_at, archive_key, details)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    record: &AnalysisRecord,
) -> Result<(), sqlx::Error> {
    let a = &record.assessment;
    sqlx::query(INSERT_RESULT)
        .bind(record.id)
        .bind(&a.filename)
        .bind(&a.provider_id)
        .bind(&a.details.candidate_name)
        .bind(a.details.match_score)
        .bind(a.analyzed_at)
        .bind(&record.archive_key)
        .bind(Json(&a.details))
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn save(&self, record: &AnalysisRecord) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        insert(&mut tx, record).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, StorageError> {
        let sql = format!(
            "SELECT {RESULT_ROW_COLUMNS} FROM analysis_results \
             ORDER BY analyzed_at DESC, created_at DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, AnalysisResultRow>(&sql)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().rev().map(AnalysisRecord::from).collect())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM analysis_results")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn replace_all(&self, records: Vec<AnalysisRecord>) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM analysis_results")
            .execute(&mut *tx)
            .await?;
        for record in &records {
            insert(&mut tx, record).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
