use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::{CandidateAssessment, ParsedAssessment};
use crate::storage::AnalysisRecord;

/// The columns of `analysis_results` needed to rebuild a record. The
/// `candidate_name` and `match_score` columns duplicate `details` for SQL
/// sorting and filtering and are not read back.
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisResultRow {
    pub id: Uuid,
    pub filename: String,
    pub provider_id: String,
    pub analyzed_at: DateTime<Utc>,
    pub archive_key: Option<String>,
    pub details: Json<ParsedAssessment>,
}

/// Select list matching `AnalysisResultRow`.
pub const RESULT_ROW_COLUMNS: &str =
    "id, filename, provider_id, analyzed_at, archive_key, details";

impl From<AnalysisResultRow> for AnalysisRecord {
    fn from(row: AnalysisResultRow) -> Self {
        AnalysisRecord {
            id: row.id,
            assessment: CandidateAssessment {
                details: row.details.0,
                filename: row.filename,
                analyzed_at: row.analyzed_at,
                provider_id: row.provider_id,
            },
            archive_key: row.archive_key,
        }
    }
}
