//! Result history: where completed assessments go after analysis.
//!
//! Storage is best-effort from the analysis point of view. Handlers log a
//! failed `save` and still return the assessment.
//!
//! `AppState` holds an `Arc<dyn ResultStore>`: Postgres when `DATABASE_URL`
//! is set, in-memory otherwise.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::analysis::parser::check_score;
use crate::analysis::CandidateAssessment;

pub mod export;
pub mod handlers;
pub mod postgres;

pub use postgres::PgResultStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid import data: {0}")]
    InvalidImport(String),

    #[error("Export failed: {0}")]
    Export(String),
}

/// An assessment as stored and served: its id, the assessment itself, and
/// where the original PDF was archived, if anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub assessment: CandidateAssessment,
    #[serde(default)]
    pub archive_key: Option<String>,
}

impl AnalysisRecord {
    pub fn new(assessment: CandidateAssessment, archive_key: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            assessment,
            archive_key,
        }
    }
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn save(&self, record: &AnalysisRecord) -> Result<(), StorageError>;

    /// The newest `limit` records, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;

    /// Replaces the whole history, e.g. from an exported JSON file.
    async fn replace_all(&self, records: Vec<AnalysisRecord>) -> Result<(), StorageError>;
}

/// Process-local history. Lost on restart.
#[derive(Default)]
pub struct MemoryResultStore {
    records: RwLock<Vec<AnalysisRecord>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn save(&self, record: &AnalysisRecord) -> Result<(), StorageError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, StorageError> {
        let records = self.records.read().await;
        let start = records.len().saturating_sub(limit);
        Ok(records[start..].to_vec())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.records.write().await.clear();
        Ok(())
    }

    async fn replace_all(&self, records: Vec<AnalysisRecord>) -> Result<(), StorageError> {
        *self.records.write().await = records;
        Ok(())
    }
}

/// Parses an import payload. Must be a JSON array of records, each with a
/// score in 0..=100. One bad record rejects the whole import.
pub fn parse_import(value: serde_json::Value) -> Result<Vec<AnalysisRecord>, StorageError> {
    if !value.is_array() {
        return Err(StorageError::InvalidImport(
            "expected a JSON array of results".to_string(),
        ));
    }
    let records: Vec<AnalysisRecord> =
        serde_json::from_value(value).map_err(|e| StorageError::InvalidImport(e.to_string()))?;

    for record in &records {
        check_score(record.assessment.details.match_score).map_err(|e| {
            StorageError::InvalidImport(format!("{}: {e}", record.assessment.filename))
        })?;
    }
    Ok(records)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::analysis::models::{Education, ParsedAssessment};
    use chrono::{TimeZone, Utc};

    pub(crate) fn sample_record(name: &str, score: f64) -> AnalysisRecord {
        AnalysisRecord::new(
            CandidateAssessment {
                details: ParsedAssessment {
                    candidate_name: name.to_string(),
                    education: Education {
                        degree: "BS".to_string(),
                        field: "Computer Science".to_string(),
                        school: "MIT".to_string(),
                    },
                    years_experience: "4 years".to_string(),
                    relevant_skills: vec!["Rust".to_string(), "SQL".to_string()],
                    experience_highlights: vec!["Shipped billing, v2".to_string()],
                    match_score: score,
                    match_rationale: "Good \"systems\" depth".to_string(),
                },
                filename: format!("{}.pdf", name.to_lowercase()),
                analyzed_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                provider_id: "local".to_string(),
            },
            None,
        )
    }

    #[tokio::test]
    async fn test_memory_recent_returns_newest_in_order() {
        let store = MemoryResultStore::new();
        for (i, name) in ["Ann", "Ben", "Cal"].iter().enumerate() {
            store.save(&sample_record(name, i as f64)).await.unwrap();
        }

        let recent = store.recent(2).await.unwrap();
        let names: Vec<_> = recent
            .iter()
            .map(|r| r.assessment.details.candidate_name.as_str())
            .collect();
        assert_eq!(names, vec!["Ben", "Cal"]);
        assert_eq!(store.recent(100).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_memory_clear_and_replace() {
        let store = MemoryResultStore::new();
        store.save(&sample_record("Ann", 50.0)).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.recent(10).await.unwrap().is_empty());

        store
            .replace_all(vec![sample_record("Ben", 1.0), sample_record("Cal", 2.0)])
            .await
            .unwrap();
        assert_eq!(store.recent(10).await.unwrap().len(), 2);
    }

    #[test]
    fn test_record_json_is_flat() {
        let record = sample_record("Ann", 70.0);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["candidate_name"], "Ann");
        assert_eq!(value["provider"], "local");
        assert!(value["id"].is_string());
        assert!(value["archive_key"].is_null());

        let back: AnalysisRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_parse_import_rejects_non_array() {
        let err = parse_import(serde_json::json!({"results": []})).unwrap_err();
        assert!(matches!(err, StorageError::InvalidImport(_)));
    }

    #[test]
    fn test_parse_import_accepts_exported_records() {
        let exported = serde_json::to_value(vec![sample_record("Ann", 10.0)]).unwrap();
        let records = parse_import(exported).unwrap();
        assert_eq!(records[0].assessment.details.candidate_name, "Ann");
    }

    #[test]
    fn test_parse_import_rejects_out_of_range_score() {
        let mut exported =
            serde_json::to_value(vec![sample_record("Ann", 10.0), sample_record("Ben", 20.0)])
                .unwrap();
        exported[1]["match_score"] = serde_json::json!(250);

        match parse_import(exported).unwrap_err() {
            StorageError::InvalidImport(msg) => {
                assert!(msg.contains("ben.pdf"), "{msg}");
                assert!(msg.contains("250"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
