//! CSV and JSON downloads of the result history.

use super::{AnalysisRecord, StorageError};

const CSV_HEADERS: [&str; 10] = [
    "Timestamp",
    "Candidate Name",
    "Match Score",
    "Years Experience",
    "Education",
    "Relevant Skills",
    "Experience Highlights",
    "Match Rationale",
    "File Name",
    "Archive Key",
];

pub fn to_csv(records: &[AnalysisRecord]) -> Result<String, StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADERS)
        .map_err(|e| StorageError::Export(e.to_string()))?;

    for record in records {
        let a = &record.assessment;
        let d = &a.details;
        writer
            .write_record([
                a.analyzed_at.to_rfc3339(),
                d.candidate_name.clone(),
                d.match_score.to_string(),
                d.years_experience.clone(),
                d.education.summary(),
                d.relevant_skills.join("; "),
                d.experience_highlights.join("; "),
                d.match_rationale.clone(),
                a.filename.clone(),
                record.archive_key.clone().unwrap_or_default(),
            ])
            .map_err(|e| StorageError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StorageError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StorageError::Export(e.to_string()))
}

pub fn to_json(records: &[AnalysisRecord]) -> Result<String, StorageError> {
    serde_json::to_string_pretty(records).map_err(|e| StorageError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::sample_record;

    #[test]
    fn test_csv_header_row() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(
            csv.trim_end(),
            "Timestamp,Candidate Name,Match Score,Years Experience,Education,Relevant Skills,Experience Highlights,Match Rationale,File Name,Archive Key"
        );
    }

    #[test]
    fn test_csv_row_formats_and_quotes() {
        let mut record = sample_record("Ann", 88.0);
        record.archive_key = Some("resumes/2024-03-01/x-ann.pdf".to_string());
        let csv = to_csv(&[record]).unwrap();
        let row = csv.lines().nth(1).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let fields: Vec<String> = reader
            .records()
            .next()
            .unwrap()
            .unwrap()
            .iter()
            .map(String::from)
            .collect();

        assert_eq!(fields[0], "2024-03-01T12:00:00+00:00");
        assert_eq!(fields[1], "Ann");
        assert_eq!(fields[2], "88");
        assert_eq!(fields[4], "BS in Computer Science from MIT");
        assert_eq!(fields[5], "Rust; SQL");
        assert_eq!(fields[7], "Good \"systems\" depth");
        assert_eq!(fields[9], "resumes/2024-03-01/x-ann.pdf");
        // Commas and quotes force quoting.
        assert!(row.contains("\"Shipped billing, v2\""));
        assert!(row.contains("\"Good \"\"systems\"\" depth\""));
    }

    #[test]
    fn test_json_export_round_trips_through_import() {
        let records = vec![sample_record("Ann", 1.0), sample_record("Ben", 2.0)];
        let json = to_json(&records).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(crate::storage::parse_import(value).unwrap(), records);
    }
}
