use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One resume to analyze against one job description.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub job_description: String,
    pub resume_text: String,
    pub source_filename: String,
}

impl AnalysisRequest {
    pub fn new(
        job_description: impl Into<String>,
        resume_text: impl Into<String>,
        source_filename: impl Into<String>,
    ) -> Self {
        Self {
            job_description: job_description.into(),
            resume_text: resume_text.into(),
            source_filename: source_filename.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub field: String,
    pub school: String,
}

impl Education {
    /// "MBA in Business from Stanford", as shown in exports.
    pub fn summary(&self) -> String {
        format!("{} in {} from {}", self.degree, self.field, self.school)
    }
}

/// The six content fields the model must produce. Only built by the
/// response parser, after every field has been validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAssessment {
    pub candidate_name: String,
    pub education: Education,
    pub years_experience: String,
    pub relevant_skills: Vec<String>,
    pub experience_highlights: Vec<String>,
    /// Always within 0–100.
    pub match_score: f64,
    pub match_rationale: String,
}

/// A validated assessment plus the metadata the orchestrator attaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAssessment {
    #[serde(flatten)]
    pub details: ParsedAssessment,
    pub filename: String,
    pub analyzed_at: DateTime<Utc>,
    #[serde(rename = "provider")]
    pub provider_id: String,
}
