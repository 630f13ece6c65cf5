// Resume analysis: prompt building, response parsing, orchestration, and the
// HTTP handlers that feed it extracted resume text.
// All model calls go through llm_client::ProviderClient.

use thiserror::Error;

use crate::llm_client::LlmError;

pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod prompts;

pub use models::{AnalysisRequest, CandidateAssessment, ParsedAssessment};
pub use orchestrator::run_analysis;

/// Everything that can go wrong between "prompt built" and "assessment
/// returned". Provider errors pass through untouched.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Provider(#[from] LlmError),

    #[error("Model output is not valid JSON ({detail}): {raw}")]
    MalformedJson { detail: String, raw: String },

    #[error("Model output is missing or mistyped field `{field}`")]
    MissingField { field: String },

    #[error("match_score {value} is outside 0-100")]
    ScoreOutOfRange { value: f64 },
}
