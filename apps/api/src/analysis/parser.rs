//! Response parser: raw model text → validated `ParsedAssessment`.
//!
//! 1. Strip a literal code fence (```json / ```) if the model added one.
//! 2. Parse JSON.
//! 3. Check fields in a fixed order, failing on the first missing or
//!    mistyped one. Partially valid assessments are never returned.

use serde_json::{Map, Value};

use super::models::{Education, ParsedAssessment};
use super::AnalysisError;

/// Raw model output kept in errors is cut to this many characters.
const MAX_RAW_SNIPPET_LEN: usize = 256;

/// Strips ```json ... ``` or ``` ... ``` wrapping. Only the exact fence
/// markers at the very start and end are removed; anything else is left as is.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let inner = inner.trim_start();
    inner
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(inner)
}

pub fn parse_assessment(raw: &str) -> Result<ParsedAssessment, AnalysisError> {
    let payload = strip_code_fence(raw);

    let value: Value =
        serde_json::from_str(payload).map_err(|e| malformed(e.to_string(), raw))?;
    let obj = value
        .as_object()
        .ok_or_else(|| malformed("expected a JSON object", raw))?;

    let candidate_name = string_field(obj, "candidate_name")?;
    let education = education_field(obj)?;
    let years_experience = string_field(obj, "years_experience")?;
    let relevant_skills = string_list_field(obj, "relevant_skills")?;
    let experience_highlights = string_list_field(obj, "experience_highlights")?;
    let match_score = score_field(obj)?;
    let match_rationale = string_field(obj, "match_rationale")?;

    Ok(ParsedAssessment {
        candidate_name,
        education,
        years_experience,
        relevant_skills,
        experience_highlights,
        match_score,
        match_rationale,
    })
}

fn malformed(detail: impl Into<String>, raw: &str) -> AnalysisError {
    AnalysisError::MalformedJson {
        detail: detail.into(),
        raw: raw.chars().take(MAX_RAW_SNIPPET_LEN).collect(),
    }
}

fn missing(field: &str) -> AnalysisError {
    AnalysisError::MissingField {
        field: field.to_string(),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Result<String, AnalysisError> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| missing(key))
}

fn string_list_field(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>, AnalysisError> {
    let items = obj
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| missing(key))?;
    items
        .iter()
        .map(|item| item.as_str().map(String::from).ok_or_else(|| missing(key)))
        .collect()
}

fn education_field(obj: &Map<String, Value>) -> Result<Education, AnalysisError> {
    let edu = obj
        .get("education")
        .and_then(Value::as_object)
        .ok_or_else(|| missing("education"))?;

    let sub = |key: &str| {
        edu.get(key)
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| missing(&format!("education.{key}")))
    };

    Ok(Education {
        degree: sub("degree")?,
        field: sub("field")?,
        school: sub("school")?,
    })
}

fn score_field(obj: &Map<String, Value>) -> Result<f64, AnalysisError> {
    let score = obj
        .get("match_score")
        .and_then(Value::as_f64)
        .ok_or_else(|| missing("match_score"))?;
    check_score(score)
}

/// Scores live in 0..=100. Anything else is rejected, never clamped.
pub fn check_score(score: f64) -> Result<f64, AnalysisError> {
    if !(0.0..=100.0).contains(&score) {
        return Err(AnalysisError::ScoreOutOfRange { value: score });
    }
    Ok(score)
}
