//! Composes prompt → provider → parser → metadata for one resume.

use chrono::Utc;
use tracing::{debug, info};

use super::models::{AnalysisRequest, CandidateAssessment};
use super::parser::parse_assessment;
use super::prompts::build_prompt;
use super::AnalysisError;
use crate::llm_client::ProviderClient;

/// Runs one analysis. Exactly one upstream call, no retries, nothing
/// retained; errors from the provider and the parser propagate unchanged.
pub async fn run_analysis(
    request: &AnalysisRequest,
    provider: &dyn ProviderClient,
) -> Result<CandidateAssessment, AnalysisError> {
    let prompt = build_prompt(&request.job_description, &request.resume_text);
    debug!(
        "Analyzing {} with {} ({} prompt chars)",
        request.source_filename,
        provider.provider_id(),
        prompt.len()
    );

    let response = provider.analyze(&prompt).await?;
    debug!(
        "{} returned {} choice(s)",
        provider.provider_id(),
        response.choices().len()
    );
    let details = parse_assessment(response.text())?;

    info!(
        "Analyzed {}: {} scored {}",
        request.source_filename, details.candidate_name, details.match_score
    );

    Ok(CandidateAssessment {
        details,
        filename: request.source_filename.clone(),
        analyzed_at: Utc::now(),
        provider_id: provider.provider_id().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{LlmError, LocalProvider, NormalizedLlmResponse};
    use async_trait::async_trait;
    use mockito::Server;
    use serde_json::json;
    use std::sync::Mutex;

    const JANE_CONTENT: &str = "```json\n{\"candidate_name\":\"Jane Doe\",\"education\":{\"degree\":\"MBA\",\"field\":\"Business\",\"school\":\"Stanford\"},\"years_experience\":\"6 years\",\"relevant_skills\":[\"Roadmapping\"],\"experience_highlights\":[\"Led launch\"],\"match_score\":88,\"match_rationale\":\"Strong fit\"}\n```";

    fn jane_request() -> AnalysisRequest {
        AnalysisRequest::new(
            "Senior PM, 5 years",
            "Jane Doe, MBA Stanford, 6 years PM",
            "jane.pdf",
        )
    }

    /// Records the prompt it was given and replies with fixed text.
    struct ScriptedProvider {
        reply: String,
        seen_prompt: Mutex<Option<String>>,
    }

    #[async_trait]
    impl ProviderClient for ScriptedProvider {
        fn provider_id(&self) -> &str {
            "scripted"
        }

        async fn analyze(&self, prompt: &str) -> Result<NormalizedLlmResponse, LlmError> {
            *self.seen_prompt.lock().unwrap() = Some(prompt.to_string());
            NormalizedLlmResponse::from_text("scripted", self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_end_to_end_with_mocked_local_server() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": [{"message": {"content": JANE_CONTENT}}]}).to_string())
            .expect(1)
            .create_async()
            .await;

        let provider = LocalProvider::new(reqwest::Client::new(), &server.url(), "local-model");
        let assessment = run_analysis(&jane_request(), &provider).await.unwrap();

        mock.assert_async().await;
        assert_eq!(assessment.details.match_score, 88.0);
        assert_eq!(assessment.details.candidate_name, "Jane Doe");
        assert_eq!(assessment.provider_id, "local");
        assert_eq!(assessment.filename, "jane.pdf");
    }

    #[tokio::test]
    async fn test_upstream_500_propagates_as_request_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let provider = LocalProvider::new(reqwest::Client::new(), &server.url(), "local-model");
        let err = run_analysis(&jane_request(), &provider).await.unwrap_err();

        assert!(
            matches!(
                err,
                AnalysisError::Provider(LlmError::ProviderRequest { status: 500, .. })
            ),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn test_prompt_sent_to_provider_embeds_request() {
        let provider = ScriptedProvider {
            reply: JANE_CONTENT.to_string(),
            seen_prompt: Mutex::new(None),
        };
        let request = jane_request();
        run_analysis(&request, &provider).await.unwrap();

        let seen = provider.seen_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(
            seen,
            build_prompt(&request.job_description, &request.resume_text)
        );
    }

    #[tokio::test]
    async fn test_parser_errors_propagate() {
        let provider = ScriptedProvider {
            reply: r#"{"candidate_name":"A"}"#.to_string(),
            seen_prompt: Mutex::new(None),
        };
        let err = run_analysis(&jane_request(), &provider).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MissingField { ref field } if field == "education"));
    }

    #[tokio::test]
    async fn test_metadata_serializes_alongside_details() {
        let provider = ScriptedProvider {
            reply: JANE_CONTENT.to_string(),
            seen_prompt: Mutex::new(None),
        };
        let assessment = run_analysis(&jane_request(), &provider).await.unwrap();
        let value = serde_json::to_value(&assessment).unwrap();

        assert_eq!(value["candidate_name"], "Jane Doe");
        assert_eq!(value["education"]["degree"], "MBA");
        assert_eq!(value["provider"], "scripted");
        assert_eq!(value["filename"], "jane.pdf");
        assert!(value["analyzed_at"].is_string());
    }
}
