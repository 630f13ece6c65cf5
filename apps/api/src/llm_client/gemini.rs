//! Google Gemini `generateContent`. The request nests the prompt under
//! `contents[].parts[]` and the reply nests text under
//! `candidates[].content.parts[]`; both are translated here.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    decode_response, join_url, ChatMessage, Choice, LlmError, NormalizedLlmResponse,
    ProviderClient, TEMPERATURE,
};

pub const PROVIDER_ID: &str = "gemini";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl Candidate {
    fn first_text(self) -> Option<String> {
        self.content?.parts?.into_iter().next()?.text
    }
}

impl GenerateContentResponse {
    /// The first candidate must carry `content.parts[0].text`; later
    /// candidates without text are dropped.
    fn normalize(self, provider: &str) -> Result<NormalizedLlmResponse, LlmError> {
        let mut candidates = self
            .candidates
            .ok_or_else(|| LlmError::shape(provider, "missing `candidates` array"))?
            .into_iter();

        let first = candidates
            .next()
            .ok_or_else(|| LlmError::shape(provider, "response contained no candidates"))?
            .first_text()
            .ok_or_else(|| {
                LlmError::shape(provider, "first candidate has no `content.parts[0].text`")
            })?;

        let choices = std::iter::once(first)
            .chain(candidates.filter_map(Candidate::first_text))
            .map(|content| Choice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content,
                },
            })
            .collect();

        NormalizedLlmResponse::from_choices(provider, choices)
    }
}

#[derive(Clone)]
pub struct GeminiProvider {
    http: Client,
    url: String,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(http: Client, endpoint: &str, model: &str, api_key: impl Into<String>) -> Self {
        Self {
            http,
            url: join_url(endpoint, &format!("v1beta/models/{model}:generateContent")),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ProviderClient for GeminiProvider {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn analyze(&self, prompt: &str) -> Result<NormalizedLlmResponse, LlmError> {
        debug!("Calling {PROVIDER_ID} provider at {}", self.url);

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::transport(PROVIDER_ID, e))?;

        let body: GenerateContentResponse = decode_response(PROVIDER_ID, response).await?;
        body.normalize(PROVIDER_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const PATH: &str = "/v1beta/models/gemini-pro:generateContent";

    fn provider(url: &str) -> GeminiProvider {
        GeminiProvider::new(Client::new(), url, "gemini-pro", "g-key")
    }

    #[tokio::test]
    async fn test_analyze_translates_candidates_into_choices() {
        let inner = r#"{"candidate_name":"Jane"}"#;
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "g-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"parts": [{"text": "the prompt"}]}]
            })))
            .with_status(200)
            .with_body(json!({"candidates": [{"content": {"parts": [{"text": inner}]}}]}).to_string())
            .create_async()
            .await;

        let response = provider(&server.url()).analyze("the prompt").await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.text(), inner);
        assert_eq!(response.choices()[0].message.role, "assistant");
    }

    #[tokio::test]
    async fn test_analyze_missing_candidates_is_shape_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;

        let err = provider(&server.url()).analyze("x").await.unwrap_err();
        assert!(err.to_string().contains("candidates"), "{err}");
    }

    #[tokio::test]
    async fn test_analyze_missing_parts_is_shape_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"role":"model"},"finishReason":"SAFETY"}]}"#)
            .create_async()
            .await;

        let err = provider(&server.url()).analyze("x").await.unwrap_err();
        assert!(matches!(err, LlmError::ProviderResponseShape { .. }));
    }

    #[tokio::test]
    async fn test_analyze_server_error_is_request_error() {
        let mut server = Server::new_async().await;
        server.mock("POST", PATH).with_status(503).create_async().await;

        let err = provider(&server.url()).analyze("x").await.unwrap_err();
        assert!(matches!(err, LlmError::ProviderRequest { status: 503, .. }));
    }

    #[test]
    fn test_normalize_skips_later_candidates_without_text() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}]}},
                {"finishReason": "SAFETY"},
                {"content": {"parts": [{"text": "third"}]}}
            ]
        }))
        .unwrap();

        let normalized = body.normalize(PROVIDER_ID).unwrap();
        let texts: Vec<_> = normalized
            .choices()
            .iter()
            .map(|c| c.message.content.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "third"]);
    }
}
