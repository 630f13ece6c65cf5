//! OpenRouter multi-model gateway. Same wire format as the local server,
//! plus bearer auth and the referer header OpenRouter uses for attribution.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::chat::{ChatCompletionRequest, ChatCompletionResponse};
use super::{decode_response, join_url, LlmError, NormalizedLlmResponse, ProviderClient};

pub const PROVIDER_ID: &str = "openrouter";

#[derive(Clone)]
pub struct OpenRouterProvider {
    http: Client,
    url: String,
    api_key: String,
    model: String,
    referer: String,
}

impl OpenRouterProvider {
    pub fn new(
        http: Client,
        endpoint: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        referer: impl Into<String>,
    ) -> Self {
        Self {
            http,
            url: join_url(endpoint, "v1/chat/completions"),
            api_key: api_key.into(),
            model: model.into(),
            referer: referer.into(),
        }
    }
}

#[async_trait]
impl ProviderClient for OpenRouterProvider {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn analyze(&self, prompt: &str) -> Result<NormalizedLlmResponse, LlmError> {
        debug!("Calling {PROVIDER_ID} provider (model: {})", self.model);

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .json(&ChatCompletionRequest::single_prompt(&self.model, prompt))
            .send()
            .await
            .map_err(|e| LlmError::transport(PROVIDER_ID, e))?;

        let body: ChatCompletionResponse = decode_response(PROVIDER_ID, response).await?;
        body.normalize(PROVIDER_ID)
    }
}
