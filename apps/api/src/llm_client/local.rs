//! Local OpenAI-compatible server (LM Studio, llama.cpp, Ollama's compat API).

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::chat::{ChatCompletionRequest, ChatCompletionResponse};
use super::{decode_response, join_url, LlmError, NormalizedLlmResponse, ProviderClient};

pub const PROVIDER_ID: &str = "local";

#[derive(Clone)]
pub struct LocalProvider {
    http: Client,
    url: String,
    model: String,
}

impl LocalProvider {
    pub fn new(http: Client, endpoint: &str, model: impl Into<String>) -> Self {
        Self {
            http,
            url: join_url(endpoint, "v1/chat/completions"),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ProviderClient for LocalProvider {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn analyze(&self, prompt: &str) -> Result<NormalizedLlmResponse, LlmError> {
        debug!("Calling {PROVIDER_ID} provider at {} (model: {})", self.url, self.model);

        let response = self
            .http
            .post(&self.url)
            .json(&ChatCompletionRequest::single_prompt(&self.model, prompt))
            .send()
            .await
            .map_err(|e| LlmError::transport(PROVIDER_ID, e))?;

        let body: ChatCompletionResponse = decode_response(PROVIDER_ID, response).await?;
        body.normalize(PROVIDER_ID)
    }
}
