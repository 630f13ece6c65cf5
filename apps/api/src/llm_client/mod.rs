/// LLM client: every upstream model call in the screener goes through a
/// `ProviderClient` from this module.
///
/// Providers speak different wire formats. Each variant translates its
/// upstream payload into `NormalizedLlmResponse` (the chat-completions
/// shape) before returning, so nothing downstream knows which provider ran.
///
/// One request per `analyze` call. No retry, no backoff, no streaming.
use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod chat;
pub mod gemini;
pub mod local;
pub mod openrouter;
pub mod registry;

pub use gemini::GeminiProvider;
pub use local::LocalProvider;
pub use openrouter::OpenRouterProvider;
pub use registry::ProviderRegistry;

/// Sampling temperature sent to every provider.
pub const TEMPERATURE: f32 = 0.2;

const MAX_ERROR_BODY_LEN: usize = 256;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} request failed with status {status}: {body}")]
    ProviderRequest {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an unexpected response shape: {detail}")]
    ProviderResponseShape { provider: String, detail: String },

    #[error("{provider} request could not be sent: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} provider requires {variable} to be set")]
    MissingCredential {
        provider: String,
        variable: &'static str,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl LlmError {
    pub(crate) fn shape(provider: &str, detail: impl Into<String>) -> Self {
        LlmError::ProviderResponseShape {
            provider: provider.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn transport(provider: &str, source: reqwest::Error) -> Self {
        LlmError::Transport {
            provider: provider.to_string(),
            source,
        }
    }
}

/// A single chat message: role tag plus text body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

/// The one response shape every provider returns.
///
/// Only constructible through `from_choices`, which guarantees at least one
/// choice whose text is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedLlmResponse {
    choices: Vec<Choice>,
}

impl NormalizedLlmResponse {
    pub fn from_choices(provider: &str, choices: Vec<Choice>) -> Result<Self, LlmError> {
        let first = choices
            .first()
            .ok_or_else(|| LlmError::shape(provider, "response contained no choices"))?;
        if first.message.content.trim().is_empty() {
            return Err(LlmError::shape(provider, "first choice has empty content"));
        }
        Ok(Self { choices })
    }

    /// Convenience for single-text providers: one assistant choice.
    pub fn from_text(provider: &str, text: String) -> Result<Self, LlmError> {
        Self::from_choices(
            provider,
            vec![Choice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: text,
                },
            }],
        )
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Text body of the first choice. Never empty.
    pub fn text(&self) -> &str {
        &self.choices[0].message.content
    }
}

/// Sends a prompt to one upstream LLM endpoint.
///
/// Implementations hold no mutable state, so a single instance can serve
/// concurrent `analyze` calls.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Stable identifier attached to every assessment ("local", "gemini", ...).
    fn provider_id(&self) -> &str;

    async fn analyze(&self, prompt: &str) -> Result<NormalizedLlmResponse, LlmError>;
}

/// Turns a non-2xx status into `ProviderRequest`, otherwise decodes the body
/// into the provider's wire type. A body that does not match the wire type is
/// a shape error, not a transport error.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    provider: &str,
    response: Response,
) -> Result<T, LlmError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LlmError::transport(provider, e))?;

    if !status.is_success() {
        warn!("{provider} returned {status}: {}", truncate(&body));
        return Err(LlmError::ProviderRequest {
            provider: provider.to_string(),
            status: status.as_u16(),
            body: truncate(&body),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| LlmError::shape(provider, format!("body is not the expected JSON: {e}")))
}

/// Compacts and bounds text destined for error messages.
pub(crate) fn truncate(text: &str) -> String {
    let compact = text.trim().replace('\n', " ");
    compact.chars().take(MAX_ERROR_BODY_LEN).collect()
}

/// Joins a configured base URL and a path without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
