//! Chat-completions wire format, shared by the local server and the gateway.
//!
//! Every nested field of the response is optional on the wire so that a
//! missing `choices`, `message`, or `content` surfaces as
//! `ProviderResponseShape` instead of a decode panic.

use serde::{Deserialize, Serialize};

use super::{ChatMessage, Choice, LlmError, NormalizedLlmResponse, TEMPERATURE};

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatRequestMessage<'a>>,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatRequestMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatCompletionRequest<'a> {
    /// One user message carrying the whole prompt.
    pub fn single_prompt(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Maps the wire payload into the normalized shape. Any choice missing its
    /// message or content fails the whole response.
    pub fn normalize(self, provider: &str) -> Result<NormalizedLlmResponse, LlmError> {
        let choices = self
            .choices
            .ok_or_else(|| LlmError::shape(provider, "missing `choices` array"))?;

        let choices = choices
            .into_iter()
            .enumerate()
            .map(|(i, choice)| {
                let message = choice
                    .message
                    .ok_or_else(|| LlmError::shape(provider, format!("choice {i} has no `message`")))?;
                let content = message.content.ok_or_else(|| {
                    LlmError::shape(provider, format!("choice {i} has no `message.content`"))
                })?;
                Ok(Choice {
                    message: ChatMessage {
                        role: message.role.unwrap_or_else(|| "assistant".to_string()),
                        content,
                    },
                })
            })
            .collect::<Result<Vec<_>, LlmError>>()?;

        NormalizedLlmResponse::from_choices(provider, choices)
    }
}
