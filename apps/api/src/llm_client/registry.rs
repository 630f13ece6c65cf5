//! Maps a provider selector string to a concrete `ProviderClient`.
//!
//! Resolution is construction only: no network I/O. A selected provider
//! whose API key is missing fails here, at startup, instead of on the first
//! upstream call.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::{
    gemini, local, openrouter, GeminiProvider, LlmError, LocalProvider, OpenRouterProvider,
    ProviderClient,
};
use crate::config::LlmSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Local,
    Gemini,
    OpenRouter,
}

impl ProviderKind {
    /// Case-insensitive. Unknown or blank selectors fall back to `Local`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => ProviderKind::Gemini,
            "openrouter" => ProviderKind::OpenRouter,
            _ => ProviderKind::Local,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            ProviderKind::Local => local::PROVIDER_ID,
            ProviderKind::Gemini => gemini::PROVIDER_ID,
            ProviderKind::OpenRouter => openrouter::PROVIDER_ID,
        }
    }
}

/// Holds provider settings and one shared HTTP client. Cheap to clone.
#[derive(Clone)]
pub struct ProviderRegistry {
    settings: LlmSettings,
    http: Client,
}

impl ProviderRegistry {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(LlmError::Client)?;
        Ok(Self { settings, http })
    }

    /// Provider named by the configured `LLM_PROVIDER` value.
    pub fn resolve_configured(&self) -> Result<Arc<dyn ProviderClient>, LlmError> {
        self.resolve(&self.settings.provider)
    }

    pub fn resolve(&self, config_value: &str) -> Result<Arc<dyn ProviderClient>, LlmError> {
        let s = &self.settings;
        let kind = ProviderKind::parse(config_value);
        debug!("Resolving provider {:?} -> {}", config_value, kind.id());

        let provider: Arc<dyn ProviderClient> = match kind {
            ProviderKind::Local => Arc::new(LocalProvider::new(
                self.http.clone(),
                &s.local_endpoint,
                &s.local_model,
            )),
            ProviderKind::Gemini => {
                let api_key = require_key(gemini::PROVIDER_ID, &s.gemini_api_key, "GEMINI_API_KEY")?;
                Arc::new(GeminiProvider::new(
                    self.http.clone(),
                    &s.gemini_endpoint,
                    &s.gemini_model,
                    api_key,
                ))
            }
            ProviderKind::OpenRouter => {
                let api_key = require_key(
                    openrouter::PROVIDER_ID,
                    &s.openrouter_api_key,
                    "OPENROUTER_API_KEY",
                )?;
                Arc::new(OpenRouterProvider::new(
                    self.http.clone(),
                    &s.openrouter_endpoint,
                    api_key,
                    &s.openrouter_model,
                    &s.public_url,
                ))
            }
        };
        Ok(provider)
    }
}

fn require_key<'a>(
    provider: &str,
    key: &'a Option<String>,
    variable: &'static str,
) -> Result<&'a str, LlmError> {
    key.as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| LlmError::MissingCredential {
            provider: provider.to_string(),
            variable,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(settings: LlmSettings) -> ProviderRegistry {
        ProviderRegistry::new(settings).unwrap()
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ProviderKind::parse("GEMINI"), ProviderKind::Gemini);
        assert_eq!(ProviderKind::parse(" OpenRouter "), ProviderKind::OpenRouter);
        assert_eq!(ProviderKind::parse("Local"), ProviderKind::Local);
    }

    #[test]
    fn test_parse_unknown_defaults_to_local() {
        assert_eq!(ProviderKind::parse("anthropic"), ProviderKind::Local);
        assert_eq!(ProviderKind::parse(""), ProviderKind::Local);
    }

    #[test]
    fn test_resolve_local_needs_no_credentials() {
        let provider = registry(LlmSettings::default()).resolve("whatever").unwrap();
        assert_eq!(provider.provider_id(), "local");
    }

    #[test]
    fn test_resolve_gemini_without_key_fails_early() {
        let result = registry(LlmSettings::default()).resolve("gemini");
        match result {
            Err(LlmError::MissingCredential { provider, variable }) => {
                assert_eq!(provider, "gemini");
                assert_eq!(variable, "GEMINI_API_KEY");
            }
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("expected missing credential"),
        }
    }

    #[test]
    fn test_resolve_openrouter_blank_key_counts_as_missing() {
        let settings = LlmSettings {
            openrouter_api_key: Some("  ".to_string()),
            ..LlmSettings::default()
        };
        assert!(matches!(
            registry(settings).resolve("openrouter"),
            Err(LlmError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_resolve_with_keys_returns_matching_ids() {
        let settings = LlmSettings {
            gemini_api_key: Some("g".to_string()),
            openrouter_api_key: Some("o".to_string()),
            ..LlmSettings::default()
        };
        let registry = registry(settings);
        assert_eq!(registry.resolve("gemini").unwrap().provider_id(), "gemini");
        assert_eq!(
            registry.resolve("openrouter").unwrap().provider_id(),
            "openrouter"
        );
    }

    #[test]
    fn test_resolve_configured_uses_settings_selector() {
        let settings = LlmSettings {
            provider: "Gemini".to_string(),
            gemini_api_key: Some("g".to_string()),
            ..LlmSettings::default()
        };
        let provider = registry(settings).resolve_configured().unwrap();
        assert_eq!(provider.provider_id(), "gemini");
    }
}
