use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:1234";
const DEFAULT_LOCAL_MODEL: &str = "local-model";
const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
const DEFAULT_OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api";
const DEFAULT_OPENROUTER_MODEL: &str = "mistral-7b-instruct";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

/// Application configuration loaded from environment variables.
/// Only malformed numeric values fail startup; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub pdf_extractor: String,
    pub database_url: Option<String>,
    pub s3: Option<S3Settings>,
    pub results_history_limit: usize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Everything the provider registry needs to build a client.
/// Credentials stay optional here; the registry decides whether the
/// selected provider can run without one.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: String,
    pub local_endpoint: String,
    pub local_model: String,
    pub gemini_endpoint: String,
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
    pub openrouter_endpoint: String,
    pub openrouter_model: String,
    pub openrouter_api_key: Option<String>,
    pub public_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_upload_mb: usize = parse_env("MAX_UPLOAD_MB", 10)?;

        Ok(Config {
            llm: LlmSettings::from_env()?,
            pdf_extractor: env_or("PDF_EXTRACTOR", "builtin"),
            database_url: optional_env("DATABASE_URL"),
            s3: S3Settings::from_env(),
            results_history_limit: parse_env("RESULTS_HISTORY_LIMIT", 100)?,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

impl LlmSettings {
    pub fn from_env() -> Result<Self> {
        Ok(LlmSettings {
            provider: env_or("LLM_PROVIDER", "local"),
            local_endpoint: env_or("LLM_ENDPOINT", DEFAULT_LOCAL_ENDPOINT),
            local_model: env_or("LLM_MODEL", DEFAULT_LOCAL_MODEL),
            gemini_endpoint: env_or("GEMINI_ENDPOINT", DEFAULT_GEMINI_ENDPOINT),
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            openrouter_endpoint: env_or("OPENROUTER_ENDPOINT", DEFAULT_OPENROUTER_ENDPOINT),
            openrouter_model: env_or("OPENROUTER_MODEL", DEFAULT_OPENROUTER_MODEL),
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            public_url: env_or("APP_PUBLIC_URL", DEFAULT_PUBLIC_URL),
            timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
        })
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        LlmSettings {
            provider: "local".to_string(),
            local_endpoint: DEFAULT_LOCAL_ENDPOINT.to_string(),
            local_model: DEFAULT_LOCAL_MODEL.to_string(),
            gemini_endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_key: None,
            openrouter_endpoint: DEFAULT_OPENROUTER_ENDPOINT.to_string(),
            openrouter_model: DEFAULT_OPENROUTER_MODEL.to_string(),
            openrouter_api_key: None,
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            timeout_secs: 120,
        }
    }
}

impl S3Settings {
    /// Archiving is enabled only when a bucket is named.
    fn from_env() -> Option<Self> {
        let bucket = optional_env("S3_BUCKET")?;
        Some(S3Settings {
            bucket,
            endpoint: optional_env("S3_ENDPOINT"),
            region: env_or("AWS_REGION", "us-east-1"),
            access_key_id: optional_env("AWS_ACCESS_KEY_ID"),
            secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY"),
        })
    }
}

/// Blank values count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
