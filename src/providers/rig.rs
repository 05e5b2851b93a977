//! rig-core integration for the structured model calls.
//!
//! Uses rig-core's provider clients and Agent abstraction for multi-provider
//! support. Currently supports: Anthropic, OpenAI, Gemini, DeepSeek, Groq,
//! and any OpenAI-compatible API.

use std::time::Duration;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt as _;
use rig::providers;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::models::{
    ProviderName, PullRequestReview, PullRequestSummary, ReviewCommentResponse,
};
use crate::prompts::Prompt;

use super::{ProviderError, ReviewProvider};

/// Maximum tokens per LLM completion response.
///
/// Set high enough to accommodate thinking models (e.g. Gemini 2.5 Pro)
/// that consume part of the budget for internal reasoning tokens.
const MAX_TOKENS: u64 = 65536;

/// Maximum length of LLM response text to include in parse error messages.
const PARSE_ERROR_PREVIEW_LEN: usize = 2000;

/// Maximum number of retry attempts for transient API errors.
pub const MAX_RETRIES: u32 = 5;

/// Initial backoff delay between retries.
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(10);

/// Maximum backoff delay between retries.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Build an agent from a rig-core client, constrain it to the schema of
/// `$output` and prompt it.
///
/// Temperature follows [`ProviderName::temperature_for`].
///
/// Always sets `max_tokens`: all rig-core providers support it and without
/// it some (e.g. Gemini) default to a low limit that truncates responses.
macro_rules! prompt_simple {
    ($client:expr, $model:expr, $prompt:expr, $output:ty, $label:expr) => {{
        let agent = $client
            .agent($model)
            .preamble(&$prompt.system)
            .temperature(ProviderName::temperature_for($model))
            .max_tokens(MAX_TOKENS)
            .output_schema::<$output>()
            .build();
        agent
            .prompt($prompt.user.as_str())
            .await
            .map_err(|e| ProviderError::ApiError(format!("{} API error: {e}", $label)))
    }};
}

/// Create a rig-core client using the `Client::new(api_key)` convention.
macro_rules! new_client {
    ($provider_mod:path, $api_key:expr, $label:expr) => {{
        <$provider_mod>::new($api_key).map_err(|e| {
            ProviderError::ApiError(format!("failed to create {} client: {e}", $label))
        })
    }};
}

/// rig-core based review provider.
///
/// Wraps rig-core's multi-provider client system. The provider name
/// in config selects which rig-core provider to use.
pub struct RigProvider {
    config: ProviderConfig,
}

impl RigProvider {
    /// Create a new RigProvider with the given configuration.
    ///
    /// OpenAI-compatible servers (Ollama, vLLM) often run without a key.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_none() && config.name != ProviderName::OpenAICompatible {
            return Err(ProviderError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {} or {}.",
                config.name,
                crate::constants::ENV_API_KEY,
                config.name.api_key_env_var(),
            )));
        }
        if config.model.trim().is_empty() {
            return Err(ProviderError::NotConfigured(format!(
                "no model configured. Set {}.",
                crate::constants::ENV_MODEL
            )));
        }
        Ok(Self { config })
    }

    /// Build an OpenAI-style client, optionally with a custom base URL.
    fn build_openai_client(
        &self,
        api_key: &str,
        base_url: Option<&str>,
        label: &str,
    ) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(base_url) = base_url {
            builder = builder.base_url(base_url);
        }
        builder
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create {label} client: {e}")))
    }

    /// Require `base_url` for OpenAI-compatible providers.
    fn require_base_url(&self) -> Result<&str, ProviderError> {
        self.config.base_url.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            )
        })
    }

    /// The API key, empty for keyless OpenAI-compatible servers.
    fn api_key(&self) -> Result<&str, ProviderError> {
        match (self.config.api_key.as_deref(), self.config.name) {
            (Some(key), _) => Ok(key),
            (None, ProviderName::OpenAICompatible) => Ok(""),
            (None, _) => Err(ProviderError::NotConfigured("missing API key".to_string())),
        }
    }

    /// Make a completion call through rig-core and return the raw response text.
    async fn call_rig<T>(&self, prompt: &Prompt) -> Result<String, ProviderError>
    where
        T: JsonSchema,
    {
        let api_key = self.api_key()?;
        let model = self.config.model.as_str();

        match self.config.name {
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        ProviderError::ApiError(format!("failed to create Anthropic client: {e}"))
                    })?;
                prompt_simple!(client, model, prompt, T, "Anthropic")
            }
            ProviderName::OpenAI => {
                let client =
                    self.build_openai_client(api_key, self.config.base_url.as_deref(), "OpenAI")?;
                prompt_simple!(client, model, prompt, T, "OpenAI")
            }
            ProviderName::Gemini => {
                let client = new_client!(providers::gemini::Client, api_key, "Gemini")?;
                prompt_simple!(client, model, prompt, T, "Gemini")
            }
            ProviderName::DeepSeek => {
                let client = new_client!(providers::deepseek::Client, api_key, "DeepSeek")?;
                prompt_simple!(client, model, prompt, T, "DeepSeek")
            }
            ProviderName::Groq => {
                let client = new_client!(providers::groq::Client, api_key, "Groq")?;
                prompt_simple!(client, model, prompt, T, "Groq")
            }
            ProviderName::OpenAICompatible => {
                let base_url = self.require_base_url()?;
                let client =
                    self.build_openai_client(api_key, Some(base_url), "OpenAI-compatible")?;
                prompt_simple!(client, model, prompt, T, "OpenAI-compatible")
            }
        }
    }

    /// Prompt the model and parse its answer into `T`.
    async fn complete<T>(&self, prompt: &Prompt) -> Result<T, ProviderError>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let response = self.call_rig::<T>(prompt).await?;
        debug!(
            provider = %self.config.name,
            model = %self.config.model,
            bytes = response.len(),
            "model responded"
        );
        parse_structured_response(&response)
    }
}

#[async_trait]
impl ReviewProvider for RigProvider {
    async fn summarize(&self, prompt: &Prompt) -> Result<PullRequestSummary, ProviderError> {
        self.complete(prompt).await
    }

    async fn review(&self, prompt: &Prompt) -> Result<PullRequestReview, ProviderError> {
        self.complete(prompt).await
    }

    async fn reply(&self, prompt: &Prompt) -> Result<ReviewCommentResponse, ProviderError> {
        self.complete(prompt).await
    }
}

/// Check whether a provider error is transient and worth retrying.
///
/// Matches HTTP status codes commonly used for rate limiting and
/// temporary unavailability: 429 (Too Many Requests), 503 (Service
/// Unavailable), 529 (Overloaded), and connection/timeout errors.
///
/// Parse errors are never retried: the LLM is likely to produce the
/// same malformed output on a retry (especially truncated responses).
pub fn is_retryable(err: &ProviderError) -> bool {
    match err {
        ProviderError::ParseError(_) => false,
        _ => classify_error(err).is_some(),
    }
}

/// Classifies a provider error into a short, user-friendly message.
///
/// Returns `Some(message)` for transient/retryable errors, `None` otherwise.
pub fn classify_error(err: &ProviderError) -> Option<&'static str> {
    match err {
        ProviderError::ApiError(msg) => {
            let msg_lower = msg.to_lowercase();
            if msg_lower.contains("429")
                || msg_lower.contains("rate limit")
                || msg_lower.contains("too many requests")
            {
                Some("Rate limited by API")
            } else if msg_lower.contains("503")
                || msg_lower.contains("service unavailable")
                || msg_lower.contains("high demand")
            {
                Some("High model load")
            } else if msg_lower.contains("529") || msg_lower.contains("overloaded") {
                Some("API overloaded")
            } else if msg_lower.contains("502") {
                Some("API gateway error")
            } else if msg_lower.contains("timeout") || msg_lower.contains("timed out") {
                Some("Request timed out")
            } else if msg_lower.contains("connection") {
                Some("Connection error")
            } else if msg_lower.contains("temporarily") || msg_lower.contains("try again") {
                Some("Temporary API error")
            } else {
                None
            }
        }
        ProviderError::ParseError(_) => Some("Failed to parse LLM response"),
        _ => None,
    }
}

/// Compute the backoff duration for a retry attempt using exponential backoff.
pub fn retry_backoff(attempt: u32) -> Duration {
    let backoff = INITIAL_BACKOFF.saturating_mul(2u32.saturating_pow(attempt));
    backoff.min(MAX_BACKOFF)
}

/// Parse the model's response text into a structured result.
///
/// With `output_schema` enforcing the JSON schema at the provider level,
/// the response is expected to be valid JSON. Some providers still wrap it
/// in prose or markdown code fences (```json ... ```), so several
/// candidates are tried.
fn parse_structured_response<T: DeserializeOwned>(response: &str) -> Result<T, ProviderError> {
    let trimmed = response.trim();

    if trimmed.is_empty() {
        return Err(ProviderError::ParseError("empty response".to_string()));
    }

    let candidates = extract_json_candidates(trimmed);
    let mut last_error = None;

    for candidate in &candidates {
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }

    let preview: String = response.chars().take(PARSE_ERROR_PREVIEW_LEN).collect();
    Err(ProviderError::ParseError(format!(
        "could not parse LLM response as JSON ({}). Response: {preview}",
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// Regex for extracting content inside markdown code fences.
///
/// The closing ``` must appear at the start of a line (`\n````) to avoid
/// matching triple-backticks embedded inside JSON string values (e.g.
/// comment content containing ```rust code examples).
static FENCE_RE: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n```").unwrap());

/// Extract candidate JSON strings from a response.
///
/// Returns the trimmed response itself, the outermost `{ ... }` slice, and
/// any content inside markdown code fences (```json ... ``` or ``` ... ```).
fn extract_json_candidates(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    // First candidate: the raw text
    candidates.push(text.to_string());

    // Second: brace extraction, from the first '{' to the last '}'.
    // This is the most robust strategy when the response contains
    // nested code fences inside JSON string values.
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            candidates.push(text[start..=end].to_string());
        }
    }

    // Third: extract content from markdown code fences.
    for cap in FENCE_RE.captures_iter(text) {
        if let Some(inner) = cap.get(1) {
            let inner_trimmed = inner.as_str().trim();
            if !inner_trimmed.is_empty() {
                candidates.push(inner_trimmed.to_string());
            }
        }
    }

    candidates
}
