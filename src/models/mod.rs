//! Shared types used across all modules.
//!
//! This module defines the core data structures for diffs, review
//! comments and threads, and the structured results requested from the
//! model. Other modules import from here rather than reaching into each
//! other's internals.

pub mod comment;
pub mod diff;
pub mod review;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use comment::{ReviewComment, ReviewCommentThread, User};
pub use diff::{AnnotatedHunk, File, FileDiff, FilePatch, FileStatus, Hunk};
pub use review::{AiComment, PullRequestReview, PullRequestSummary, ReviewCommentResponse};

/// Supported LLM provider backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    #[default]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Gemini,
    #[serde(rename = "deepseek")]
    DeepSeek,
    Groq,
    /// Any OpenAI-compatible API (e.g. Ollama, Azure, local servers).
    #[serde(rename = "openai-compatible")]
    OpenAICompatible,
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderName::Anthropic => write!(f, "anthropic"),
            ProviderName::OpenAI => write!(f, "openai"),
            ProviderName::Gemini => write!(f, "gemini"),
            ProviderName::DeepSeek => write!(f, "deepseek"),
            ProviderName::Groq => write!(f, "groq"),
            ProviderName::OpenAICompatible => write!(f, "openai-compatible"),
        }
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(ProviderName::Anthropic),
            "openai" => Ok(ProviderName::OpenAI),
            // Google's AI SDK naming
            "gemini" | "google" => Ok(ProviderName::Gemini),
            "deepseek" => Ok(ProviderName::DeepSeek),
            "groq" => Ok(ProviderName::Groq),
            "openai-compatible" => Ok(ProviderName::OpenAICompatible),
            other => Err(format!(
                "unsupported provider: '{other}'. Supported: anthropic, openai, gemini, \
                 deepseek, groq, openai-compatible"
            )),
        }
    }
}

impl ProviderName {
    /// Returns the provider-specific environment variable name for the API key.
    ///
    /// These match the env var names used by rig-core's `from_env()` implementations.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            ProviderName::Anthropic => "ANTHROPIC_API_KEY",
            ProviderName::OpenAI | ProviderName::OpenAICompatible => "OPENAI_API_KEY",
            ProviderName::Gemini => "GEMINI_API_KEY",
            ProviderName::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderName::Groq => "GROQ_API_KEY",
        }
    }

    /// Infer the provider from a well-known model name prefix.
    ///
    /// Lets a workflow set only `LLM_MODEL` and get the right backend.
    pub fn infer_from_model(model: &str) -> Option<Self> {
        let model = model.to_lowercase();
        if model.starts_with("claude") {
            Some(ProviderName::Anthropic)
        } else if model.starts_with("gpt") || model.starts_with("o1") || model.starts_with("o3") || model.starts_with("o4") {
            Some(ProviderName::OpenAI)
        } else if model.starts_with("gemini") {
            Some(ProviderName::Gemini)
        } else if model.starts_with("deepseek") {
            Some(ProviderName::DeepSeek)
        } else {
            None
        }
    }

    /// Sampling temperature to request for `model`.
    ///
    /// Reasoning models (gpt-5, o-series) reject anything but their default
    /// of 1; everything else runs deterministic at 0.
    pub fn temperature_for(model: &str) -> f64 {
        let model = model.to_lowercase();
        let model = model.rsplit('/').next().unwrap_or_default();
        let reasoning = ["gpt-5", "o1", "o3", "o4"]
            .iter()
            .any(|family| model.starts_with(family));
        if reasoning { 1.0 } else { 0.0 }
    }
}
