//! ReviewProvider trait and LLM integration.
//!
//! Provides an abstraction layer over rig-core to decouple the
//! codebase from the specific LLM library.

pub mod rig;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{PullRequestReview, PullRequestSummary, ReviewCommentResponse};
use crate::prompts::Prompt;

/// Errors from the review provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// The three structured model calls a review run makes.
///
/// Implementations return results already shaped by the result type's
/// JSON schema; callers never see raw model text.
#[async_trait]
pub trait ReviewProvider: Send + Sync {
    /// Describe the pull request as a whole.
    async fn summarize(&self, prompt: &Prompt) -> Result<PullRequestSummary, ProviderError>;

    /// Review the annotated diff.
    async fn review(&self, prompt: &Prompt) -> Result<PullRequestReview, ProviderError>;

    /// Answer the latest comment of a thread.
    async fn reply(&self, prompt: &Prompt) -> Result<ReviewCommentResponse, ProviderError>;
}
