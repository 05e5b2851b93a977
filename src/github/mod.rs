//! GitHub pull request access.
//!
//! [`GitHost`] is the seam between the review pipeline and the REST API so
//! the pipeline can run against an in-memory host in tests.

pub mod client;
pub mod event;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FilePatch, ReviewComment};

pub use client::GithubClient;
pub use event::ActionEvent;

/// Errors from GitHub API calls and Actions event parsing.
#[derive(Error, Debug)]
pub enum GithubError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid repository '{0}', expected 'owner/name'")]
    InvalidRepository(String),

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("{method} {url} failed with HTTP {status}: {body}")]
    Http {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("failed to read event payload {path}: {source}")]
    EventRead {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid event payload: {0}")]
    EventParse(String),
}

/// Identifies one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    /// Build from an `owner/name` slug and a pull request number.
    pub fn parse(slug: &str, number: u64) -> Result<Self, GithubError> {
        match slug.trim().split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    number,
                })
            }
            _ => Err(GithubError::InvalidRepository(slug.to_string())),
        }
    }
}

impl std::fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// The parts of a pull request the reviewer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    /// GitHub sends `null` for an empty description.
    #[serde(default)]
    pub body: Option<String>,
    pub head: GitRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    pub sha: String,
}

/// A commit on the pull request branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetails {
    pub message: String,
}

/// An inline comment inside a new review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReviewComment {
    pub path: String,
    pub body: String,
    /// Last line of the range, on the new side.
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    pub side: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_side: Option<String>,
}

impl NewReviewComment {
    /// Comment on new-side lines `start..=end`.
    pub fn new(path: impl Into<String>, body: impl Into<String>, start: u32, end: u32) -> Self {
        let multi_line = start < end;
        Self {
            path: path.into(),
            body: body.into(),
            line: end,
            start_line: multi_line.then_some(start),
            side: "RIGHT".to_string(),
            start_side: multi_line.then(|| "RIGHT".to_string()),
        }
    }
}

/// A review posted in one request: overview body plus inline comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub commit_id: String,
    pub body: String,
    pub event: String,
    pub comments: Vec<NewReviewComment>,
}

/// Pull request operations the reviewer needs from the host.
#[async_trait]
pub trait GitHost: Send + Sync {
    async fn pull_request(&self, pr: &PullRequestRef) -> Result<PullRequest, GithubError>;

    /// Changed files with their patches, all pages.
    async fn list_files(&self, pr: &PullRequestRef) -> Result<Vec<FilePatch>, GithubError>;

    async fn list_commits(&self, pr: &PullRequestRef) -> Result<Vec<Commit>, GithubError>;

    /// Every inline review comment, all pages, in API order.
    async fn list_review_comments(
        &self,
        pr: &PullRequestRef,
    ) -> Result<Vec<ReviewComment>, GithubError>;

    async fn create_review(&self, pr: &PullRequestRef, review: &NewReview)
    -> Result<(), GithubError>;

    async fn reply_to_comment(
        &self,
        pr: &PullRequestRef,
        comment_id: u64,
        body: &str,
    ) -> Result<(), GithubError>;

    /// Replace the pull request description.
    async fn update_pull_request(
        &self,
        pr: &PullRequestRef,
        body: &str,
    ) -> Result<(), GithubError>;
}
