//! GitHub Actions event payloads.
//!
//! The runner names the triggering event in `GITHUB_EVENT_NAME` and writes
//! its JSON payload to the file at `GITHUB_EVENT_PATH`.

use serde::Deserialize;

use super::{GithubError, PullRequestRef};
use crate::constants::{ENV_EVENT_NAME, ENV_EVENT_PATH};
use crate::env::Env;

/// What the action was triggered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionEvent {
    /// A pull request was opened or updated.
    PullRequest { pr: PullRequestRef, action: String },
    /// Someone commented inline on a pull request.
    ReviewComment {
        pr: PullRequestRef,
        comment_id: u64,
        action: String,
    },
    /// Any other trigger; nothing to do.
    Unsupported(String),
}

#[derive(Deserialize)]
struct Payload {
    #[serde(default)]
    action: String,
    pull_request: Option<PayloadPullRequest>,
    comment: Option<PayloadComment>,
    repository: PayloadRepository,
}

#[derive(Deserialize)]
struct PayloadPullRequest {
    number: u64,
}

#[derive(Deserialize)]
struct PayloadComment {
    id: u64,
}

#[derive(Deserialize)]
struct PayloadRepository {
    full_name: String,
}

impl ActionEvent {
    /// Read the event the current workflow run was triggered by.
    pub async fn from_env(env: &Env) -> Result<Self, GithubError> {
        let name = env
            .var(ENV_EVENT_NAME)
            .map_err(|_| GithubError::MissingEnvVar(ENV_EVENT_NAME.into()))?;
        let path = env
            .var(ENV_EVENT_PATH)
            .map_err(|_| GithubError::MissingEnvVar(ENV_EVENT_PATH.into()))?;
        let payload = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| GithubError::EventRead { path, source })?;
        Self::parse(&name, &payload)
    }

    /// Interpret a payload for the given event name.
    pub fn parse(event_name: &str, payload: &str) -> Result<Self, GithubError> {
        let pull_request_events = [
            "pull_request",
            "pull_request_target",
            "pull_request_review_comment",
        ];
        if !pull_request_events.contains(&event_name) {
            return Ok(ActionEvent::Unsupported(event_name.to_string()));
        }

        let payload: Payload =
            serde_json::from_str(payload).map_err(|e| GithubError::EventParse(e.to_string()))?;
        let number = payload
            .pull_request
            .map(|pr| pr.number)
            .ok_or_else(|| GithubError::EventParse("missing pull_request".into()))?;
        let pr = PullRequestRef::parse(&payload.repository.full_name, number)?;

        if event_name == "pull_request_review_comment" {
            let comment_id = payload
                .comment
                .map(|c| c.id)
                .ok_or_else(|| GithubError::EventParse("missing comment".into()))?;
            return Ok(ActionEvent::ReviewComment {
                pr,
                comment_id,
                action: payload.action,
            });
        }

        Ok(ActionEvent::PullRequest {
            pr,
            action: payload.action,
        })
    }
}
