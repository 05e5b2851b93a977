//! GitHub REST v3 client over reqwest.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{Commit, GitHost, GithubError, NewReview, PullRequest, PullRequestRef};
use crate::config::GithubConfig;
use crate::constants::{APP_NAME, VERSION};
use crate::models::{FilePatch, ReviewComment};

/// Items per page; GitHub's maximum.
const PER_PAGE: usize = 100;

/// GitHub caps listings at 3000 items (30 full pages).
const MAX_PAGES: usize = 30;

const API_VERSION: &str = "2022-11-28";

/// Authenticated GitHub API client.
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GithubClient {
    /// Create a client from config. Fails when no token is configured.
    pub fn new(config: &GithubConfig) -> Result<Self, GithubError> {
        let token = config
            .token
            .clone()
            .ok_or_else(|| GithubError::MissingEnvVar(crate::constants::ENV_GITHUB_TOKEN.into()))?;
        let http = reqwest::Client::builder()
            .user_agent(format!("{APP_NAME}/{VERSION}"))
            .build()
            .map_err(|e| GithubError::ApiError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn repo_url(&self, pr: &PullRequestRef, path: &str) -> String {
        format!("{}/repos/{}/{}{path}", self.api_url, pr.owner, pr.repo)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Turn a non-2xx response into [`GithubError::Http`].
    async fn check(
        method: &'static str,
        url: &str,
        response: Response,
    ) -> Result<Response, GithubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        Err(GithubError::Http {
            method,
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GithubError> {
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| GithubError::ApiError(e.to_string()))?;
        Self::check("GET", url, response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| GithubError::ApiError(format!("invalid response from {url}: {e}")))
    }

    /// Fetch every page of a listing endpoint, stopping at the first short page.
    async fn get_all_pages<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, GithubError> {
        let mut items = Vec::new();
        for page in 1..=MAX_PAGES {
            let page_url = format!("{url}?per_page={PER_PAGE}&page={page}");
            let batch: Vec<T> = self.get_json(&page_url).await?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                break;
            }
        }
        debug!(url, count = items.len(), "fetched listing");
        Ok(items)
    }

    async fn send_json(
        &self,
        method: Method,
        label: &'static str,
        url: &str,
        payload: &impl Serialize,
    ) -> Result<(), GithubError> {
        let response = self
            .request(method, url)
            .json(payload)
            .send()
            .await
            .map_err(|e| GithubError::ApiError(e.to_string()))?;
        Self::check(label, url, response).await?;
        Ok(())
    }
}

#[async_trait]
impl GitHost for GithubClient {
    async fn pull_request(&self, pr: &PullRequestRef) -> Result<PullRequest, GithubError> {
        self.get_json(&self.repo_url(pr, &format!("/pulls/{}", pr.number)))
            .await
    }

    async fn list_files(&self, pr: &PullRequestRef) -> Result<Vec<FilePatch>, GithubError> {
        self.get_all_pages(&self.repo_url(pr, &format!("/pulls/{}/files", pr.number)))
            .await
    }

    async fn list_commits(&self, pr: &PullRequestRef) -> Result<Vec<Commit>, GithubError> {
        self.get_all_pages(&self.repo_url(pr, &format!("/pulls/{}/commits", pr.number)))
            .await
    }

    async fn list_review_comments(
        &self,
        pr: &PullRequestRef,
    ) -> Result<Vec<ReviewComment>, GithubError> {
        self.get_all_pages(&self.repo_url(pr, &format!("/pulls/{}/comments", pr.number)))
            .await
    }

    async fn create_review(
        &self,
        pr: &PullRequestRef,
        review: &NewReview,
    ) -> Result<(), GithubError> {
        let url = self.repo_url(pr, &format!("/pulls/{}/reviews", pr.number));
        self.send_json(Method::POST, "POST", &url, review).await
    }

    async fn reply_to_comment(
        &self,
        pr: &PullRequestRef,
        comment_id: u64,
        body: &str,
    ) -> Result<(), GithubError> {
        let url = self.repo_url(
            pr,
            &format!("/pulls/{}/comments/{comment_id}/replies", pr.number),
        );
        self.send_json(Method::POST, "POST", &url, &serde_json::json!({ "body": body }))
            .await
    }

    async fn update_pull_request(
        &self,
        pr: &PullRequestRef,
        body: &str,
    ) -> Result<(), GithubError> {
        let url = self.repo_url(pr, &format!("/pulls/{}", pr.number));
        self.send_json(Method::PATCH, "PATCH", &url, &serde_json::json!({ "body": body }))
            .await
    }
}
