//! Review orchestrator: fetch the pull request, run the model calls and
//! publish the results.

pub mod publish;

use std::future::Future;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::comments::{self, generate_comment_threads, normalize_authors};
use crate::config::Config;
use crate::diff::{self, DiffError};
use crate::github::{GitHost, GithubError, NewReview, PullRequestRef};
use crate::models::{PullRequestReview, PullRequestSummary, ReviewCommentThread};
use crate::prompts::review::ReviewInput;
use crate::prompts::summary::SummaryInput;
use crate::prompts::{PromptSettings, build_reply_prompt, build_review_prompt, build_summary_prompt};
use crate::providers::rig::{MAX_RETRIES, classify_error, is_retryable, retry_backoff};
use crate::providers::{ProviderError, ReviewProvider};

/// Errors from the orchestrator.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("GitHub error: {0}")]
    Github(#[from] GithubError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error("no diffs to review")]
    NoDiffs,
}

/// Result of a review run.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub summary: PullRequestSummary,
    pub review: PullRequestReview,
    /// Inline comments that were (or, on a dry run, would have been) posted.
    pub posted_comments: usize,
    /// AI comments discarded because they pointed outside the diff.
    pub dropped_comments: usize,
    /// Existing threads embedded in the review prompt.
    pub existing_threads: usize,
}

/// What happened to a comment the bot was asked to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The signed reply body that was (or would have been) posted.
    Replied(String),
    /// The model saw nothing to answer.
    NoActionRequested,
    /// The bot neither wrote in nor was mentioned in the thread.
    NotRelevant,
    /// The latest comment in the thread is the bot's own.
    OwnComment,
    /// No thread contains the comment, or its file is no longer in the diff.
    ThreadNotFound,
}

/// Summarize and review a pull request, then publish both.
///
/// With `dry_run` nothing is written to the host; the outcome still holds
/// everything that would have been posted.
pub async fn review_pull_request(
    host: &dyn GitHost,
    provider: &dyn ReviewProvider,
    config: &Config,
    pr: &PullRequestRef,
    dry_run: bool,
) -> Result<ReviewOutcome, OrchestratorError> {
    let bot = config.bot.identity();
    let settings = PromptSettings::from_config(config);

    let pull = host.pull_request(pr).await?;
    let patches = host.list_files(pr).await?;
    let commits = host.list_commits(pr).await?;
    let threads = fetch_threads(host, pr, &bot).await?;
    info!(
        %pr,
        files = patches.len(),
        commits = commits.len(),
        threads = threads.len(),
        "fetched pull request"
    );

    let files = diff::parse_files(&patches)?;
    if files.iter().all(|f| f.hunks.is_empty()) {
        return Err(OrchestratorError::NoDiffs);
    }
    let file_diffs = diff::build_file_diffs(&files, &threads);
    let existing_threads = file_diffs.iter().map(|f| f.thread_count()).sum();

    let current_description = pull.body.unwrap_or_default();
    let description = publish::author_description(&current_description);
    let commit_messages: Vec<String> = commits.into_iter().map(|c| c.commit.message).collect();

    let summary_prompt = build_summary_prompt(
        &SummaryInput {
            title: &pull.title,
            description: &description,
            commit_messages: &commit_messages,
            files: &files,
        },
        &settings,
    );
    let summary = with_retry("summary", || provider.summarize(&summary_prompt)).await?;

    let section = publish::format_summary_section(&summary);
    let new_description = publish::merge_description(&current_description, &section);
    if dry_run {
        debug!("dry run, leaving the pull request description unchanged");
    } else if new_description != current_description {
        host.update_pull_request(pr, &new_description).await?;
        info!(%pr, "updated pull request description");
    }

    let review_prompt = build_review_prompt(
        &ReviewInput {
            title: &pull.title,
            description: &description,
            summary: &summary.description,
            files: &file_diffs,
        },
        &settings,
    );
    let review = with_retry("review", || provider.review(&review_prompt)).await?;

    let prepared = publish::prepare_comments(
        &review.comments,
        &files,
        &bot,
        config.review.max_comment_chars,
    );
    let posted_comments = prepared.comments.len();

    let new_review = NewReview {
        commit_id: pull.head.sha,
        body: bot.sign(&publish::format_review_overview(&review, posted_comments)),
        event: "COMMENT".to_string(),
        comments: prepared.comments,
    };
    if dry_run {
        debug!(comments = posted_comments, "dry run, not posting the review");
    } else {
        host.create_review(pr, &new_review).await?;
        info!(%pr, comments = posted_comments, "posted review");
    }

    Ok(ReviewOutcome {
        summary,
        review,
        posted_comments,
        dropped_comments: prepared.dropped,
        existing_threads,
    })
}

/// Answer the thread containing `comment_id` when the bot is part of it.
pub async fn reply_to_comment(
    host: &dyn GitHost,
    provider: &dyn ReviewProvider,
    config: &Config,
    pr: &PullRequestRef,
    comment_id: u64,
    dry_run: bool,
) -> Result<ReplyOutcome, OrchestratorError> {
    let bot = config.bot.identity();

    let threads = fetch_threads(host, pr, &bot).await?;
    let Some(thread) = comments::find_thread_for_comment(&threads, comment_id) else {
        warn!(%pr, comment_id, "comment is not part of any thread");
        return Ok(ReplyOutcome::ThreadNotFound);
    };

    if !bot.is_thread_relevant(thread) {
        debug!(comment_id, "thread does not involve the bot");
        return Ok(ReplyOutcome::NotRelevant);
    }
    if is_last_comment_own(thread, &bot.login) {
        debug!(comment_id, "latest comment is the bot's own");
        return Ok(ReplyOutcome::OwnComment);
    }

    let patches = host.list_files(pr).await?;
    let files = diff::parse_files(&patches)?;
    let Some(file_diff) = diff::build_file_diffs(&files, std::slice::from_ref(thread))
        .into_iter()
        .find(|f| f.filename == thread.file)
    else {
        warn!(file = %thread.file, "thread file is no longer part of the diff");
        return Ok(ReplyOutcome::ThreadNotFound);
    };

    let prompt = build_reply_prompt(thread, &file_diff, &PromptSettings::from_config(config));
    let response = with_retry("reply", || provider.reply(&prompt)).await?;

    let text = response.response_comment.trim();
    if !response.action_requested || text.is_empty() {
        info!(comment_id, "no reply needed");
        return Ok(ReplyOutcome::NoActionRequested);
    }

    let body = publish::sign_truncated(text, &bot, config.review.max_comment_chars);
    if dry_run {
        debug!(comment_id, "dry run, not posting the reply");
    } else {
        host.reply_to_comment(pr, comment_id, &body).await?;
        info!(%pr, comment_id, "posted reply");
    }

    Ok(ReplyOutcome::Replied(body))
}

/// Fetch review comments, attribute signed ones to the bot and rebuild threads.
async fn fetch_threads(
    host: &dyn GitHost,
    pr: &PullRequestRef,
    bot: &comments::BotIdentity,
) -> Result<Vec<ReviewCommentThread>, GithubError> {
    let mut review_comments = host.list_review_comments(pr).await?;
    normalize_authors(&mut review_comments, bot);
    Ok(generate_comment_threads(&review_comments))
}

fn is_last_comment_own(thread: &ReviewCommentThread, bot_login: &str) -> bool {
    thread.last().is_some_and(|c| c.user.login == bot_login)
}

/// Run a model call, retrying transient failures with exponential backoff.
async fn with_retry<T, F, Fut>(what: &str, mut call: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if is_retryable(&e) && attempt < MAX_RETRIES => {
                let backoff = retry_backoff(attempt);
                warn!(
                    call = what,
                    attempt = attempt + 1,
                    max = MAX_RETRIES + 1,
                    backoff_secs = backoff.as_secs(),
                    "{}, retrying",
                    classify_error(&e).unwrap_or("Transient error")
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
