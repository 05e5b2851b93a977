//! Integration test using a mock LLM provider and an in-memory GitHub host.
//!
//! Validates the orchestrator pipeline end-to-end without making
//! real API calls.

use std::sync::Mutex;

use async_trait::async_trait;

use presubmit::comments::BotIdentity;
use presubmit::config::Config;
use presubmit::github::{
    Commit, CommitDetails, GitHost, GitRef, GithubError, NewReview, PullRequest, PullRequestRef,
};
use presubmit::models::review::{FileSummary, ReviewScore};
use presubmit::models::{
    AiComment, FilePatch, FileStatus, PullRequestReview, PullRequestSummary, ReviewComment,
    ReviewCommentResponse, User,
};
use presubmit::orchestrator::publish::OVERVIEW_START;
use presubmit::orchestrator::{
    OrchestratorError, ReplyOutcome, reply_to_comment, review_pull_request,
};
use presubmit::prompts::Prompt;
use presubmit::providers::{ProviderError, ReviewProvider};

/// A mock review provider that returns canned results and records prompts.
struct MockProvider {
    summary: PullRequestSummary,
    review: PullRequestReview,
    reply: ReviewCommentResponse,
    prompts: Mutex<Vec<Prompt>>,
}

impl MockProvider {
    fn new(comments: Vec<AiComment>) -> Self {
        Self {
            summary: PullRequestSummary {
                title: "Propagate fetch errors".into(),
                description: "Refresh now returns the fetch error.".into(),
                files: vec![FileSummary {
                    filename: "src/auth.rs".into(),
                    summary: "Uses `?` on fetch.".into(),
                    title: "Error propagation".into(),
                }],
                kinds: vec!["ENHANCEMENT".into()],
            },
            review: PullRequestReview {
                review: ReviewScore {
                    estimated_effort_to_review: 2,
                    score: 80,
                    has_relevant_tests: false,
                    security_concerns: "No".into(),
                },
                comments,
            },
            reply: ReviewCommentResponse {
                response_comment: "@alice The `?` returns the error to the caller.".into(),
                action_requested: true,
            },
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn with_reply(mut self, reply: ReviewCommentResponse) -> Self {
        self.reply = reply;
        self
    }

    fn record(&self, prompt: &Prompt) {
        self.prompts.lock().unwrap().push(prompt.clone());
    }

    fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReviewProvider for MockProvider {
    async fn summarize(&self, prompt: &Prompt) -> Result<PullRequestSummary, ProviderError> {
        self.record(prompt);
        Ok(self.summary.clone())
    }

    async fn review(&self, prompt: &Prompt) -> Result<PullRequestReview, ProviderError> {
        self.record(prompt);
        Ok(self.review.clone())
    }

    async fn reply(&self, prompt: &Prompt) -> Result<ReviewCommentResponse, ProviderError> {
        self.record(prompt);
        Ok(self.reply.clone())
    }
}

/// An in-memory pull request that records everything posted to it.
struct MockHost {
    pull: Mutex<PullRequest>,
    files: Vec<FilePatch>,
    comments: Vec<ReviewComment>,
    reviews: Mutex<Vec<NewReview>>,
    replies: Mutex<Vec<(u64, String)>>,
    description_updates: Mutex<usize>,
}

impl MockHost {
    fn new(files: Vec<FilePatch>, comments: Vec<ReviewComment>) -> Self {
        Self {
            pull: Mutex::new(PullRequest {
                number: 7,
                title: "Fix refresh".into(),
                body: Some("Handle fetch failures.".into()),
                head: GitRef {
                    sha: "abc123".into(),
                },
            }),
            files,
            comments,
            reviews: Mutex::new(Vec::new()),
            replies: Mutex::new(Vec::new()),
            description_updates: Mutex::new(0),
        }
    }

    fn description(&self) -> String {
        self.pull.lock().unwrap().body.clone().unwrap_or_default()
    }
}

#[async_trait]
impl GitHost for MockHost {
    async fn pull_request(&self, _pr: &PullRequestRef) -> Result<PullRequest, GithubError> {
        Ok(self.pull.lock().unwrap().clone())
    }

    async fn list_files(&self, _pr: &PullRequestRef) -> Result<Vec<FilePatch>, GithubError> {
        Ok(self.files.clone())
    }

    async fn list_commits(&self, _pr: &PullRequestRef) -> Result<Vec<Commit>, GithubError> {
        Ok(vec![Commit {
            sha: "abc123".into(),
            commit: CommitDetails {
                message: "Use ? on fetch".into(),
            },
        }])
    }

    async fn list_review_comments(
        &self,
        _pr: &PullRequestRef,
    ) -> Result<Vec<ReviewComment>, GithubError> {
        Ok(self.comments.clone())
    }

    async fn create_review(
        &self,
        _pr: &PullRequestRef,
        review: &NewReview,
    ) -> Result<(), GithubError> {
        self.reviews.lock().unwrap().push(review.clone());
        Ok(())
    }

    async fn reply_to_comment(
        &self,
        _pr: &PullRequestRef,
        comment_id: u64,
        body: &str,
    ) -> Result<(), GithubError> {
        self.replies.lock().unwrap().push((comment_id, body.to_string()));
        Ok(())
    }

    async fn update_pull_request(
        &self,
        _pr: &PullRequestRef,
        body: &str,
    ) -> Result<(), GithubError> {
        self.pull.lock().unwrap().body = Some(body.to_string());
        *self.description_updates.lock().unwrap() += 1;
        Ok(())
    }
}

fn pr() -> PullRequestRef {
    PullRequestRef::parse("octo/widgets", 7).unwrap()
}

fn auth_patch() -> FilePatch {
    FilePatch {
        filename: "src/auth.rs".into(),
        status: FileStatus::Modified,
        previous_filename: None,
        patch: Some(
            "@@ -10,3 +10,4 @@ impl Session {\n     fn refresh(&mut self) {\n-        self.token = fetch();\n+        let token = fetch()?;\n+        self.token = token;\n     }"
                .into(),
        ),
    }
}

fn binary_patch() -> FilePatch {
    FilePatch {
        filename: "logo.png".into(),
        status: FileStatus::Added,
        previous_filename: None,
        patch: None,
    }
}

fn comment(id: u64, login: &str, body: &str, parent: Option<u64>) -> ReviewComment {
    ReviewComment {
        id,
        path: "src/auth.rs".into(),
        body: body.into(),
        diff_hunk: None,
        line: Some(11),
        start_line: None,
        original_line: None,
        original_start_line: None,
        in_reply_to_id: parent,
        user: User {
            login: login.into(),
        },
        created_at: None,
    }
}

fn ai_comment(file: &str, start: u32, end: u32) -> AiComment {
    AiComment {
        file: file.into(),
        start_line: start,
        end_line: end,
        highlighted_code: "let token = fetch()?;".into(),
        header: "Error loses context".into(),
        content: "Wrap the fetch error with the session id.".into(),
        label: "maintainability".into(),
        critical: false,
    }
}

#[tokio::test]
async fn review_posts_filtered_comments_and_summary() {
    let bot = BotIdentity::default();
    let host = MockHost::new(
        vec![auth_patch(), binary_patch()],
        vec![
            comment(1, "alice", "Should this retry?", None),
            comment(2, "github-actions[bot]", &bot.sign("A retry belongs in the caller."), Some(1)),
        ],
    );
    let provider = MockProvider::new(vec![
        ai_comment("src/auth.rs", 11, 12),
        ai_comment("src/missing.rs", 1, 1),
        ai_comment("src/auth.rs", 90, 90),
    ]);

    let outcome = review_pull_request(&host, &provider, &Config::default(), &pr(), false)
        .await
        .expect("review should succeed");

    assert_eq!(outcome.posted_comments, 1);
    assert_eq!(outcome.dropped_comments, 2);
    assert_eq!(outcome.existing_threads, 1);

    let reviews = host.reviews.lock().unwrap().clone();
    assert_eq!(reviews.len(), 1);
    let review = &reviews[0];
    assert_eq!(review.commit_id, "abc123");
    assert_eq!(review.event, "COMMENT");
    assert!(review.body.contains("| Score | 80/100 |"));
    assert!(bot.is_own_comment(&review.body));
    let posted = &review.comments[0];
    assert_eq!(posted.path, "src/auth.rs");
    assert_eq!((posted.start_line, posted.line), (Some(11), 12));
    assert!(posted.body.starts_with("**Error loses context**"));
    assert!(bot.is_own_comment(&posted.body));

    let description = host.description();
    assert!(description.starts_with("Handle fetch failures.\n\n"));
    assert!(description.contains("## Propagate fetch errors"));
}

#[tokio::test]
async fn review_prompt_carries_existing_threads() {
    let bot = BotIdentity::default();
    let host = MockHost::new(
        vec![auth_patch()],
        vec![
            comment(1, "alice", "Should this retry?", None),
            comment(2, "github-actions[bot]", &bot.sign("A retry belongs in the caller."), Some(1)),
        ],
    );
    let provider = MockProvider::new(Vec::new());

    review_pull_request(&host, &provider, &Config::default(), &pr(), true)
        .await
        .unwrap();

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 2);
    let summary_prompt = &prompts[0];
    assert!(summary_prompt.user.contains("Use ? on fetch"));
    assert!(summary_prompt.user.contains("- modified: src/auth.rs"));

    let review_prompt = &prompts[1];
    assert!(review_prompt.user.contains("__new hunk__\n10      fn refresh(&mut self) {"));
    assert!(review_prompt.user.contains(" __existing_comment_thread__\n alice: Should this retry?\n presubmit: A retry belongs in the caller."));
    assert!(review_prompt.user.contains("Refresh now returns the fetch error."));
}

#[tokio::test]
async fn dry_run_posts_nothing() {
    let host = MockHost::new(vec![auth_patch()], Vec::new());
    let provider = MockProvider::new(vec![ai_comment("src/auth.rs", 11, 11)]);

    let outcome = review_pull_request(&host, &provider, &Config::default(), &pr(), true)
        .await
        .unwrap();

    assert_eq!(outcome.posted_comments, 1);
    assert!(host.reviews.lock().unwrap().is_empty());
    assert_eq!(*host.description_updates.lock().unwrap(), 0);
    assert_eq!(host.description(), "Handle fetch failures.");
}

#[tokio::test]
async fn rerun_replaces_generated_description() {
    let host = MockHost::new(vec![auth_patch()], Vec::new());
    let provider = MockProvider::new(Vec::new());
    let config = Config::default();

    review_pull_request(&host, &provider, &config, &pr(), false).await.unwrap();
    let first = host.description();
    review_pull_request(&host, &provider, &config, &pr(), false).await.unwrap();

    assert_eq!(host.description(), first);
    assert_eq!(host.description().matches(OVERVIEW_START).count(), 1);
    // Unchanged description is not written again
    assert_eq!(*host.description_updates.lock().unwrap(), 1);

    // The model never sees its own generated section
    let prompts = provider.prompts();
    assert!(!prompts[2].user.contains(OVERVIEW_START));
}

#[tokio::test]
async fn review_errors_without_textual_diffs() {
    let host = MockHost::new(vec![binary_patch()], Vec::new());
    let provider = MockProvider::new(Vec::new());

    let result = review_pull_request(&host, &provider, &Config::default(), &pr(), false).await;

    assert!(matches!(result, Err(OrchestratorError::NoDiffs)));
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn reply_answers_mention() {
    let host = MockHost::new(
        vec![auth_patch()],
        vec![comment(1, "alice", "@presubmitai why the `?`", None)],
    );
    let provider = MockProvider::new(Vec::new());

    let outcome = reply_to_comment(&host, &provider, &Config::default(), &pr(), 1, false)
        .await
        .unwrap();

    let ReplyOutcome::Replied(body) = outcome else {
        panic!("expected a reply, got {outcome:?}");
    };
    assert!(body.starts_with("@alice The `?`"));
    assert!(BotIdentity::default().is_own_comment(&body));

    let replies = host.replies.lock().unwrap().clone();
    assert_eq!(replies, vec![(1, body)]);

    let prompt = &provider.prompts()[0];
    assert!(prompt.user.contains("<author>@alice</author>"));
    assert!(prompt.user.contains("## File: 'src/auth.rs'"));
}

#[tokio::test]
async fn reply_to_nested_comment_targets_that_comment() {
    let bot = BotIdentity::default();
    let host = MockHost::new(
        vec![auth_patch()],
        vec![
            comment(1, "github-actions[bot]", &bot.sign("Consider a retry."), None),
            comment(2, "alice", "Is that needed here?", Some(1)),
        ],
    );
    let provider = MockProvider::new(Vec::new());

    let outcome = reply_to_comment(&host, &provider, &Config::default(), &pr(), 2, false)
        .await
        .unwrap();

    assert!(matches!(outcome, ReplyOutcome::Replied(_)));
    assert_eq!(host.replies.lock().unwrap()[0].0, 2);
}

#[tokio::test]
async fn reply_skips_threads_without_the_bot() {
    let host = MockHost::new(
        vec![auth_patch()],
        vec![
            comment(1, "alice", "Should this retry?", None),
            comment(2, "bob", "No.", Some(1)),
        ],
    );
    let provider = MockProvider::new(Vec::new());

    let outcome = reply_to_comment(&host, &provider, &Config::default(), &pr(), 2, false)
        .await
        .unwrap();

    assert_eq!(outcome, ReplyOutcome::NotRelevant);
    assert!(provider.prompts().is_empty());
    assert!(host.replies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reply_skips_when_bot_spoke_last() {
    let bot = BotIdentity::default();
    let host = MockHost::new(
        vec![auth_patch()],
        vec![
            comment(1, "alice", "@presubmit thoughts?", None),
            comment(2, "github-actions[bot]", &bot.sign("Looks fine."), Some(1)),
        ],
    );
    let provider = MockProvider::new(Vec::new());

    let outcome = reply_to_comment(&host, &provider, &Config::default(), &pr(), 2, false)
        .await
        .unwrap();

    assert_eq!(outcome, ReplyOutcome::OwnComment);
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn reply_respects_no_action() {
    let host = MockHost::new(
        vec![auth_patch()],
        vec![comment(1, "alice", "@presubmitai thanks!", None)],
    );
    let provider = MockProvider::new(Vec::new()).with_reply(ReviewCommentResponse {
        response_comment: "You're welcome.".into(),
        action_requested: false,
    });

    let outcome = reply_to_comment(&host, &provider, &Config::default(), &pr(), 1, false)
        .await
        .unwrap();

    assert_eq!(outcome, ReplyOutcome::NoActionRequested);
    assert!(host.replies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reply_to_unknown_comment() {
    let host = MockHost::new(vec![auth_patch()], Vec::new());
    let provider = MockProvider::new(Vec::new());

    let outcome = reply_to_comment(&host, &provider, &Config::default(), &pr(), 42, false)
        .await
        .unwrap();

    assert_eq!(outcome, ReplyOutcome::ThreadNotFound);
}
