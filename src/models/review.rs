//! Structured results requested from the model.
//!
//! Doc comments on the fields become the descriptions in the JSON schema
//! handed to the provider, so they are written for the model to read.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Summary of a single changed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FileSummary {
    /// The full file path of the relevant file.
    pub filename: String,
    /// Concise summary of the file changes in markdown format (max 70 words).
    pub summary: String,
    /// An informative title for the changes in this file, describing its main theme (5-10 words).
    pub title: String,
}

/// Generated description of a whole pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PullRequestSummary {
    /// Informative title of the PR, describing its main theme (10 words max).
    pub title: String,
    /// Informative description of the PR, describing its main theme.
    pub description: String,
    /// List of files affected in the PR and summaries of their changes.
    #[serde(default)]
    pub files: Vec<FileSummary>,
    /// One or more types that describe this PR's main theme.
    /// Example: BUG, TESTS, ENHANCEMENT, DOCUMENTATION, SECURITY, OTHER.
    #[serde(rename = "type", default)]
    pub kinds: Vec<String>,
}

/// A single review comment proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AiComment {
    /// The full file path of the relevant file.
    pub file: String,
    /// The line number, from a '__new hunk__' section, where the comment starts (inclusive).
    /// Should correspond to the first line of 'highlighted_code'. Equals 'end_line' for single-line comments.
    pub start_line: u32,
    /// The line number, from a '__new hunk__' section, where the comment ends (inclusive).
    /// Should correspond to the last line of 'highlighted_code'. Equals 'start_line' for single-line comments.
    pub end_line: u32,
    /// A short code snippet from a '__new hunk__' section that the comment applies to.
    /// Include only complete code lines, without line numbers.
    #[serde(default)]
    pub highlighted_code: String,
    /// A concise, single-sentence overview of the comment. Focus on the 'what'.
    /// Be general, and avoid method or variable names.
    pub header: String,
    /// An actionable comment to enhance, improve or fix the new code introduced in the PR.
    /// Use markdown formatting.
    pub content: String,
    /// A single, descriptive label that best characterizes the suggestion type, such as
    /// 'security', 'possible bug', 'possible issue', 'performance', 'enhancement',
    /// 'best practice', 'maintainability', 'readability'.
    pub label: String,
    /// True if the PR should not be merged without addressing the comment.
    #[serde(default)]
    pub critical: bool,
}

impl AiComment {
    /// The commented range with `start <= end`, whatever order the model used.
    pub fn line_range(&self) -> (u32, u32) {
        if self.start_line <= self.end_line {
            (self.start_line, self.end_line)
        } else {
            (self.end_line, self.start_line)
        }
    }
}

/// Overall assessment of a pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewScore {
    /// Estimate, on a scale of 1-5 (inclusive), the effort required to review this PR.
    /// 1 means short and easy, 5 means long and hard.
    #[schemars(range(min = 1, max = 5))]
    pub estimated_effort_to_review: u8,
    /// Rate this PR on a scale of 0-100 (inclusive), where 100 means production-ready
    /// code without bugs or performance issues.
    #[schemars(range(min = 0, max = 100))]
    pub score: u8,
    /// True if the PR includes relevant tests added or updated.
    pub has_relevant_tests: bool,
    /// Possible vulnerabilities introduced by this PR. Answer 'No' if there are none,
    /// otherwise start with a short header such as 'SQL injection: ...'.
    pub security_concerns: String,
}

/// The model's full review of a pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PullRequestReview {
    /// The full review of the PR.
    pub review: ReviewScore,
    /// Comments about possible bugs, security concerns, code quality, typos or
    /// regressions introduced in this PR.
    #[serde(default)]
    pub comments: Vec<AiComment>,
}

/// The model's answer to a comment thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewCommentResponse {
    /// Your response to the comment in markdown format, starting by mentioning the user.
    #[serde(default)]
    pub response_comment: String,
    /// True if the input comment required an action from you (answering a question,
    /// clarifying a point, or acknowledging an explanation).
    #[serde(default)]
    pub action_requested: bool,
}
