//! Prompt for answering the latest comment of a review thread.

use super::{Prompt, PromptSettings};
use crate::diff::format::generate_file_code_diff;
use crate::models::{FileDiff, ReviewCommentThread};

pub fn build_reply_prompt(
    thread: &ReviewCommentThread,
    file_diff: &FileDiff,
    settings: &PromptSettings,
) -> Prompt {
    let system = format!(
        "You are a helpful senior software engineer that reviews comments on Git Pull Requests (PRs). \
Your task is to provide a response to a comment on a PR review. The comment might be part of a longer \
comment thread, so make sure to respond to the specific comment and not the whole thread.{language}

The comment thread is specific to a line or multiple lines of code in a specific file. Keep that in mind \
when writing your response, but do not assume the code is complete or correct. Also, the comment might \
request you to suggest some changes or improvements outside the code snippet, so judge accordingly.

In your response, return the exact text of your comment, in markdown, starting by mentioning the @user \
who made the comment. Your response will be used as a comment on the PR, so make sure it's easy to \
understand and actionable.

Comments from @{bot} are yours.

IMPORTANT:
 - You should respond to any question, clarification, or feedback directed at you or related to your previous comments.
 - If the user explains why a suggestion cannot be applied, acknowledge it.
 - Do not respond with generic comments like \"Thanks for the PR!\" or \"LGTM\" if there is no specific question or issue to address.
 - If the input comment is truly not actionable and requires no response (e.g., just a simple acknowledgement from the user with no further question), return an empty string.
",
        language = settings.language_clause(),
        bot = settings.bot_login,
    );

    let comments: Vec<String> = thread
        .comments
        .iter()
        .map(|c| format!("<author>@{}</author>\n<comment>{}</comment>", c.user.login, c.body))
        .collect();

    let root = thread.root();
    let end = root.and_then(|c| c.line);
    let start = root.and_then(|c| c.start_line).or(end);
    let hunk = root.and_then(|c| c.diff_hunk.as_deref()).unwrap_or_default();

    let user = format!(
        "Below you'll see the full comment thread, but you should focus specifically on the last comment.\n\
         <Comment Thread>\n{comments}\n</Comment Thread>\n\n\
         <Comment Scope>\n  <Lines>{start} - {end}</Lines>\n  <Hunk>\n    {hunk}\n  </Hunk>\n</Comment Scope>\n\n\
         <Comment File Diff>\n{diff}\n</Comment File Diff>\n",
        comments = comments.join("\n"),
        start = display_line(start),
        end = display_line(end),
        diff = generate_file_code_diff(file_diff),
    );

    Prompt { system, user }
}

/// Outdated comments have no current line.
fn display_line(line: Option<u32>) -> String {
    line.map_or_else(|| "outdated".to_string(), |n| n.to_string())
}
