//! Code review prompt over the annotated `__new hunk__` / `__old hunk__` diff.

use super::{Prompt, PromptSettings};
use crate::diff::format::generate_files_code_diff;
use crate::models::FileDiff;

/// Inputs for [`build_review_prompt`].
#[derive(Debug, Clone, Copy)]
pub struct ReviewInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    /// Generated summary of the whole pull request.
    pub summary: &'a str,
    pub files: &'a [FileDiff],
}

pub fn build_review_prompt(input: &ReviewInput<'_>, settings: &PromptSettings) -> Prompt {
    let bot = &settings.bot_login;
    let guidelines = match &settings.style_guide_rules {
        Some(rules) => format!(
            "Guidelines for the review, such as style guides, conventions, or best practices, \
             violating the following guidelines should result in a critical comment:\n{rules}\n"
        ),
        None => String::new(),
    };

    let system = format!(
        "<IMPORTANT INSTRUCTIONS>
You are an experienced senior software engineer tasked with reviewing a Git Pull Request (PR). Your goal is to provide comments to improve code quality, catch typos, potential bugs or security issues, and provide meaningful code suggestions when applicable. You should not make comments about adding comments, about code formatting, about code style or give implementation suggestions.
{language}
The review should focus on new code added in the PR code diff (lines starting with '+') and be actionable.

The PR diff will have the following structure:
======
## File: 'src/file1.py'

@@ ... @@ def func1():
__new hunk__
11  unchanged code line0 in the PR
12  unchanged code line1 in the PR
13 +new code line2 added in the PR
14  unchanged code line3 in the PR
__old hunk__
 unchanged code line0
 unchanged code line1
-old code line2 removed in the PR
 unchanged code line3
 __existing_comment_thread__
 {bot}: This is a comment on the code
 user2: This is a reply to the comment above
 __existing_comment_thread__
 {bot}: This is a comment on some other parts of the code
 user2: This is a reply to the above comment

@@ ... @@ def func2():
__new hunk__
20  unchanged code line4
21 +new code line5 added in the PR
22  unchanged code line6

## File: 'src/file2.py'
...
======

- In the format above, the diff is organized into separate '__new hunk__' and '__old hunk__' sections for each code chunk. '__new hunk__' contains the updated code, while '__old hunk__' shows the removed code. If no code was removed in a specific chunk, the __old hunk__ section will be omitted.
- We also added line numbers for the '__new hunk__' code, to help you refer to the code lines in your suggestions. These line numbers are not part of the actual code, and should only be used for reference.
- Code lines are prefixed with symbols ('+', '-', ' '). The '+' symbol indicates new code added in the PR, the '-' symbol indicates code removed in the PR, and the ' ' symbol indicates unchanged code. The review should address new code added in the PR code diff (lines starting with '+').
- Existing discussions on a hunk follow it as '__existing_comment_thread__' blocks. Comments from {bot} are yours.
- Use markdown formatting for your comments.
- Do not return comments that are even slightly similar to other existing comments for the same hunk diffs.
- If you cannot find any actionable comments, return an empty array.
- VERY IMPORTANT: Keep in mind you're only seeing part of the code, and the code might be incomplete. Do not make assumptions about the code outside the diff.

{guidelines}</IMPORTANT INSTRUCTIONS>
",
        language = settings.language_clause().trim_start(),
    );

    let user = format!(
        "<PR title>\n{title}\n</PR title>\n\n\
         <PR Description>\n{description}\n</PR Description>\n\n\
         <PR Summary>\n{summary}\n</PR Summary>\n\n\
         <PR File Diffs>\n{diffs}\n</PR File Diffs>\n",
        title = input.title,
        description = input.description,
        summary = input.summary,
        diffs = generate_files_code_diff(input.files),
    );

    Prompt { system, user }
}
