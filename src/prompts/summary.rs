//! Pull request summary prompt.

use super::{Prompt, PromptSettings};
use crate::diff::format::{format_affected_files, format_file_diff};
use crate::models::File;

/// Inputs for [`build_summary_prompt`].
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub commit_messages: &'a [String],
    pub files: &'a [File],
}

const SUMMARY_GUIDELINES: &str = "
- Keep in mind that the 'Original title', 'Original description' and 'Commit messages' sections may be partial, simplistic, non-informative or out of date. Hence, compare them to the PR diff code, and use them only as a reference.
- The generated title and description should prioritize the most significant changes.
- When quoting variables or names from the code, use backticks (`).
- Return a summary for each single affected file or if there is nothing to summarize simply use the status of the change (ie. \"New file\").
- Start the overview with a verb at past tense like \"Started\", \"Commented\", \"Generated\" etc...

IMPORTANT: Do not make assumptions about the code outside the diff. Do not assume variable could be optional if you don't see the type declaration. Do not suggest null checks unless you are sure this could lead to a runtime error.
";

pub fn build_summary_prompt(input: &SummaryInput<'_>, settings: &PromptSettings) -> Prompt {
    let system = format!(
        "You are a helpful assistant that summarizes Git Pull Requests (PRs).{} \
         Your task is to provide a full description for the PR content - title, type, \
         description and affected file summaries.\n{SUMMARY_GUIDELINES}",
        settings.language_clause()
    );

    let diffs: Vec<String> = input.files.iter().map(format_file_diff).collect();

    let user = format!(
        "Summarize the following PR:\n\n\
         <Original PR Title>{title}</Original PR Title>\n\
         <Original PR Description>\n{description}\n</Original PR Description>\n\
         <Commit Messages>\n{commits}\n</Commit Messages>\n\n\
         <Affected Files>\n{affected}\n</Affected Files>\n\n\
         <File Diffs>\n{diffs}\n</File Diffs>\n\n\
         Make sure each affected file is summarized and it's part of the returned JSON.\n",
        title = input.title,
        description = input.description,
        commits = input.commit_messages.join("\n"),
        affected = format_affected_files(input.files),
        diffs = diffs.join("\n\n"),
    );

    Prompt { system, user }
}
