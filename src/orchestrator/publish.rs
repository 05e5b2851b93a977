//! Turn model output into what gets posted: inline comments, the review
//! overview and the pull request description section.

use std::fmt::Write;

use tracing::warn;

use crate::comments::BotIdentity;
use crate::github::NewReviewComment;
use crate::models::{AiComment, File, PullRequestReview, PullRequestSummary};

/// Opening marker of the generated section in the pull request description.
pub const OVERVIEW_START: &str = "<!-- presubmit:overview:start -->";
/// Closing marker of the generated section.
pub const OVERVIEW_END: &str = "<!-- presubmit:overview:end -->";

/// Inline comments ready to post, plus how many were discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedComments {
    pub comments: Vec<NewReviewComment>,
    pub dropped: usize,
}

/// Keep the AI comments that point at a changed file and at lines present
/// on the new side of its diff, formatted and signed.
pub fn prepare_comments(
    ai_comments: &[AiComment],
    files: &[File],
    bot: &BotIdentity,
    max_chars: usize,
) -> PreparedComments {
    let mut prepared = PreparedComments::default();

    for comment in ai_comments {
        let Some(file) = files.iter().find(|f| f.filename == comment.file) else {
            warn!(file = %comment.file, "dropping comment on a file outside the diff");
            prepared.dropped += 1;
            continue;
        };

        let (start, end) = comment.line_range();
        if !file.has_new_line(start) || !file.has_new_line(end) {
            warn!(
                file = %comment.file,
                start,
                end,
                "dropping comment on lines not in the diff"
            );
            prepared.dropped += 1;
            continue;
        }

        let body = sign_truncated(&format_comment_body(comment), bot, max_chars);
        prepared
            .comments
            .push(NewReviewComment::new(&comment.file, body, start, end));
    }

    prepared
}

/// `**header**`, the content, then the label badge.
pub fn format_comment_body(comment: &AiComment) -> String {
    let badge = if comment.critical {
        format!("`{}` · **critical**", comment.label)
    } else {
        format!("`{}`", comment.label)
    };
    format!(
        "**{}**\n\n{}\n\n{badge}",
        comment.header.trim(),
        comment.content.trim()
    )
}

/// Sign `body`, cutting it first so the signed text fits in `max_chars`.
///
/// The signature always survives; it is how the bot recognizes its own
/// comments later.
pub fn sign_truncated(body: &str, bot: &BotIdentity, max_chars: usize) -> String {
    let reserved = bot.signature.chars().count() + 2;
    let budget = max_chars.saturating_sub(reserved);
    if body.chars().count() <= budget {
        return bot.sign(body);
    }

    let ellipsis = "…";
    let kept: String = body.chars().take(budget.saturating_sub(1)).collect();
    bot.sign(&format!("{kept}{ellipsis}"))
}

/// Body of the review that carries the inline comments.
pub fn format_review_overview(review: &PullRequestReview, posted: usize) -> String {
    let score = &review.review;
    let tests = if score.has_relevant_tests { "Yes" } else { "No" };

    let mut out = String::from("## Review overview\n\n");
    out.push_str("| | |\n|---|---|\n");
    let _ = writeln!(out, "| Score | {}/100 |", score.score);
    let _ = writeln!(
        out,
        "| Estimated effort to review | {}/5 |",
        score.estimated_effort_to_review
    );
    let _ = writeln!(out, "| Relevant tests | {tests} |");
    let _ = writeln!(
        out,
        "| Security concerns | {} |",
        score.security_concerns.trim().replace('\n', " ")
    );

    match posted {
        0 => out.push_str("\nNo inline comments."),
        1 => out.push_str("\n1 inline comment."),
        n => {
            let _ = write!(out, "\n{n} inline comments.");
        }
    }

    out
}

/// The generated summary section, wrapped in its markers.
pub fn format_summary_section(summary: &PullRequestSummary) -> String {
    let mut out = format!("{OVERVIEW_START}\n## {}\n\n", summary.title.trim());
    out.push_str(summary.description.trim());
    out.push('\n');

    if !summary.kinds.is_empty() {
        let _ = write!(out, "\n**Type:** {}\n", summary.kinds.join(", "));
    }

    if !summary.files.is_empty() {
        out.push_str("\n<details>\n<summary>Changes by file</summary>\n\n");
        out.push_str("| File | Changes |\n|---|---|\n");
        for file in &summary.files {
            let _ = writeln!(
                out,
                "| `{}` | **{}**<br>{} |",
                file.filename,
                file.title.trim(),
                file.summary.trim().replace('\n', "<br>")
            );
        }
        out.push_str("\n</details>\n");
    }

    out.push_str(OVERVIEW_END);
    out
}

/// Put `section` into `description`, replacing an earlier generated
/// section when there is one and appending otherwise.
pub fn merge_description(description: &str, section: &str) -> String {
    if let Some(start) = description.find(OVERVIEW_START) {
        if let Some(end_rel) = description[start..].find(OVERVIEW_END) {
            let end = start + end_rel + OVERVIEW_END.len();
            return format!("{}{section}{}", &description[..start], &description[end..]);
        }
    }

    let trimmed = description.trim_end();
    if trimmed.is_empty() {
        section.to_string()
    } else {
        format!("{trimmed}\n\n{section}")
    }
}

/// The description as the author wrote it, without the generated section.
pub fn author_description(description: &str) -> String {
    match description.find(OVERVIEW_START) {
        Some(start) => {
            let tail = description[start..]
                .find(OVERVIEW_END)
                .map(|end| &description[start + end + OVERVIEW_END.len()..])
                .unwrap_or_default();
            format!("{}{}", &description[..start], tail).trim().to_string()
        }
        None => description.trim().to_string(),
    }
}
