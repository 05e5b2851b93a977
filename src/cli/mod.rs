//! CLI command definitions and argument parsing.
//!
//! Uses clap derive macros for ergonomic argument definitions.

pub mod args;

use colored::Colorize;

use presubmit::orchestrator::{ReplyOutcome, ReviewOutcome};

/// One-line status for a finished review, printed to stderr.
pub fn review_status(outcome: &ReviewOutcome, dry_run: bool) -> String {
    let verb = if dry_run { "would post" } else { "posted" };
    let mut line = format!(
        "{} {verb} {} comment(s) on '{}'",
        "✔".green().bold(),
        outcome.posted_comments,
        outcome.summary.title,
    );
    if outcome.dropped_comments > 0 {
        line.push_str(&format!(
            ", {}",
            format!("{} dropped outside the diff", outcome.dropped_comments).yellow()
        ));
    }
    line
}

/// One-line status for a reply attempt, printed to stderr.
pub fn reply_status(outcome: &ReplyOutcome, dry_run: bool) -> String {
    match outcome {
        ReplyOutcome::Replied(_) if dry_run => format!("{} would reply", "✔".green().bold()),
        ReplyOutcome::Replied(_) => format!("{} replied", "✔".green().bold()),
        ReplyOutcome::NoActionRequested => "no reply needed".dimmed().to_string(),
        ReplyOutcome::NotRelevant => "thread does not involve the bot".dimmed().to_string(),
        ReplyOutcome::OwnComment => "latest comment is the bot's own".dimmed().to_string(),
        ReplyOutcome::ThreadNotFound => "comment thread not found".yellow().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_status_messages() {
        colored::control::set_override(false);
        assert_eq!(reply_status(&ReplyOutcome::Replied("x".into()), true), "✔ would reply");
        assert_eq!(reply_status(&ReplyOutcome::NotRelevant, false), "thread does not involve the bot");
    }
}
