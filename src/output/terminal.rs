//! Terminal renderer: styled flowing text grouped by file.

use colored::Colorize;

use crate::models::{AiComment, PullRequestReview};
use crate::output::OutputRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, review: &PullRequestReview) -> String {
        let mut output = String::new();

        if review.comments.is_empty() {
            output.push_str(&format!("{}", "  ✔ No comments.\n".green()));
        }

        let mut sorted: Vec<&AiComment> = review.comments.iter().collect();
        sorted.sort_by(|a, b| a.file.cmp(&b.file).then(a.line_range().cmp(&b.line_range())));

        let mut current_file = "";
        for comment in sorted {
            if comment.file != current_file {
                if !current_file.is_empty() {
                    output.push('\n');
                }
                current_file = &comment.file;
            }

            let (start, end) = comment.line_range();
            let location = if start == end {
                format!("{}:{start}", comment.file)
            } else {
                format!("{}:{start}-{end}", comment.file)
            };

            let icon = if comment.critical {
                "✖".red().bold().to_string()
            } else {
                "●".yellow().bold().to_string()
            };
            let label = if comment.critical {
                format!("{} (critical)", comment.label).red().bold().to_string()
            } else {
                comment.label.yellow().bold().to_string()
            };

            output.push_str(&format!(" {icon} {label} in {}\n", location.bold()));
            output.push_str(&format!("   {}\n", comment.header.bold()));
            for line in comment.content.lines() {
                output.push_str(&format!("   {line}\n"));
            }
            output.push('\n');
        }

        let score = &review.review;
        let critical = review.comments.iter().filter(|c| c.critical).count();
        output.push_str(&format!("{}\n", "───────────────────────────────────".dimmed()));
        output.push_str(&format!(
            " score {}/100 · effort {}/5 · tests: {} · {} {}, {} critical\n",
            score.score.to_string().bold(),
            score.estimated_effort_to_review,
            if score.has_relevant_tests { "yes" } else { "no" },
            review.comments.len().to_string().bold(),
            if review.comments.len() == 1 { "comment" } else { "comments" },
            critical.to_string().red().bold(),
        ));
        output.push_str(&format!(
            " {} {}\n",
            "security:".dimmed(),
            score.security_concerns.trim()
        ));

        output
    }
}
