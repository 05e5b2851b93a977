//! Render annotated diffs into the text block the model reads.
//!
//! ```text
//! ## File: 'src/lib.rs'
//!
//! @@ -1,3 +1,4 @@
//! __new hunk__
//! 1  line1
//! 2 +line2-new
//! __old hunk__
//!  line1
//! -line2
//!  __existing_comment_thread__
//!  alice: why?
//! ```
//!
//! Output is a pure function of its input: identical diffs render to
//! identical text.

use std::fmt::Write;

use crate::models::diff::{NewLinePrefix, OldLinePrefix};
use crate::models::{AnnotatedHunk, File, FileDiff, ReviewCommentThread};

pub const NEW_HUNK_MARKER: &str = "__new hunk__";
pub const OLD_HUNK_MARKER: &str = "__old hunk__";
pub const THREAD_MARKER: &str = "__existing_comment_thread__";

/// Render one annotated file.
pub fn generate_file_code_diff(file: &FileDiff) -> String {
    let hunks: Vec<String> = file.hunks.iter().map(render_hunk).collect();
    format!("## File: '{}'\n\n{}", file.filename, hunks.join("\n\n"))
}

/// Render every file, separated by a blank line.
pub fn generate_files_code_diff(files: &[FileDiff]) -> String {
    files
        .iter()
        .map(generate_file_code_diff)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_hunk(annotated: &AnnotatedHunk) -> String {
    let hunk = &annotated.hunk;
    let mut out = String::new();

    let _ = writeln!(out, "{}", hunk.header);
    out.push_str(NEW_HUNK_MARKER);
    for line in &hunk.new_lines {
        let marker = match line.prefix {
            NewLinePrefix::Context => ' ',
            NewLinePrefix::Added => '+',
        };
        let _ = write!(out, "\n{} {marker}{}", line.line_number, line.text);
    }

    if let Some(old_lines) = &hunk.old_lines {
        out.push('\n');
        out.push_str(OLD_HUNK_MARKER);
        for line in old_lines {
            let marker = match line.prefix {
                OldLinePrefix::Context => ' ',
                OldLinePrefix::Removed => '-',
            };
            let _ = write!(out, "\n{marker}{}", line.text);
        }
    }

    // Threads follow the old side when there is one, the new side otherwise
    for thread in &annotated.threads {
        out.push('\n');
        out.push_str(&render_thread(thread));
    }

    out
}

fn render_thread(thread: &ReviewCommentThread) -> String {
    let mut out = format!(" {THREAD_MARKER}");
    for comment in &thread.comments {
        let _ = write!(out, "\n {}: {}", comment.user.login, comment.body);
    }
    out
}

/// A file's raw patch under its header, for prompts that want the
/// unannotated diff.
pub fn format_file_diff(file: &File) -> String {
    format!(
        "## File: '{}'\n\n{}",
        file.filename,
        file.patch.as_deref().unwrap_or_default()
    )
}

/// `- status: filename` per changed file, including files without hunks.
pub fn format_affected_files(files: &[File]) -> String {
    files
        .iter()
        .map(|f| format!("- {}: {}", f.status, f.filename))
        .collect::<Vec<_>>()
        .join("\n")
}
