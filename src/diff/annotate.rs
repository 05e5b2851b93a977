//! Attach existing review threads to the hunks they were written against.

use tracing::debug;

use crate::models::{AnnotatedHunk, File, FileDiff, Hunk, ReviewComment, ReviewCommentThread};

/// Number of trailing `diff_hunk` lines used to re-locate an outdated comment.
const ANCHOR_LINES: usize = 3;

/// Anchors shorter than this (after trimming) match too much to be useful.
const MIN_ANCHOR_LEN: usize = 3;

/// Pair each hunk of `file` with the threads that belong to it.
///
/// Threads keep their input order within a hunk. A thread that cannot be
/// placed is left out; hunk text and numbering are never modified.
pub fn annotate_file(file: &File, threads: &[&ReviewCommentThread]) -> FileDiff {
    let mut hunks: Vec<AnnotatedHunk> = file
        .hunks
        .iter()
        .map(|hunk| AnnotatedHunk {
            hunk: hunk.clone(),
            threads: Vec::new(),
        })
        .collect();

    for thread in threads {
        let Some(root) = thread.root() else {
            continue;
        };

        match locate(&file.hunks, root) {
            Some(idx) => hunks[idx].threads.push((*thread).clone()),
            None => debug!(
                file = %file.filename,
                comment_id = root.id,
                "thread does not match any hunk, leaving it out of the prompt"
            ),
        }
    }

    FileDiff {
        filename: file.filename.clone(),
        status: file.status,
        hunks,
    }
}

/// Index of the hunk a root comment belongs to.
fn locate(hunks: &[Hunk], root: &ReviewComment) -> Option<usize> {
    if let Some((start, end)) = root.line_range() {
        let by_range = hunks
            .iter()
            .position(|h| h.covers(start, end))
            .or_else(|| hunks.iter().position(|h| h.has_new_line(end)));
        if by_range.is_some() {
            return by_range;
        }
    }

    let context = root.diff_hunk.as_deref()?;
    locate_by_context(hunks, context, root.original_line_range())
}

/// Best-effort match of a comment's recorded hunk context against the
/// current hunks, for comments whose line no longer exists.
///
/// An identical `@@` header wins outright. Otherwise each hunk is scored by
/// how many of the context's trailing lines it still contains; the highest
/// non-zero score wins. Ties go to the hunk covering the comment's original
/// line, then to the earlier hunk.
fn locate_by_context(
    hunks: &[Hunk],
    context: &str,
    original: Option<(u32, u32)>,
) -> Option<usize> {
    let mut lines = context.lines();
    let header = lines.next()?.trim_end();

    if header.starts_with("@@") {
        if let Some(idx) = hunks.iter().position(|h| h.header == header) {
            return Some(idx);
        }
    }

    let body: Vec<&str> = lines.collect();
    let anchors: Vec<&str> = body
        .iter()
        .rev()
        .take(ANCHOR_LINES)
        .map(|line| strip_marker(line).trim())
        .filter(|line| line.len() >= MIN_ANCHOR_LEN)
        .collect();
    if anchors.is_empty() {
        return None;
    }

    let near_original = |hunk: &Hunk| original.is_some_and(|(_, end)| hunk.has_new_line(end));

    let mut best: Option<(usize, usize)> = None;
    for (idx, hunk) in hunks.iter().enumerate() {
        let score = anchors.iter().filter(|a| hunk_contains(hunk, a)).count();
        let better = match best {
            None => score > 0,
            Some((top_idx, top)) => {
                score > top
                    || (score == top && near_original(hunk) && !near_original(&hunks[top_idx]))
            }
        };
        if better {
            best = Some((idx, score));
        }
    }

    best.map(|(idx, _)| idx)
}

fn strip_marker(line: &str) -> &str {
    match line.chars().next() {
        Some('+' | '-' | ' ') => &line[1..],
        _ => line,
    }
}

fn hunk_contains(hunk: &Hunk, anchor: &str) -> bool {
    hunk.new_lines.iter().any(|l| l.text.trim() == anchor)
        || hunk
            .old_lines
            .iter()
            .flatten()
            .any(|l| l.text.trim() == anchor)
}
