//! Unified diff parser.
//!
//! Two entry points:
//! - [`parse_file_patch`] turns one file's patch (as GitHub returns it, a
//!   sequence of `@@` hunks) into a [`File`] with numbered new-side lines.
//! - [`parse_unified_diff`] splits a full `git diff` document into per-file
//!   [`FilePatch`]es so local diffs go through the same path.

use std::iter::Peekable;
use std::str::Lines;

use super::DiffError;
use crate::models::diff::{
    File, FilePatch, FileStatus, Hunk, NewHunkLine, NewLinePrefix, OldHunkLine, OldLinePrefix,
};

/// Parse a single file's patch into hunks.
///
/// Files without a textual patch (binary, pure rename) produce zero hunks.
/// A hunk header that cannot be parsed fails the whole file.
pub fn parse_file_patch(patch: &FilePatch) -> Result<File, DiffError> {
    let hunks = match patch.patch.as_deref() {
        Some(text) if !text.trim().is_empty() => {
            parse_hunks(text).map_err(|reason| DiffError::ParseError {
                file: patch.filename.clone(),
                reason,
            })?
        }
        _ => Vec::new(),
    };

    Ok(File {
        filename: patch.filename.clone(),
        status: patch.status,
        previous_filename: patch.previous_filename.clone(),
        patch: patch.patch.clone(),
        hunks,
    })
}

/// Parse every `@@` hunk in a patch. Text before the first header is ignored.
fn parse_hunks(text: &str) -> Result<Vec<Hunk>, String> {
    let mut hunks = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(&next) = lines.peek() {
        if next.starts_with("@@") {
            hunks.push(parse_hunk(&mut lines)?);
        } else {
            lines.next();
        }
    }

    Ok(hunks)
}

/// Parse a single hunk starting with its @@ line.
fn parse_hunk(lines: &mut Peekable<Lines<'_>>) -> Result<Hunk, String> {
    let header_line = lines.next().unwrap_or_default().trim_end();
    let (old_start, old_count, new_start, new_count) = parse_hunk_header(header_line)
        .ok_or_else(|| format!("malformed hunk header '{header_line}'"))?;

    let mut new_lines: Vec<NewHunkLine> = Vec::new();
    let mut old_lines: Vec<OldHunkLine> = Vec::new();
    let mut has_removed = false;
    // `None` once the numbering ran past `u32::MAX`
    let mut new_line = Some(new_start);

    while let Some(&next) = lines.peek() {
        if next.starts_with("@@") || next.starts_with("diff --git ") {
            break;
        }
        lines.next();

        if let Some(text) = next.strip_prefix('+') {
            new_lines.push(NewHunkLine {
                line_number: take_line_number(&mut new_line, header_line)?,
                prefix: NewLinePrefix::Added,
                text: text.to_string(),
            });
        } else if let Some(text) = next.strip_prefix('-') {
            has_removed = true;
            old_lines.push(OldHunkLine {
                prefix: OldLinePrefix::Removed,
                text: text.to_string(),
            });
        } else if next.starts_with(' ') || next.is_empty() {
            // An empty line is a context line whose trailing space was stripped.
            let text = next.get(1..).unwrap_or_default();
            new_lines.push(NewHunkLine {
                line_number: take_line_number(&mut new_line, header_line)?,
                prefix: NewLinePrefix::Context,
                text: text.to_string(),
            });
            old_lines.push(OldHunkLine {
                prefix: OldLinePrefix::Context,
                text: text.to_string(),
            });
        } else if next.starts_with('\\') {
            // "\ No newline at end of file"
            continue;
        } else {
            // Unknown line format, stop parsing this hunk
            break;
        }
    }

    Ok(Hunk {
        header: header_line.to_string(),
        old_start,
        old_count,
        new_start,
        new_count,
        new_lines,
        old_lines: has_removed.then_some(old_lines),
    })
}

/// Hand out the next 1-based new-side line number and advance the counter.
fn take_line_number(next: &mut Option<u32>, header: &str) -> Result<u32, String> {
    match *next {
        Some(0) => Err(format!("new-side line 0 in hunk '{header}'")),
        Some(n) => {
            *next = n.checked_add(1);
            Ok(n)
        }
        None => Err(format!("line number overflow in hunk '{header}'")),
    }
}

/// Parse a `@@ -old_start,old_count +new_start,new_count @@ context` line.
fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32)> {
    let line = line.strip_prefix("@@ ")?;
    let end = line.find(" @@")?;
    let range_part = &line[..end];

    let parts: Vec<&str> = range_part.split(' ').collect();
    if parts.len() != 2 {
        return None;
    }

    let (old_start, old_count) = parse_range(parts[0].strip_prefix('-')?)?;
    let (new_start, new_count) = parse_range(parts[1].strip_prefix('+')?)?;

    Some((old_start, old_count, new_start, new_count))
}

/// Parse "start,count" or "start" (count defaults to 1).
fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}

/// Split a `git diff` document into per-file patches.
pub fn parse_unified_diff(input: &str) -> Vec<FilePatch> {
    let mut files: Vec<FilePatch> = Vec::new();
    let mut lines = input.lines().peekable();

    while let Some(line) = lines.next() {
        if !line.starts_with("diff --git ") {
            continue;
        }

        let (old_path, new_path) = parse_diff_header(line);
        let mut is_new = false;
        let mut is_deleted = false;
        let mut is_rename = false;
        let mut is_binary = false;
        let mut body: Vec<&str> = Vec::new();

        // Extended headers until the first hunk, then the hunks verbatim
        while let Some(&next) = lines.peek() {
            if next.starts_with("diff --git ") {
                break;
            }
            lines.next();

            if !body.is_empty() || next.starts_with("@@") {
                body.push(next);
            } else if next.starts_with("new file mode") {
                is_new = true;
            } else if next.starts_with("deleted file mode") {
                is_deleted = true;
            } else if next.starts_with("rename from") || next.starts_with("rename to") {
                is_rename = true;
            } else if next.starts_with("Binary files") || next.starts_with("GIT binary patch") {
                is_binary = true;
            }
        }

        let status = if is_new {
            FileStatus::Added
        } else if is_deleted {
            FileStatus::Removed
        } else if is_rename {
            FileStatus::Renamed
        } else {
            FileStatus::Modified
        };

        files.push(FilePatch {
            filename: if is_deleted { old_path.clone() } else { new_path },
            status,
            previous_filename: is_rename.then_some(old_path),
            patch: (!is_binary && !body.is_empty()).then(|| body.join("\n")),
        });
    }

    files
}

/// Parse the "diff --git a/path b/path" header line.
fn parse_diff_header(line: &str) -> (String, String) {
    let rest = line.strip_prefix("diff --git ").unwrap_or(line);

    // Paths are prefixed with a/ and b/ (default), or c/w/i/o/ when
    // git's diff.mnemonicPrefix is enabled.
    if let Some(b_idx) = find_second_prefix(rest) {
        let old_path = strip_diff_prefix(&rest[..b_idx]).to_string();
        let new_path = strip_diff_prefix(&rest[b_idx + 1..]).to_string();
        (old_path, new_path)
    } else {
        let mut parts = rest.splitn(2, ' ');
        let old_path = strip_diff_prefix(parts.next().unwrap_or_default()).to_string();
        let new_path = strip_diff_prefix(parts.next().unwrap_or_default()).to_string();
        (old_path, new_path)
    }
}

/// Strip a single-character git diff prefix (`a/`, `b/`, `c/`, `w/`, `i/`, `o/`).
fn strip_diff_prefix(path: &str) -> &str {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b'/' && matches!(bytes[0], b'a' | b'b' | b'c' | b'w' | b'i' | b'o') {
        return &path[2..];
    }
    path
}

/// Find the position of the second path prefix separator in a diff header.
fn find_second_prefix(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    (1..bytes.len().saturating_sub(1)).find(|&i| {
        bytes[i] == b' '
            && bytes.get(i + 2) == Some(&b'/')
            && matches!(bytes.get(i + 1), Some(b'a' | b'b' | b'c' | b'w' | b'i' | b'o'))
    })
}
