//! Diff-related types: files, hunks, and the two per-hunk line sequences.

use serde::{Deserialize, Serialize};

use super::comment::ReviewCommentThread;

/// How a file changed in the pull request.
///
/// GitHub reports a few more statuses than we distinguish; those fold into
/// the closest kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileStatus {
    #[serde(alias = "copied")]
    Added,
    #[serde(alias = "changed", alias = "unchanged")]
    Modified,
    #[serde(alias = "deleted")]
    Removed,
    Renamed,
}

/// Marker of a line on the new side of a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewLinePrefix {
    /// Unchanged line.
    Context,
    /// Line added by the pull request.
    Added,
}

/// A numbered line on the new side of a hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHunkLine {
    /// 1-based line number in the new version of the file.
    pub line_number: u32,
    pub prefix: NewLinePrefix,
    /// Line content without the diff marker.
    pub text: String,
}

/// Marker of a line on the old side of a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OldLinePrefix {
    Context,
    Removed,
}

/// An unnumbered line on the old side of a hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldHunkLine {
    pub prefix: OldLinePrefix,
    pub text: String,
}

/// A contiguous hunk within a file diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// The `@@ -a,b +c,d @@ context` line exactly as it appeared in the patch.
    pub header: String,
    /// Starting line in the old file.
    pub old_start: u32,
    /// Number of lines in the old file.
    pub old_count: u32,
    /// Starting line in the new file.
    pub new_start: u32,
    /// Number of lines in the new file.
    pub new_count: u32,
    /// New-side lines (context and added), numbered from `new_start`.
    pub new_lines: Vec<NewHunkLine>,
    /// Old-side lines (context and removed). `None` when nothing was removed.
    pub old_lines: Option<Vec<OldHunkLine>>,
}

impl Hunk {
    /// First and last new-side line numbers, if the hunk has any new-side lines.
    pub fn new_span(&self) -> Option<(u32, u32)> {
        let first = self.new_lines.first()?.line_number;
        let last = self.new_lines.last()?.line_number;
        Some((first, last))
    }

    /// Whether `start..=end` lies within this hunk's new-side span.
    pub fn covers(&self, start: u32, end: u32) -> bool {
        match self.new_span() {
            Some((first, last)) => first <= start && end <= last,
            None => false,
        }
    }

    /// Whether the given new-side line number appears in this hunk.
    pub fn has_new_line(&self, line_number: u32) -> bool {
        self.new_lines.iter().any(|l| l.line_number == line_number)
    }

    /// Whether the hunk removed at least one line.
    pub fn has_removed_lines(&self) -> bool {
        self.old_lines.is_some()
    }
}

/// The unparsed diff of one file, as listed by GitHub's pull request files
/// endpoint or split out of a local `git diff`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePatch {
    pub filename: String,
    pub status: FileStatus,
    #[serde(default)]
    pub previous_filename: Option<String>,
    /// Absent for binary files and for renames without content changes.
    #[serde(default)]
    pub patch: Option<String>,
}

/// A file touched by the pull request, with its parsed hunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Path after the change (the post-rename name for renames).
    pub filename: String,
    pub status: FileStatus,
    /// Path before a rename.
    pub previous_filename: Option<String>,
    /// Raw patch text. `None` for binary files and content-less renames.
    pub patch: Option<String>,
    /// Parsed hunks, empty when there is no textual patch.
    pub hunks: Vec<Hunk>,
}

impl File {
    /// Whether the given new-side line number is present in any hunk.
    pub fn has_new_line(&self, line_number: u32) -> bool {
        self.hunks.iter().any(|h| h.has_new_line(line_number))
    }

    /// Number of added lines across all hunks.
    pub fn added_lines(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.new_lines)
            .filter(|l| l.prefix == NewLinePrefix::Added)
            .count()
    }

    /// Number of removed lines across all hunks.
    pub fn removed_lines(&self) -> usize {
        self.hunks
            .iter()
            .filter_map(|h| h.old_lines.as_ref())
            .flatten()
            .filter(|l| l.prefix == OldLinePrefix::Removed)
            .count()
    }
}

/// A hunk together with the existing comment threads attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedHunk {
    pub hunk: Hunk,
    /// Threads in discovery order.
    pub threads: Vec<ReviewCommentThread>,
}

/// A file ready for serialization into the model prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub filename: String,
    pub status: FileStatus,
    pub hunks: Vec<AnnotatedHunk>,
}

impl FileDiff {
    /// Total number of threads embedded across all hunks.
    pub fn thread_count(&self) -> usize {
        self.hunks.iter().map(|h| h.threads.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunk(numbers: &[u32]) -> Hunk {
        Hunk {
            header: "@@ -1 +1 @@".into(),
            old_start: 1,
            old_count: 1,
            new_start: numbers.first().copied().unwrap_or(1),
            new_count: numbers.len() as u32,
            new_lines: numbers
                .iter()
                .map(|&n| NewHunkLine {
                    line_number: n,
                    prefix: NewLinePrefix::Context,
                    text: format!("line {n}"),
                })
                .collect(),
            old_lines: None,
        }
    }

    #[test]
    fn file_status_accepts_github_variants() {
        let parse = |s: &str| serde_json::from_str::<FileStatus>(&format!("\"{s}\""));
        assert_eq!(parse("copied").unwrap(), FileStatus::Added);
        assert_eq!(parse("changed").unwrap(), FileStatus::Modified);
        assert_eq!(parse("deleted").unwrap(), FileStatus::Removed);
        assert_eq!(parse("renamed").unwrap(), FileStatus::Renamed);
        assert!(parse("exploded").is_err());
    }

    #[test]
    fn file_status_display_is_lowercase() {
        assert_eq!(FileStatus::Renamed.to_string(), "renamed");
        assert_eq!(FileStatus::Added.to_string(), "added");
    }

    #[test]
    fn file_status_deserializes_from_json() {
        let status: FileStatus = serde_json::from_str("\"unchanged\"").unwrap();
        assert_eq!(status, FileStatus::Modified);
    }

    #[test]
    fn hunk_span_and_cover() {
        let h = hunk(&[10, 11, 12]);
        assert_eq!(h.new_span(), Some((10, 12)));
        assert!(h.covers(10, 12));
        assert!(h.covers(11, 11));
        assert!(!h.covers(9, 11));
        assert!(!h.covers(12, 13));
    }

    #[test]
    fn empty_hunk_covers_nothing() {
        let h = hunk(&[]);
        assert_eq!(h.new_span(), None);
        assert!(!h.covers(1, 1));
    }
}
