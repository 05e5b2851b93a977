//! Diff engine: patch parsing, comment-thread annotation and prompt serialization.

pub mod annotate;
pub mod file;
pub mod format;
pub mod git;
pub mod parser;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::warn;

use crate::models::diff::FilePatch;
use crate::models::{File, FileDiff, ReviewCommentThread};

/// Errors from the diff engine.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("failed to read diff file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("git error: {0}")]
    GitError(String),

    #[error("diff parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    #[error("none of the {0} changed file(s) had a parsable diff")]
    NoParsableFiles(usize),
}

/// Parse every file patch, skipping files whose diff is malformed.
///
/// A malformed file is logged and left out; the run only fails when files
/// were given and not a single one could be parsed.
pub fn parse_files(patches: &[FilePatch]) -> Result<Vec<File>, DiffError> {
    let mut files = Vec::with_capacity(patches.len());

    for patch in patches {
        match parser::parse_file_patch(patch) {
            Ok(file) => files.push(file),
            Err(e) => warn!(file = %patch.filename, "skipping file: {e}"),
        }
    }

    if files.is_empty() && !patches.is_empty() {
        return Err(DiffError::NoParsableFiles(patches.len()));
    }

    Ok(files)
}

/// Attach each file's threads to its hunks, preserving file order.
///
/// Threads on files outside the diff are ignored.
pub fn build_file_diffs(files: &[File], threads: &[ReviewCommentThread]) -> Vec<FileDiff> {
    let mut by_file: IndexMap<&str, Vec<&ReviewCommentThread>> = IndexMap::new();
    for thread in threads {
        by_file.entry(thread.file.as_str()).or_default().push(thread);
    }

    files
        .iter()
        .map(|file| {
            let file_threads = by_file
                .get(file.filename.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            annotate::annotate_file(file, file_threads)
        })
        .collect()
}
