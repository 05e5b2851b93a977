//! Read a local unified diff and split it into per-file patches.

use std::path::Path;

use tokio::io::AsyncReadExt;

use super::DiffError;
use super::parser::parse_unified_diff;
use crate::models::FilePatch;

/// Read a unified diff from a file path.
pub async fn read_diff_file(path: &Path) -> Result<Vec<FilePatch>, DiffError> {
    if !path.exists() {
        return Err(DiffError::PathNotFound(path.display().to_string()));
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(DiffError::FileReadError)?;
    Ok(parse_unified_diff(&text))
}

/// Read a unified diff piped on stdin.
pub async fn read_diff_stdin() -> Result<Vec<FilePatch>, DiffError> {
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .map_err(DiffError::FileReadError)?;
    Ok(parse_unified_diff(&text))
}
