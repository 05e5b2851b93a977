//! Git CLI wrapper for producing local diffs.
//!
//! Shells out to `git` via `tokio::process::Command`.

use std::path::Path;

use super::DiffError;
use super::parser::parse_unified_diff;
use crate::models::FilePatch;

/// Run `git diff <base_ref>` in `repo_root` and split the output per file.
pub async fn git_diff(repo_root: &Path, base_ref: &str) -> Result<Vec<FilePatch>, DiffError> {
    let output = tokio::process::Command::new("git")
        .args(["diff", "--src-prefix=a/", "--dst-prefix=b/", base_ref])
        .current_dir(repo_root)
        .output()
        .await
        .map_err(|e| DiffError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DiffError::GitError(format!(
            "git diff failed (exit {}): {stderr}",
            output.status
        )));
    }

    let text = String::from_utf8(output.stdout)
        .map_err(|e| DiffError::GitError(format!("git output is not valid UTF-8: {e}")))?;
    Ok(parse_unified_diff(&text))
}
