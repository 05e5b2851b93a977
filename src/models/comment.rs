//! Review comment types as returned by the GitHub pull request API.

use serde::{Deserialize, Deserializer, Serialize};

/// The account that posted a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

impl Default for User {
    /// GitHub shows deleted accounts as `ghost`.
    fn default() -> Self {
        Self {
            login: "ghost".to_string(),
        }
    }
}

/// A single inline review comment.
///
/// Unknown fields of the REST payload are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    /// File the comment is attached to.
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    /// Hunk context captured when the comment was made.
    #[serde(default)]
    pub diff_hunk: Option<String>,
    /// Last line of the commented range on the new side. `None` once outdated.
    #[serde(default)]
    pub line: Option<u32>,
    /// First line of a multi-line comment.
    #[serde(default)]
    pub start_line: Option<u32>,
    /// `line` as of the commit the comment was made on.
    #[serde(default)]
    pub original_line: Option<u32>,
    #[serde(default)]
    pub original_start_line: Option<u32>,
    /// Parent comment id. Absent for thread roots.
    #[serde(default)]
    pub in_reply_to_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: User,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ReviewComment {
    /// Whether this comment starts a thread.
    pub fn is_root(&self) -> bool {
        self.in_reply_to_id.is_none()
    }

    /// The commented new-side range, `(start, end)` inclusive.
    pub fn line_range(&self) -> Option<(u32, u32)> {
        let end = self.line?;
        let start = self.start_line.unwrap_or(end).min(end);
        Some((start, end))
    }

    /// The range as recorded against the commit the comment was made on.
    pub fn original_line_range(&self) -> Option<(u32, u32)> {
        let end = self.original_line?;
        let start = self.original_start_line.unwrap_or(end).min(end);
        Some((start, end))
    }
}

/// A root comment and all of its transitive replies, scoped to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCommentThread {
    /// The root comment's path.
    pub file: String,
    /// Root first, replies in pre-order.
    pub comments: Vec<ReviewComment>,
}

impl ReviewCommentThread {
    pub fn root(&self) -> Option<&ReviewComment> {
        self.comments.first()
    }

    pub fn last(&self) -> Option<&ReviewComment> {
        self.comments.last()
    }

    pub fn contains(&self, comment_id: u64) -> bool {
        self.comments.iter().any(|c| c.id == comment_id)
    }
}

/// Map JSON `null` to the type's default instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_github_payload() {
        let json = r#"{
            "id": 42,
            "node_id": "PRRC_kw",
            "path": "src/lib.rs",
            "body": "Looks off",
            "diff_hunk": "@@ -1,2 +1,3 @@\n a\n+b",
            "line": 2,
            "start_line": null,
            "original_line": 2,
            "in_reply_to_id": 7,
            "user": {"login": "octocat", "id": 1},
            "created_at": "2025-01-01T00:00:00Z"
        }"#;
        let c: ReviewComment = serde_json::from_str(json).unwrap();
        assert_eq!(c.id, 42);
        assert_eq!(c.in_reply_to_id, Some(7));
        assert_eq!(c.user.login, "octocat");
        assert!(!c.is_root());
        assert_eq!(c.line_range(), Some((2, 2)));
    }

    #[test]
    fn deserialize_null_user_as_ghost() {
        let json = r#"{"id": 1, "path": "a.rs", "body": "x", "user": null}"#;
        let c: ReviewComment = serde_json::from_str(json).unwrap();
        assert_eq!(c.user.login, "ghost");
        assert!(c.is_root());
        assert_eq!(c.line_range(), None);
    }

    #[test]
    fn multi_line_range() {
        let json = r#"{"id": 1, "path": "a.rs", "body": "x", "line": 9, "start_line": 5,
                       "original_line": 4, "original_start_line": 2, "user": {"login": "u"}}"#;
        let c: ReviewComment = serde_json::from_str(json).unwrap();
        assert_eq!(c.line_range(), Some((5, 9)));
        assert_eq!(c.original_line_range(), Some((2, 4)));
    }

    #[test]
    fn thread_helpers() {
        let comment = |id| ReviewComment {
            id,
            path: "a.rs".into(),
            body: format!("c{id}"),
            diff_hunk: None,
            line: None,
            start_line: None,
            original_line: None,
            original_start_line: None,
            in_reply_to_id: None,
            user: User::default(),
            created_at: None,
        };
        let thread = ReviewCommentThread {
            file: "a.rs".into(),
            comments: vec![comment(1), comment(2)],
        };
        assert_eq!(thread.root().map(|c| c.id), Some(1));
        assert_eq!(thread.last().map(|c| c.id), Some(2));
        assert!(thread.contains(2));
        assert!(!thread.contains(3));
    }
}
