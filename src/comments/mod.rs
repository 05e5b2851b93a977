//! Review comment threads: reconstruction, authorship and relevance.

pub mod relevance;
pub mod threads;

pub use relevance::BotIdentity;
pub use threads::generate_comment_threads;

use crate::models::{ReviewComment, ReviewCommentThread};

/// Attribute every signed comment to the bot's canonical login, whichever
/// account actually posted it.
pub fn normalize_authors(comments: &mut [ReviewComment], bot: &BotIdentity) {
    for comment in comments.iter_mut() {
        if bot.is_own_comment(&comment.body) {
            comment.user.login.clone_from(&bot.login);
        }
    }
}

/// The thread containing the given comment, if any.
pub fn find_thread_for_comment(
    threads: &[ReviewCommentThread],
    comment_id: u64,
) -> Option<&ReviewCommentThread> {
    threads.iter().find(|t| t.contains(comment_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn comment(id: u64, login: &str, body: &str, parent: Option<u64>) -> ReviewComment {
        ReviewComment {
            id,
            path: "src/lib.rs".into(),
            body: body.into(),
            diff_hunk: None,
            line: Some(3),
            start_line: None,
            original_line: None,
            original_start_line: None,
            in_reply_to_id: parent,
            user: User { login: login.into() },
            created_at: None,
        }
    }

    #[test]
    fn signed_comments_become_bot_authored() {
        let bot = BotIdentity::default();
        let mut comments = vec![
            comment(1, "github-actions[bot]", &bot.sign("Off by one."), None),
            comment(2, "alice", "Fixed, thanks", Some(1)),
        ];
        normalize_authors(&mut comments, &bot);
        assert_eq!(comments[0].user.login, "presubmit");
        assert_eq!(comments[1].user.login, "alice");
    }

    #[test]
    fn find_thread_by_any_member() {
        let threads = generate_comment_threads(&[
            comment(1, "alice", "first", None),
            comment(2, "bob", "second", None),
            comment(3, "alice", "reply", Some(2)),
        ]);
        assert_eq!(
            find_thread_for_comment(&threads, 3).and_then(|t| t.root()).map(|c| c.id),
            Some(2)
        );
        assert!(find_thread_for_comment(&threads, 42).is_none());
    }
}
