//! Rebuild comment threads from GitHub's flat reply-pointer list.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::models::{ReviewComment, ReviewCommentThread};

/// Group review comments into threads, one per non-empty root comment.
///
/// Each thread lists its root followed by every transitive reply in
/// pre-order: a reply is immediately followed by its own replies. Siblings
/// keep their order from the input. Replies whose parent chain never reaches
/// a selected root are logged and left out, as are empty-body comments.
pub fn generate_comment_threads(comments: &[ReviewComment]) -> Vec<ReviewCommentThread> {
    let mut children: HashMap<u64, Vec<&ReviewComment>> = HashMap::new();
    for comment in comments {
        if let Some(parent) = comment.in_reply_to_id {
            children.entry(parent).or_default().push(comment);
        }
    }

    let mut placed: HashSet<u64> = HashSet::new();
    let mut threads = Vec::new();

    for root in comments.iter().filter(|c| c.is_root()) {
        if root.body.is_empty() {
            debug!(comment_id = root.id, "skipping empty root comment");
            continue;
        }
        if !placed.insert(root.id) {
            continue;
        }

        let mut thread = vec![root.clone()];
        let mut stack: Vec<&ReviewComment> = Vec::new();
        push_children(&children, root.id, &mut stack);

        while let Some(reply) = stack.pop() {
            if !placed.insert(reply.id) {
                continue;
            }
            if !reply.body.is_empty() {
                thread.push(reply.clone());
            }
            push_children(&children, reply.id, &mut stack);
        }

        threads.push(ReviewCommentThread {
            file: root.path.clone(),
            comments: thread,
        });
    }

    for orphan in comments
        .iter()
        .filter(|c| !c.body.is_empty() && !placed.contains(&c.id))
    {
        warn!(
            comment_id = orphan.id,
            in_reply_to_id = ?orphan.in_reply_to_id,
            "reply does not lead back to any thread, ignoring it"
        );
    }

    threads
}

/// Push a comment's replies so the first reply is popped first.
fn push_children<'a>(
    children: &HashMap<u64, Vec<&'a ReviewComment>>,
    parent: u64,
    stack: &mut Vec<&'a ReviewComment>,
) {
    if let Some(replies) = children.get(&parent) {
        stack.extend(replies.iter().rev());
    }
}
