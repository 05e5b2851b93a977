//! Decide which threads the bot takes part in.

use crate::constants::{BOT_HANDLES, BOT_LOGIN, COMMENT_SIGNATURE};
use crate::models::ReviewCommentThread;

/// How the bot recognizes its own comments and mentions of itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    /// Canonical login that signed comments are attributed to.
    pub login: String,
    /// Marker appended to every comment the bot posts.
    pub signature: String,
    /// Handles that summon the bot when `@`-mentioned.
    pub handles: Vec<String>,
}

impl Default for BotIdentity {
    fn default() -> Self {
        Self {
            login: BOT_LOGIN.to_string(),
            signature: COMMENT_SIGNATURE.to_string(),
            handles: BOT_HANDLES.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl BotIdentity {
    /// Whether a comment body carries the bot's signature.
    pub fn is_own_comment(&self, body: &str) -> bool {
        !self.signature.is_empty() && body.contains(&self.signature)
    }

    /// Whether a body `@`-mentions any of the bot's handles.
    pub fn mentions_bot(&self, body: &str) -> bool {
        self.handles
            .iter()
            .filter(|h| !h.is_empty())
            .any(|h| body.contains(&format!("@{h}")))
    }

    /// A thread is relevant when the bot wrote in it or was mentioned in it.
    pub fn is_thread_relevant(&self, thread: &ReviewCommentThread) -> bool {
        thread
            .comments
            .iter()
            .any(|c| self.is_own_comment(&c.body) || self.mentions_bot(&c.body))
    }

    /// Append the signature to a body about to be posted.
    pub fn sign(&self, body: &str) -> String {
        format!("{body}\n\n{}", self.signature)
    }
}
