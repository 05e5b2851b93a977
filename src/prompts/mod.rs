//! Prompt builders for the three model calls: summary, review and reply.
//!
//! Each builder returns a [`Prompt`] pair. The response shape is enforced
//! separately through the JSON schema of the matching result type in
//! [`crate::models::review`].

pub mod reply;
pub mod review;
pub mod summary;

use crate::config::Config;

pub use reply::build_reply_prompt;
pub use review::build_review_prompt;
pub use summary::build_summary_prompt;

/// System and user message for one model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Settings spliced into every prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSettings {
    /// Response language; English when `None`.
    pub language: Option<String>,
    /// Project guidelines whose violation should be flagged as critical.
    pub style_guide_rules: Option<String>,
    /// The login the bot's own comments are attributed to.
    pub bot_login: String,
}

impl PromptSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            language: config.review.language.clone().filter(|l| !l.trim().is_empty()),
            style_guide_rules: config
                .review
                .style_guide_rules
                .clone()
                .filter(|r| !r.trim().is_empty()),
            bot_login: config.bot.login.clone(),
        }
    }

    /// `" All your responses MUST be in <language>."`, or nothing.
    fn language_clause(&self) -> String {
        match &self.language {
            Some(language) => format!(" All your responses MUST be in {language}."),
            None => String::new(),
        }
    }
}
