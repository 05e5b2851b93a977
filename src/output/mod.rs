//! Output renderers for reviews printed locally: terminal and JSON.

pub mod json;
pub mod terminal;

use crate::models::PullRequestReview;

/// Trait for rendering a model review to an output format.
pub trait OutputRenderer {
    /// Render the review to a string.
    fn render(&self, review: &PullRequestReview) -> String;
}
