//! JSON output renderer.
//!
//! Outputs the review in the same shape the model returned it.

use crate::models::PullRequestReview;
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, review: &PullRequestReview) -> String {
        serde_json::to_string_pretty(review).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AiComment;
    use crate::models::review::ReviewScore;

    #[test]
    fn render_json() {
        let review = PullRequestReview {
            review: ReviewScore {
                estimated_effort_to_review: 1,
                score: 90,
                has_relevant_tests: true,
                security_concerns: "No".into(),
            },
            comments: vec![AiComment {
                file: "test.rs".into(),
                start_line: 1,
                end_line: 2,
                highlighted_code: "let x = 1;".into(),
                header: "Issue".into(),
                content: "Details".into(),
                label: "enhancement".into(),
                critical: false,
            }],
        };

        let output = JsonRenderer.render(&review);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["comments"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["comments"][0]["end_line"], 2);
        assert_eq!(parsed["review"]["score"], 90);

        let back: PullRequestReview = serde_json::from_str(&output).unwrap();
        assert_eq!(back, review);
    }
}
