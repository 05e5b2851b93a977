//! Snapshot tests for output renderers.
//!
//! Each test renders a standard review through a renderer and compares
//! the output against expected fixture files.

use presubmit::models::review::ReviewScore;
use presubmit::models::{AiComment, PullRequestReview};
use presubmit::output::OutputRenderer;
use presubmit::output::json::JsonRenderer;
use presubmit::output::terminal::TerminalRenderer;

/// Standard review used across all snapshot tests.
fn test_review() -> PullRequestReview {
    PullRequestReview {
        review: ReviewScore {
            estimated_effort_to_review: 3,
            score: 65,
            has_relevant_tests: true,
            security_concerns: "No".into(),
        },
        comments: vec![
            AiComment {
                file: "src/utils.rs".into(),
                start_line: 15,
                end_line: 20,
                highlighted_code: "if input.is_empty() {".into(),
                header: "Repeated validation".into(),
                content: "Extract a `validate_input()` helper.".into(),
                label: "maintainability".into(),
                critical: false,
            },
            AiComment {
                file: "src/main.rs".into(),
                start_line: 42,
                end_line: 42,
                highlighted_code: "let cfg = load().unwrap();".into(),
                header: "Unwrap in production code".into(),
                content: "Using .unwrap() can panic at runtime.\nPropagate the error with `?` instead."
                    .into(),
                label: "possible bug".into(),
                critical: true,
            },
        ],
    }
}

#[test]
fn snapshot_json_renderer() {
    let output = JsonRenderer.render(&test_review());

    let actual: serde_json::Value = serde_json::from_str(&output).unwrap();
    let expected_str =
        std::fs::read_to_string("tests/fixtures/expected_json_output.json").unwrap();
    let expected: serde_json::Value = serde_json::from_str(&expected_str).unwrap();

    assert_eq!(
        actual, expected,
        "JSON renderer output does not match snapshot.\nActual:\n{output}"
    );
}

#[test]
fn snapshot_terminal_renderer() {
    colored::control::set_override(false);
    let output = TerminalRenderer.render(&test_review());

    let expected =
        std::fs::read_to_string("tests/fixtures/expected_terminal_output.txt").unwrap();

    pretty_assertions::assert_eq!(
        output, expected,
        "terminal renderer output does not match snapshot"
    );
}

#[test]
fn terminal_renderer_without_comments() {
    colored::control::set_override(false);
    let mut review = test_review();
    review.comments.clear();

    let output = TerminalRenderer.render(&review);
    assert!(output.starts_with("  ✔ No comments.\n"));
    assert!(output.contains("0 comments, 0 critical"));
}

#[test]
fn json_renderer_round_trips() {
    let review = test_review();
    let parsed: PullRequestReview = serde_json::from_str(&JsonRenderer.render(&review)).unwrap();
    assert_eq!(parsed, review);
}
