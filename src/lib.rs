//! presubmit: AI-powered pull request reviewer (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod comments;
pub mod config;
pub mod constants;
pub mod diff;
pub mod env;
pub mod github;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod prompts;
pub mod providers;
