//! Configuration loading and layering.
//!
//! Handles `.presubmit.toml` loading, environment variable and Action input
//! resolution, and CLI flag merging with proper priority ordering.

pub mod loader;

pub use loader::{BotConfig, Config, ConfigError, GithubConfig, ProviderConfig, ReviewConfig};
