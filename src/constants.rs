//! App-wide constants.
//!
//! Centralises the tool name, bot identity defaults, config paths and
//! environment variable names so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "presubmit";

/// Crate version, baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.presubmit.toml` in repo root).
pub const CONFIG_FILENAME: &str = ".presubmit.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "presubmit";

// ── Bot identity ────────────────────────────────────────────────────

/// Canonical login every signed comment is attributed to, whichever
/// account actually posted it.
pub const BOT_LOGIN: &str = "presubmit";

/// Marker appended to every comment the bot posts. Rendered markdown hides it.
pub const COMMENT_SIGNATURE: &str = "<!-- presubmit.ai: comment -->";

/// Handles that count as addressing the bot when `@`-mentioned.
pub const BOT_HANDLES: &[&str] = &["presubmitai", "presubmit"];

// ── GitHub ──────────────────────────────────────────────────────────

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_SERVER_URL: &str = "https://github.com";

/// GitHub rejects comment bodies above 65536 characters.
pub const MAX_COMMENT_CHARS: usize = 65000;

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "LLM_PROVIDER";
pub const ENV_MODEL: &str = "LLM_MODEL";
pub const ENV_API_KEY: &str = "LLM_API_KEY";
pub const ENV_BASE_URL: &str = "LLM_BASE_URL";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";
pub const ENV_GITHUB_SERVER_URL: &str = "GITHUB_SERVER_URL";
pub const ENV_LANGUAGE: &str = "LANGUAGE";
pub const ENV_STYLE_GUIDE_RULES: &str = "STYLE_GUIDE_RULES";
pub const ENV_EVENT_NAME: &str = "GITHUB_EVENT_NAME";
pub const ENV_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
pub const ENV_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const ENV_WORKSPACE: &str = "GITHUB_WORKSPACE";

/// Log filter directive for the tracing subscriber (e.g. `debug`).
pub const ENV_LOG: &str = "PRESUBMIT_LOG";
