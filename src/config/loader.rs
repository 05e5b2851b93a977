//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables and GitHub Actions inputs (`INPUT_*`)
//! 3. `.presubmit.toml` in repo root
//! 4. `~/.config/presubmit/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::comments::BotIdentity;
use crate::constants::{
    BOT_HANDLES, BOT_LOGIN, COMMENT_SIGNATURE, DEFAULT_GITHUB_API_URL, DEFAULT_GITHUB_SERVER_URL,
    ENV_API_KEY, ENV_BASE_URL, ENV_GITHUB_API_URL, ENV_GITHUB_SERVER_URL, ENV_GITHUB_TOKEN,
    ENV_LANGUAGE, ENV_MODEL, ENV_PROVIDER, ENV_STYLE_GUIDE_RULES, MAX_COMMENT_CHARS,
};
use crate::env::Env;
use crate::models::ProviderName;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{what} is not set. Provide {hint}")]
    Missing { what: &'static str, hint: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub github: GithubConfig,
    pub review: ReviewConfig,
    pub bot: BotConfig,
}

/// LLM provider configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    /// Empty until configured; there is no safe default model.
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// GitHub API access. Set `api_url`/`server_url` for GitHub Enterprise Server.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub token: Option<String>,
    pub api_url: String,
    pub server_url: String,
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("server_url", &self.server_url)
            .finish()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            server_url: DEFAULT_GITHUB_SERVER_URL.to_string(),
        }
    }
}

/// Review-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Language the model should write in (e.g. `"German"`). English when unset.
    pub language: Option<String>,
    /// Project-specific rules appended to the review instructions.
    pub style_guide_rules: Option<String>,
    /// Comment bodies longer than this are truncated before posting.
    pub max_comment_chars: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            language: None,
            style_guide_rules: None,
            max_comment_chars: MAX_COMMENT_CHARS,
        }
    }
}

/// How the bot identifies itself in comment threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub login: String,
    pub signature: String,
    pub handles: Vec<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            login: BOT_LOGIN.to_string(),
            signature: COMMENT_SIGNATURE.to_string(),
            handles: BOT_HANDLES.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl BotConfig {
    pub fn identity(&self) -> BotIdentity {
        BotIdentity {
            login: self.login.clone(),
            signature: self.signature.clone(),
            handles: self.handles.clone(),
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, repo-local config, then applies
    /// environment variable overrides. CLI flags are applied by the caller.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: repo-local config
        if let Some(root) = repo_root {
            let local_path = root.join(crate::constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        // Provider settings
        let default_provider = ProviderConfig::default();
        if other.provider.name != default_provider.name {
            self.provider.name = other.provider.name;
        }
        if !other.provider.model.is_empty() {
            self.provider.model = other.provider.model;
        }
        if other.provider.base_url.is_some() {
            self.provider.base_url = other.provider.base_url;
        }
        if other.provider.api_key.is_some() {
            self.provider.api_key = other.provider.api_key;
        }

        // GitHub settings
        let default_github = GithubConfig::default();
        if other.github.token.is_some() {
            self.github.token = other.github.token;
        }
        if other.github.api_url != default_github.api_url {
            self.github.api_url = other.github.api_url;
        }
        if other.github.server_url != default_github.server_url {
            self.github.server_url = other.github.server_url;
        }

        // Review settings
        if other.review.language.is_some() {
            self.review.language = other.review.language;
        }
        if other.review.style_guide_rules.is_some() {
            self.review.style_guide_rules = other.review.style_guide_rules;
        }
        if other.review.max_comment_chars != ReviewConfig::default().max_comment_chars {
            self.review.max_comment_chars = other.review.max_comment_chars;
        }

        // Bot identity
        let default_bot = BotConfig::default();
        if other.bot.login != default_bot.login {
            self.bot.login = other.bot.login;
        }
        if other.bot.signature != default_bot.signature {
            self.bot.signature = other.bot.signature;
        }
        if other.bot.handles != default_bot.handles {
            self.bot.handles = other.bot.handles;
        }
    }

    /// Apply environment variable and Action input overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        let explicit_provider = match env.setting(ENV_PROVIDER) {
            Some(val) => match val.parse::<ProviderName>() {
                Ok(name) => {
                    self.provider.name = name;
                    true
                }
                Err(e) => {
                    warn!("ignoring invalid {ENV_PROVIDER} value: {e}");
                    false
                }
            },
            None => false,
        };
        if let Some(val) = env.setting(ENV_MODEL) {
            self.provider.model = val;
        }
        if let Some(val) = env.setting(ENV_BASE_URL) {
            self.provider.base_url = Some(val);
        }

        // A bare model name is enough to pick the backend
        if !explicit_provider && self.provider.name == ProviderName::default() {
            if let Some(inferred) = ProviderName::infer_from_model(&self.provider.model) {
                self.provider.name = inferred;
            }
        }

        // Provider-specific API key resolution
        let api_key = env
            .setting(ENV_API_KEY)
            .or_else(|| env.var(self.provider.name.api_key_env_var()).ok());
        if api_key.is_some() {
            self.provider.api_key = api_key;
        }

        // The `github_token` input wins over the ambient workflow token
        let token = env
            .input(&ENV_GITHUB_TOKEN.to_lowercase())
            .or_else(|| env.var(ENV_GITHUB_TOKEN).ok().filter(|v| !v.is_empty()));
        if token.is_some() {
            self.github.token = token;
        }
        if let Some(val) = env.setting(ENV_GITHUB_API_URL) {
            self.github.api_url = val;
        }
        if let Some(val) = env.setting(ENV_GITHUB_SERVER_URL) {
            self.github.server_url = val;
        }

        if let Some(val) = env.setting(ENV_LANGUAGE) {
            self.review.language = Some(val);
        }
        if let Some(val) = env.setting(ENV_STYLE_GUIDE_RULES) {
            self.review.style_guide_rules = Some(val);
        }
    }

    /// Check that everything a live review needs is present.
    pub fn validate_for_review(&self) -> Result<(), ConfigError> {
        if self.github.token.is_none() {
            return Err(ConfigError::Missing {
                what: "GitHub token",
                hint: format!("the 'github_token' input or the {ENV_GITHUB_TOKEN} variable"),
            });
        }
        self.validate_for_model()
    }

    /// Check that the model can be called.
    pub fn validate_for_model(&self) -> Result<(), ConfigError> {
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::Missing {
                what: "model",
                hint: format!("{ENV_MODEL}, the 'llm_model' input or [provider] model"),
            });
        }
        if self.provider.api_key.is_none() && self.provider.name != ProviderName::OpenAICompatible {
            return Err(ConfigError::Missing {
                what: "API key",
                hint: format!(
                    "{ENV_API_KEY} or {} for provider '{}'",
                    self.provider.name.api_key_env_var(),
                    self.provider.name
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.provider.name, ProviderName::Anthropic);
        assert!(config.provider.model.is_empty());
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.review.max_comment_chars, MAX_COMMENT_CHARS);
        assert_eq!(config.bot.login, "presubmit");
        assert_eq!(config.bot.handles, vec!["presubmitai", "presubmit"]);
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[provider]
name = "openai"
model = "gpt-4.1-mini"

[github]
api_url = "https://ghe.example.com/api/v3"

[review]
language = "German"
style_guide_rules = "Prefer early returns."

[bot]
handles = ["reviewbot"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.provider.model, "gpt-4.1-mini");
        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.server_url, "https://github.com");
        assert_eq!(config.review.language.as_deref(), Some("German"));
        assert_eq!(config.bot.handles, vec!["reviewbot"]);
        assert_eq!(config.bot.login, "presubmit");
    }

    #[test]
    fn merge_overrides_non_default_values() {
        let mut base = Config::default();
        let mut other = Config::default();

        other.provider.name = ProviderName::Gemini;
        other.provider.model = "gemini-2.5-pro".to_string();
        other.provider.api_key = Some("key".to_string());
        other.github.server_url = "https://ghe.example.com".to_string();
        other.review.max_comment_chars = 1000;
        other.review.language = Some("French".to_string());
        other.bot.login = "reviewer".to_string();

        base.merge(other);

        assert_eq!(base.provider.name, ProviderName::Gemini);
        assert_eq!(base.provider.model, "gemini-2.5-pro");
        assert_eq!(base.provider.api_key.as_deref(), Some("key"));
        assert_eq!(base.github.server_url, "https://ghe.example.com");
        assert_eq!(base.review.max_comment_chars, 1000);
        assert_eq!(base.review.language.as_deref(), Some("French"));
        assert_eq!(base.bot.login, "reviewer");
    }

    #[test]
    fn merge_keeps_base_when_other_is_default() {
        let mut base = Config::default();
        base.provider.name = ProviderName::OpenAI;
        base.provider.model = "gpt-4o".to_string();
        base.review.style_guide_rules = Some("rules".to_string());

        base.merge(Config::default());

        assert_eq!(base.provider.name, ProviderName::OpenAI);
        assert_eq!(base.provider.model, "gpt-4o");
        assert_eq!(base.review.style_guide_rules.as_deref(), Some("rules"));
    }

    #[test]
    fn load_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{ toml").unwrap();

        let result = Config::load_file(&path);
        assert!(result.unwrap_err().to_string().contains("parse"));
    }

    #[test]
    fn load_file_not_found() {
        let result = Config::load_file(Path::new("/tmp/presubmit_not_exist_config.toml"));
        assert!(result.unwrap_err().to_string().contains("read"));
    }

    #[test]
    fn load_from_repo_root() {
        let env = Env::mock(Vec::<(&str, &str)>::new());

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".presubmit.toml"),
            r#"
[provider]
name = "deepseek"
model = "deepseek-chat"
"#,
        )
        .unwrap();

        let config = Config::load(Some(dir.path()), &env).unwrap();
        assert_eq!(config.provider.name, ProviderName::DeepSeek);
        assert_eq!(config.provider.model, "deepseek-chat");
    }

    #[test]
    fn env_overrides_repo_file() {
        let env = Env::mock([("LLM_MODEL", "claude-sonnet-4-5")]);

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".presubmit.toml"),
            "[provider]\nmodel = \"claude-3-5-haiku\"\n",
        )
        .unwrap();

        let config = Config::load(Some(dir.path()), &env).unwrap();
        assert_eq!(config.provider.model, "claude-sonnet-4-5");
    }

    #[test]
    fn apply_env_vars_provider_and_api_key() {
        let env = Env::mock([("LLM_PROVIDER", "openai"), ("LLM_API_KEY", "sk-env-test")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.provider.api_key, Some("sk-env-test".to_string()));
    }

    #[test]
    fn action_inputs_are_read() {
        let env = Env::mock([
            ("INPUT_LLM_MODEL", "gpt-4.1-mini"),
            ("INPUT_GITHUB_TOKEN", "ghs_input"),
            ("GITHUB_TOKEN", "ghs_env"),
            ("INPUT_LANGUAGE", "Spanish"),
            ("INPUT_GITHUB_API_URL", ""),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.model, "gpt-4.1-mini");
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.github.token.as_deref(), Some("ghs_input"));
        assert_eq!(config.review.language.as_deref(), Some("Spanish"));
        assert_eq!(config.github.api_url, "https://api.github.com");
    }

    #[test]
    fn env_var_wins_over_input_for_model() {
        let env = Env::mock([("LLM_MODEL", "from-env"), ("INPUT_LLM_MODEL", "from-input")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.model, "from-env");
    }

    #[test]
    fn explicit_provider_beats_inference() {
        let env = Env::mock([("LLM_PROVIDER", "openai-compatible"), ("LLM_MODEL", "gpt-4o")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.name, ProviderName::OpenAICompatible);
    }

    #[test]
    fn apply_env_vars_invalid_provider_falls_back() {
        let env = Env::mock([("LLM_PROVIDER", "not-a-provider")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.name, ProviderName::Anthropic);
    }

    #[test]
    fn apply_env_vars_provider_specific_api_key_fallback() {
        let env = Env::mock([("ANTHROPIC_API_KEY", "sk-anthropic-test")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.api_key, Some("sk-anthropic-test".to_string()));
    }

    #[test]
    fn validate_reports_missing_pieces() {
        let mut config = Config::default();
        let err = config.validate_for_review().unwrap_err();
        assert!(err.to_string().contains("GitHub token"));

        config.github.token = Some("t".into());
        let err = config.validate_for_review().unwrap_err();
        assert!(err.to_string().contains("model"));

        config.provider.model = "claude-sonnet-4-5".into();
        let err = config.validate_for_review().unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        config.provider.api_key = Some("k".into());
        assert!(config.validate_for_review().is_ok());
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let mut config = Config::default();
        config.provider.api_key = Some("sk-secret".into());
        config.github.token = Some("ghs_secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("ghs_secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn bot_identity_from_config() {
        let identity = BotConfig::default().identity();
        assert_eq!(identity, BotIdentity::default());
    }
}
