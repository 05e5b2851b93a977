//! Environment variable abstraction for testability.
//!
//! Production code uses [`Env::real()`] which delegates to [`std::env::var`].
//! Tests use [`Env::mock()`] backed by a `HashMap`, eliminating the need for
//! `unsafe` calls to [`std::env::set_var`] / [`std::env::remove_var`].
//!
//! GitHub Actions exposes workflow `with:` inputs as `INPUT_<NAME>`
//! variables; [`Env::setting`] checks both spellings.

use std::collections::HashMap;

/// Environment variable reader.
#[derive(Clone, Debug)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Create an `Env` backed by explicit key-value pairs.
    #[cfg(test)]
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up an environment variable by name.
    pub fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        match &self.overrides {
            Some(map) => map.get(name).cloned().ok_or(std::env::VarError::NotPresent),
            None => std::env::var(name),
        }
    }

    /// Returns `true` if the variable is present.
    pub fn is_set(&self, name: &str) -> bool {
        self.var(name).is_ok()
    }

    /// Read a GitHub Actions input (`INPUT_GITHUB_TOKEN` for `github_token`).
    ///
    /// The runner always defines declared inputs, so empty means unset.
    pub fn input(&self, name: &str) -> Option<String> {
        let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
        self.var(&key).ok().filter(|v| !v.trim().is_empty())
    }

    /// Resolve a setting from the plain variable first, then the Action input
    /// of the same (lowercased) name.
    pub fn setting(&self, name: &str) -> Option<String> {
        self.var(name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.input(&name.to_lowercase()))
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}
