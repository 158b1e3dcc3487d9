//! Configuration loading and management.
//!
//! Loads configuration from `./outcall.toml` (or `$OUTCALL_CONFIG_PATH`).
//! Environment variables override file values; file values override
//! defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::providers::openrouter::{DEFAULT_MODEL, OPENROUTER_API_BASE};

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration loaded from TOML.
///
/// Path: `./outcall.toml` or `$OUTCALL_CONFIG_PATH`.
/// Env vars override file values; file values override defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutcallConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Filesystem paths for persistent state and prompt documents.
    pub paths: PathsConfig,
    /// LLM completion endpoint settings.
    pub llm: LlmConfig,
    /// Automation webhook settings.
    pub automation: AutomationConfig,
}

impl OutcallConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$OUTCALL_CONFIG_PATH` or `./outcall.toml`.
    /// If the file does not exist, defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error when the config file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file path (CLI `--config`),
    /// falling back to the usual resolution when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error when the config file cannot be read or parsed.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let resolved = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path_with(|key| std::env::var(key).ok()),
        };
        let mut config = Self::load_from_file(&resolved, path.is_some())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a TOML file only, no env overrides.
    ///
    /// A missing file is only an error when the path was given explicitly.
    fn load_from_file(path: &Path, explicit: bool) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                let config: OutcallConfig =
                    toml::from_str(&contents).context("failed to parse config TOML")?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                tracing::info!("no config file found, using defaults");
                Ok(OutcallConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config file {}: {e}",
                path.display()
            )),
        }
    }

    /// Resolve the config path using a custom env resolver (for testing).
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(p) = env("OUTCALL_CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("outcall.toml")
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability.
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        // Server.
        if let Some(v) = env("OUTCALL_BIND_ADDR") {
            self.server.bind_addr = v;
        }

        // Paths.
        if let Some(v) = env("OUTCALL_STORE_PATH") {
            self.paths.store = v;
        }
        if let Some(v) = env("OUTCALL_KNOWLEDGE_PATH") {
            self.paths.knowledge_base = v;
        }
        if let Some(v) = env("OUTCALL_TEMPLATE_PATH") {
            self.paths.prompt_template = v;
        }
        if let Some(v) = env("OUTCALL_LOGS_DIR") {
            self.paths.logs_dir = v;
        }

        // LLM. The bare OPENROUTER_API_KEY name is honored for parity with
        // the original deployment's .env files.
        if let Some(key) = env("OUTCALL_OPENROUTER_API_KEY").or_else(|| env("OPENROUTER_API_KEY")) {
            self.llm.api_key = Some(key);
        }
        if let Some(v) = env("OUTCALL_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = env("OUTCALL_OPENROUTER_URL") {
            self.llm.base_url = v;
        }

        // Automation webhook, with the original deployment's name as alias.
        if let Some(url) = env("OUTCALL_WEBHOOK_URL").or_else(|| env("MAKE_WEBHOOK_URL")) {
            self.automation.webhook_url = Some(url);
        }
    }

    /// Parse a TOML string into config (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error when the string is not valid config TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: OutcallConfig =
            toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }
}

// ── Server config ───────────────────────────────────────────────

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

// ── Paths config ────────────────────────────────────────────────

/// Filesystem paths for persistent state and prompt documents.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Campaign store JSON file.
    pub store: String,
    /// Knowledge-base JSON document.
    pub knowledge_base: String,
    /// Script-prompt template text file.
    pub prompt_template: String,
    /// Directory for rotated JSON log files.
    pub logs_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store: "campaigns.json".to_string(),
            knowledge_base: "knowledge_base.json".to_string(),
            prompt_template: "prompt.txt".to_string(),
            logs_dir: "logs".to_string(),
        }
    }
}

// ── LLM config ──────────────────────────────────────────────────

/// LLM completion endpoint settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenRouter API base URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Bearer credential. When absent, script and summary generation fail
    /// with a configuration error; the server still starts.
    pub api_key: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "__REDACTED__"))
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: OPENROUTER_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

// ── Automation config ───────────────────────────────────────────

/// Automation webhook settings.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Webhook endpoint approved campaigns are posted to. When absent,
    /// approval fails with a configuration error.
    pub webhook_url: Option<String>,
}

impl std::fmt::Debug for AutomationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Webhook URLs carry a secret path segment.
        f.debug_struct("AutomationConfig")
            .field(
                "webhook_url",
                &self.webhook_url.as_ref().map(|_| "__REDACTED__"),
            )
            .finish()
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_current_constants() {
        let config = OutcallConfig::default();

        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.paths.store, "campaigns.json");
        assert_eq!(config.paths.knowledge_base, "knowledge_base.json");
        assert_eq!(config.paths.prompt_template, "prompt.txt");
        assert_eq!(config.paths.logs_dir, "logs");
        assert_eq!(config.llm.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.llm.model, "mistralai/mixtral-8x7b-instruct");
        assert!(config.llm.api_key.is_none());
        assert!(config.automation.webhook_url.is_none());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[server]
bind_addr = "0.0.0.0:9000"

[paths]
store = "/var/lib/outcall/campaigns.json"
knowledge_base = "/etc/outcall/knowledge_base.json"
prompt_template = "/etc/outcall/prompt.txt"
logs_dir = "/var/log/outcall"

[llm]
base_url = "https://openrouter.ai/api/v1"
model = "anthropic/claude-3.5-sonnet"
api_key = "sk-or-test-123"

[automation]
webhook_url = "https://hook.example.com/abc"
"#;

        let config = OutcallConfig::from_toml(toml_str).expect("should parse");

        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.paths.store, "/var/lib/outcall/campaigns.json");
        assert_eq!(config.llm.model, "anthropic/claude-3.5-sonnet");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-or-test-123"));
        assert_eq!(
            config.automation.webhook_url.as_deref(),
            Some("https://hook.example.com/abc")
        );
    }

    #[test]
    fn test_parse_partial_toml_uses_defaults() {
        let toml_str = r#"
[server]
bind_addr = "0.0.0.0:3000"
"#;

        let config = OutcallConfig::from_toml(toml_str).expect("should parse");

        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.paths.store, "campaigns.json");
        assert_eq!(config.llm.model, "mistralai/mixtral-8x7b-instruct");
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        let config = OutcallConfig::from_toml("").expect("should parse empty");
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_env_overrides_config_values() {
        let toml_str = r#"
[paths]
store = "/from/toml/campaigns.json"
knowledge_base = "/from/toml/kb.json"
"#;

        let mut config = OutcallConfig::from_toml(toml_str).expect("should parse");

        let env = |key: &str| -> Option<String> {
            match key {
                "OUTCALL_STORE_PATH" => Some("/from/env/campaigns.json".to_string()),
                "OUTCALL_BIND_ADDR" => Some("0.0.0.0:8081".to_string()),
                _ => None,
            }
        };
        config.apply_overrides(env);

        // Env wins over file.
        assert_eq!(config.paths.store, "/from/env/campaigns.json");
        assert_eq!(config.server.bind_addr, "0.0.0.0:8081");

        // File value kept when no env override.
        assert_eq!(config.paths.knowledge_base, "/from/toml/kb.json");
    }

    #[test]
    fn test_env_sets_api_key() {
        let mut config = OutcallConfig::default();

        let env = |key: &str| -> Option<String> {
            match key {
                "OUTCALL_OPENROUTER_API_KEY" => Some("sk-or-prefixed".to_string()),
                _ => None,
            }
        };
        config.apply_overrides(env);

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-or-prefixed"));
    }

    #[test]
    fn test_bare_openrouter_key_alias_is_honored() {
        let mut config = OutcallConfig::default();

        let env = |key: &str| -> Option<String> {
            match key {
                "OPENROUTER_API_KEY" => Some("sk-or-bare".to_string()),
                _ => None,
            }
        };
        config.apply_overrides(env);

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-or-bare"));
    }

    #[test]
    fn test_prefixed_key_wins_over_bare_alias() {
        let mut config = OutcallConfig::default();

        let env = |key: &str| -> Option<String> {
            match key {
                "OUTCALL_OPENROUTER_API_KEY" => Some("prefixed".to_string()),
                "OPENROUTER_API_KEY" => Some("bare".to_string()),
                _ => None,
            }
        };
        config.apply_overrides(env);

        assert_eq!(config.llm.api_key.as_deref(), Some("prefixed"));
    }

    #[test]
    fn test_webhook_alias_is_honored() {
        let mut config = OutcallConfig::default();

        let env = |key: &str| -> Option<String> {
            match key {
                "MAKE_WEBHOOK_URL" => Some("https://hook.example.com/xyz".to_string()),
                _ => None,
            }
        };
        config.apply_overrides(env);

        assert_eq!(
            config.automation.webhook_url.as_deref(),
            Some("https://hook.example.com/xyz")
        );
    }

    #[test]
    fn test_config_path_uses_env_var() {
        let path = OutcallConfig::config_path_with(|key| match key {
            "OUTCALL_CONFIG_PATH" => Some("/custom/outcall.toml".to_string()),
            _ => None,
        });
        assert_eq!(path, PathBuf::from("/custom/outcall.toml"));
    }

    #[test]
    fn test_config_path_defaults_to_cwd() {
        let path = OutcallConfig::config_path_with(|_| None);
        assert_eq!(path, PathBuf::from("outcall.toml"));
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = OutcallConfig::from_toml("this is {{ not valid toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = OutcallConfig::default();
        config.llm.api_key = Some("sk-or-secret".to_string());
        config.automation.webhook_url = Some("https://hook.example.com/secret".to_string());

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-or-secret"));
        assert!(!rendered.contains("hook.example.com"));
        assert!(rendered.contains("__REDACTED__"));
    }
}
