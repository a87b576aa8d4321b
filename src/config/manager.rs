use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::fs::atomic_write;
use crate::paths;
use crate::translation::{DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, RetryPolicy};

/// Model used when none is configured.
/// See <https://ai.google.dev/gemini-api/docs/models> for current identifiers.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";

/// Settings read by the translator, stored as `config.toml`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Whether chat messages are translated at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// API key stored directly in the config file.
    #[serde(default)]
    pub api_key: String,
    /// Environment variable holding the API key; wins over `api_key` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Gemini model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Gemini REST base URL (for proxies).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Total attempts per message.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds to wait between attempts.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: f64,
}

const fn default_enabled() -> bool {
    true
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

const fn default_retry_delay_secs() -> f64 {
    DEFAULT_RETRY_DELAY.as_secs_f64()
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: String::new(),
            api_key_env: None,
            model: default_model(),
            endpoint: default_endpoint(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

// Keeps the key out of logs and panic messages.
impl std::fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.masked_api_key())
            .field("api_key_env", &self.api_key_env)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .finish()
    }
}

impl TranslatorConfig {
    /// Gets the API key, preferring the environment variable over the config file.
    ///
    /// Blank keys count as missing.
    pub fn effective_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env
            && let Ok(key) = std::env::var(env_var)
            && !key.trim().is_empty()
        {
            return Some(key.trim().to_string());
        }

        let key = self.api_key.trim();
        (!key.is_empty()).then(|| key.to_string())
    }

    pub fn has_api_key(&self) -> bool {
        self.effective_api_key().is_some()
    }

    /// The key with everything but its last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let Some(key) = self.effective_api_key() else {
            return "(not set)".to_string();
        };
        let chars: Vec<char> = key.chars().collect();
        if chars.len() <= 8 {
            return "********".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("********{tail}")
    }

    /// Retry settings for the next request.
    pub fn retry_policy(&self) -> RetryPolicy {
        let delay =
            Duration::try_from_secs_f64(self.retry_delay_secs).unwrap_or(DEFAULT_RETRY_DELAY);
        RetryPolicy::new(self.max_retries, delay)
    }

    /// Checks values that serde alone cannot constrain.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            bail!("'model' cannot be empty");
        }
        if self.endpoint.trim().is_empty() {
            bail!("'endpoint' cannot be empty");
        }
        if !self.retry_delay_secs.is_finite() || self.retry_delay_secs < 0.0 {
            bail!(
                "'retry_delay_secs' must be a non-negative number, got {}",
                self.retry_delay_secs
            );
        }
        if self.max_retries == 0 {
            bail!("'max_retries' must be at least 1");
        }
        Ok(())
    }
}

/// Manages loading and saving the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for `$XDG_CONFIG_HOME/chat-translator/config.toml`
    /// or `~/.config/chat-translator/config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<TranslatorConfig> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config: TranslatorConfig =
            toml::from_str(&contents).with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    pub fn save(&self, config: &TranslatorConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        atomic_write(&self.config_path, &contents).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })
    }

    /// Loads the config, falling back to defaults when the file is missing or broken.
    pub fn load_or_default(&self) -> TranslatorConfig {
        if !self.config_path.exists() {
            return TranslatorConfig::default();
        }
        self.load().unwrap_or_else(|e| {
            log::warn!("{e:#}; using default settings");
            TranslatorConfig::default()
        })
    }
}
