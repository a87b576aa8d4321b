//! The key/value settings surface with change notification.

use anyhow::{Context, Result, bail};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use super::manager::{ConfigManager, TranslatorConfig};

/// A user-editable setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Enabled,
    ApiKey,
    ApiKeyEnv,
    Model,
    Endpoint,
    MaxRetries,
    RetryDelay,
}

impl SettingKey {
    pub const ALL: &'static [Self] = &[
        Self::Enabled,
        Self::ApiKey,
        Self::ApiKeyEnv,
        Self::Model,
        Self::Endpoint,
        Self::MaxRetries,
        Self::RetryDelay,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::ApiKey => "api-key",
            Self::ApiKeyEnv => "api-key-env",
            Self::Model => "model",
            Self::Endpoint => "endpoint",
            Self::MaxRetries => "max-retries",
            Self::RetryDelay => "retry-delay",
        }
    }

    /// Whether a change to this key requires rebuilding the client.
    pub const fn affects_client(self) -> bool {
        matches!(
            self,
            Self::ApiKey | Self::ApiKeyEnv | Self::Model | Self::Endpoint
        )
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                anyhow::anyhow!(
                    "Unknown setting: '{s}'\n\nAvailable settings: {}",
                    known.join(", ")
                )
            })
    }
}

type Listener = Box<dyn Fn(SettingKey, &TranslatorConfig) + Send + Sync>;

/// Current configuration plus the callbacks interested in it.
///
/// Readers get an immutable snapshot; every write builds a new config and
/// swaps it in. Writes are serialized and listeners run in write order while
/// the writer lock is held, so a listener must not call [`Settings::set`].
pub struct Settings {
    current: RwLock<Arc<TranslatorConfig>>,
    listeners: Mutex<Vec<Listener>>,
    writer: Mutex<()>,
    store: Option<ConfigManager>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("current", &self.snapshot())
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Settings {
    /// In-memory settings that are never written to disk.
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
            listeners: Mutex::new(Vec::new()),
            writer: Mutex::new(()),
            store: None,
        }
    }

    /// Settings loaded from `manager` and written back on every change.
    pub fn persistent(manager: ConfigManager) -> Self {
        let config = manager.load_or_default();
        Self {
            store: Some(manager),
            ..Self::new(config)
        }
    }

    pub fn snapshot(&self) -> Arc<TranslatorConfig> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registers a callback run after every effective change.
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(SettingKey, &TranslatorConfig) + Send + Sync + 'static,
    {
        lock(&self.listeners).push(Box::new(listener));
    }

    /// Parses `raw` for `key` and applies it.
    pub fn set(&self, key: SettingKey, raw: &str) -> Result<()> {
        self.update(key, |config| apply(config, key, raw))
            .with_context(|| format!("Failed to set '{key}'"))
    }

    /// Applies `edit` to a copy of the current config, validates and stores it.
    ///
    /// Nothing is persisted or announced when the edit leaves the config unchanged.
    pub fn update<F>(&self, key: SettingKey, edit: F) -> Result<()>
    where
        F: FnOnce(&mut TranslatorConfig) -> Result<()>,
    {
        let _writer = lock(&self.writer);

        let current = self.snapshot();
        let mut next = TranslatorConfig::clone(&current);
        edit(&mut next)?;
        next.validate()?;

        if next == *current {
            return Ok(());
        }

        if let Some(store) = &self.store {
            store.save(&next)?;
        }

        let next = Arc::new(next);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);
        log::debug!("Setting '{key}' changed");

        for listener in lock(&self.listeners).iter() {
            listener(key, &next);
        }
        Ok(())
    }

    /// Display form of one setting, with the API key masked.
    pub fn display_value(&self, key: SettingKey) -> String {
        let config = self.snapshot();
        match key {
            SettingKey::Enabled => config.enabled.to_string(),
            SettingKey::ApiKey => config.masked_api_key(),
            SettingKey::ApiKeyEnv => config
                .api_key_env
                .clone()
                .unwrap_or_else(|| "(not set)".to_string()),
            SettingKey::Model => config.model.clone(),
            SettingKey::Endpoint => config.endpoint.clone(),
            SettingKey::MaxRetries => config.max_retries.to_string(),
            SettingKey::RetryDelay => format!("{}s", config.retry_delay_secs),
        }
    }

    pub const fn store(&self) -> Option<&ConfigManager> {
        self.store.as_ref()
    }
}

fn apply(config: &mut TranslatorConfig, key: SettingKey, raw: &str) -> Result<()> {
    let value = raw.trim();
    match key {
        SettingKey::Enabled => config.enabled = parse_bool(value)?,
        SettingKey::ApiKey => config.api_key = value.to_string(),
        SettingKey::ApiKeyEnv => {
            config.api_key_env = (!value.is_empty()).then(|| value.to_string());
        }
        SettingKey::Model => config.model = value.to_string(),
        SettingKey::Endpoint => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                bail!("Endpoint must be an http:// or https:// URL, got '{value}'");
            }
            config.endpoint = value.trim_end_matches('/').to_string();
        }
        SettingKey::MaxRetries => {
            config.max_retries = value
                .parse()
                .with_context(|| format!("'{value}' is not a whole number"))?;
        }
        SettingKey::RetryDelay => {
            config.retry_delay_secs = value
                .trim_end_matches('s')
                .parse()
                .with_context(|| format!("'{value}' is not a number of seconds"))?;
        }
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => bail!("'{value}' is not a boolean (use true or false)"),
    }
}
