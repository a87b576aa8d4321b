//! Translator settings: the TOML file and the live settings surface.

mod manager;
mod settings;

pub use manager::{ConfigManager, DEFAULT_MODEL, TranslatorConfig};
pub use settings::{SettingKey, Settings};
