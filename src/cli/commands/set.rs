use anyhow::Result;

use crate::config::{ConfigManager, SettingKey, Settings};
use crate::ui::Style;

pub fn run_set(key: &str, value: &str) -> Result<()> {
    let key: SettingKey = key.parse()?;
    let manager = ConfigManager::new()?;
    let path = manager.config_path().display().to_string();
    let settings = Settings::persistent(manager);

    settings.set(key, value)?;

    println!(
        "{} {} = {}",
        Style::success("✓"),
        Style::label(key),
        Style::value(settings.display_value(key))
    );
    println!("  {}", Style::secondary(path));
    Ok(())
}
