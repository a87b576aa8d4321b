//! Configure command handler for editing translator settings.

use anyhow::{Result, bail};
use inquire::{Confirm, Password, PasswordDisplayMode, Text};

use crate::config::{ConfigManager, SettingKey, Settings};
use crate::ui::{Style, handle_prompt_cancellation};

/// Where a Gemini API key can be created.
pub const API_KEY_URL: &str = "https://aistudio.google.com/apikey";

/// Runs the configure command.
///
/// With `show`, prints the current settings; otherwise prompts for the
/// enabled flag, API key and model.
pub fn run_configure(show: bool) -> Result<()> {
    let settings = Settings::persistent(ConfigManager::new()?);

    if show {
        print_settings(&settings);
        return Ok(());
    }

    handle_prompt_cancellation(|| run_configure_inner(&settings))
}

fn run_configure_inner(settings: &Settings) -> Result<()> {
    print_settings(settings);

    let current = settings.snapshot();

    let enabled = Confirm::new("Translate chat messages?")
        .with_default(current.enabled)
        .prompt()?;

    println!(
        "  {}",
        Style::hint(format!("Create a Gemini API key at {API_KEY_URL}"))
    );
    let api_key = Password::new("API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;

    let model = Text::new("Model:")
        .with_default(&current.model)
        .with_help_message("Gemini model name, e.g. gemini-2.0-flash-lite")
        .prompt()?;

    if model.trim().is_empty() {
        bail!("Model name cannot be empty");
    }

    settings.set(SettingKey::Enabled, &enabled.to_string())?;
    if !api_key.trim().is_empty() {
        settings.set(SettingKey::ApiKey, &api_key)?;
    }
    settings.set(SettingKey::Model, &model)?;

    if let Some(store) = settings.store() {
        println!();
        println!(
            "{} Configuration saved to {}",
            Style::success("✓"),
            Style::secondary(store.config_path().display().to_string())
        );
    }

    Ok(())
}

fn print_settings(settings: &Settings) {
    println!("{}", Style::header("Current settings"));
    for key in SettingKey::ALL {
        println!(
            "  {:<12} {}",
            Style::label(key),
            Style::value(settings.display_value(*key))
        );
    }
    if let Some(store) = settings.store() {
        println!(
            "  {:<12} {}",
            Style::label("file"),
            Style::secondary(store.config_path().display().to_string())
        );
    }
    println!();
}
