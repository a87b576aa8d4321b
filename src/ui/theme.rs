//! Consistent styling utilities for CLI output.
//!
//! Colors come from owo-colors and are switched off when `NO_COLOR` is set.

use owo_colors::OwoColorize;
use std::fmt::Display;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn paint<T: Display>(text: T, styled: impl FnOnce(&T) -> String) -> String {
    if colors_enabled() {
        styled(&text)
    } else {
        text.to_string()
    }
}

/// Styles for different semantic elements.
pub struct Style;

impl Style {
    /// Section headers (e.g., "Current settings")
    pub fn header<T: Display>(text: T) -> String {
        paint(text, |t| t.bold().to_string())
    }

    /// Setting names
    pub fn label<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }

    /// Setting values, masked keys
    pub fn value<T: Display>(text: T) -> String {
        paint(text, |t| t.cyan().to_string())
    }

    pub fn secondary<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }

    pub fn success<T: Display>(text: T) -> String {
        paint(text, |t| t.green().to_string())
    }

    pub fn error<T: Display>(text: T) -> String {
        paint(text, |t| t.red().bold().to_string())
    }

    pub fn hint<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().italic().to_string())
    }
}
