//! Interpretation of raw model output.

use super::error::RequestError;

/// Outcome of one logical translation.
#[derive(Debug)]
pub enum TranslationResult {
    /// The model produced a translation. `text` keeps the trailing `[xx]` tag.
    Translated {
        text: String,
        language: Option<String>,
    },
    /// The message needs no translation.
    Skip,
    /// The provider answered without usable text.
    Empty,
    /// Every attempt failed; holds the last error.
    Failed(RequestError),
}

impl TranslationResult {
    /// Returns `true` for results that publish nothing and report nothing.
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::Skip | Self::Empty)
    }
}

/// Maps a successful provider reply onto a result. Never returns `Failed`.
pub fn interpret(raw: Option<&str>, skip_token: &str) -> TranslationResult {
    let Some(raw) = raw else {
        log::warn!("Received a null text response from the API; skipping message");
        return TranslationResult::Empty;
    };

    let text = raw.trim();
    if text.is_empty() {
        return TranslationResult::Empty;
    }

    if unquote(text).eq_ignore_ascii_case(skip_token) {
        return TranslationResult::Skip;
    }

    TranslationResult::Translated {
        text: text.to_string(),
        language: language_tag(text),
    }
}

/// Strips one pair of surrounding backticks or double quotes.
fn unquote(text: &str) -> &str {
    for quote in ['`', '"'] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    text
}

/// Extracts the lowercase language code from a trailing `[xx]` tag.
fn language_tag(text: &str) -> Option<String> {
    let inner = text.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let code = inner[open + 1..].trim();

    let well_formed = (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphabetic());
    well_formed.then(|| code.to_ascii_lowercase())
}
