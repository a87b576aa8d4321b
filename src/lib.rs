//! # chat-translator
//!
//! Translates multiplayer chat messages with Google Gemini and relays the
//! result back into the chat channel.
//!
//! A host feeds chat events to a [`ChatTranslator`]. Each eligible message
//! becomes one asynchronous request; the model either answers with
//! `"<translation> [<language code>]"` or with the skip token `INPUT_SKIP`
//! when the message is already English. Failures are retried a bounded
//! number of times and reported once.
//!
//! ## Quick Start
//!
//! ```bash
//! # Store an API key
//! chat-translator configure
//!
//! # Relay stdin chat lines
//! printf 'Anuke: Bonjour tout le monde\n' | chat-translator
//!
//! # Translate one message
//! chat-translator translate "wie geht es dir"
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/chat-translator/config.toml`:
//!
//! ```toml
//! enabled = true
//! api_key = ""
//! api_key_env = "GEMINI_API_KEY"
//! model = "gemini-2.0-flash-lite"
//! max_retries = 3
//! retry_delay_secs = 1.0
//! ```

/// Chat events, the event handler and announcement sinks.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and the live settings surface.
pub mod config;

/// File system utilities.
pub mod fs;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Prompt, provider, client and retry loop.
pub mod translation;

/// The composition root a host talks to.
pub mod translator;

/// Terminal UI components (spinner, colors).
pub mod ui;

pub use translator::ChatTranslator;
